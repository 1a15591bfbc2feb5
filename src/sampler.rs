//! Alias method sampler.
//!
//! Each of the `n` buckets stores a threshold and an alias.  A draw picks a
//! bucket uniformly, then keeps the bucket's own index with probability equal
//! to its threshold and returns the alias otherwise.  Building the tables is
//! O(n), each draw afterwards is O(1).
use rand::Rng;

use crate::error::{InvalidWeight, SamplerError};

#[derive(Debug, Clone)]
pub struct AliasSampler {
    probs: Vec<f32>,
    aliases: Vec<usize>
}

/// Checks a single weight is usable in a distribution.
#[inline]
pub fn check_weight(index: usize, value: f32) -> Result<(), InvalidWeight> {
    if !value.is_finite() {
        Err(InvalidWeight::NonFinite { index, value })
    } else if value < 0. {
        Err(InvalidWeight::Negative { index, value })
    } else {
        Ok(())
    }
}

impl AliasSampler {

    pub fn new(weights: &[f32]) -> Result<Self, SamplerError> {
        let n = weights.len();
        if n == 0 {
            return Err(SamplerError::EmptyDistribution)
        }

        let mut total = 0f64;
        for (i, w) in weights.iter().enumerate() {
            check_weight(i, *w)?;
            total += *w as f64;
        }

        if total == 0. {
            return Err(InvalidWeight::ZeroSum.into())
        }

        // Scale so the average bucket holds exactly 1
        let mut scaled: Vec<f64> = weights.iter()
            .map(|w| *w as f64 * n as f64 / total)
            .collect();

        let mut probs = vec![0f32; n];
        let mut aliases: Vec<usize> = (0..n).collect();

        let mut underfull = Vec::with_capacity(n);
        let mut overfull = Vec::with_capacity(n);
        for (i, p) in scaled.iter().enumerate() {
            if *p < 1. {
                underfull.push(i);
            } else {
                overfull.push(i);
            }
        }

        while let (Some(&small), Some(&large)) = (underfull.last(), overfull.last()) {
            underfull.pop();
            probs[small] = scaled[small] as f32;
            aliases[small] = large;

            // The overfull entry donates whatever the small bucket lacks
            scaled[large] = (scaled[large] + scaled[small]) - 1.;
            if scaled[large] < 1. {
                overfull.pop();
                underfull.push(large);
            }
        }

        // Whatever is left is full up to rounding error.  Buckets that never
        // held any mass must keep routing to an outcome with positive weight.
        let fallback = overfull.last().cloned().unwrap_or_else(|| heaviest(weights));
        for i in underfull.into_iter().chain(overfull.into_iter()) {
            if weights[i] > 0. {
                probs[i] = 1.;
                aliases[i] = i;
            } else {
                probs[i] = 0.;
                aliases[i] = fallback;
            }
        }

        Ok(AliasSampler { probs, aliases })
    }

    #[inline]
    pub fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let bucket = rng.gen_range(0, self.probs.len());
        if rng.gen::<f32>() < self.probs[bucket] {
            bucket
        } else {
            self.aliases[bucket]
        }
    }

    /// Draws `k` indices independently, with replacement.
    pub fn sample<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Vec<usize> {
        (0..k).map(|_| self.sample_index(rng)).collect()
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }
}

fn heaviest(weights: &[f32]) -> usize {
    let mut best = 0;
    for (i, w) in weights.iter().enumerate() {
        if *w > weights[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod test_alias_sampler {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use statrs::distribution::{ChiSquared, ContinuousCDF};

    fn counts(sampler: &AliasSampler, draws: usize, seed: u64) -> Vec<usize> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = vec![0usize; sampler.len()];
        for idx in sampler.sample(draws, &mut rng) {
            counts[idx] += 1;
        }
        counts
    }

    #[test]
    fn test_rejects_bad_weights() {
        assert_eq!(AliasSampler::new(&[]).err(), Some(SamplerError::EmptyDistribution));
        assert_eq!(AliasSampler::new(&[-1., 2.]).err(),
            Some(SamplerError::InvalidWeight(InvalidWeight::Negative { index: 0, value: -1. })));
        assert_eq!(AliasSampler::new(&[0., 0., 0.]).err(),
            Some(SamplerError::InvalidWeight(InvalidWeight::ZeroSum)));

        match AliasSampler::new(&[1., std::f32::NAN]) {
            Err(SamplerError::InvalidWeight(InvalidWeight::NonFinite { index: 1, .. })) => {},
            other => panic!("unexpected: {:?}", other)
        }
        assert!(AliasSampler::new(&[1., std::f32::INFINITY]).is_err());
    }

    #[test]
    fn test_draw_count() {
        let sampler = AliasSampler::new(&[0.5, 3., 1.]).unwrap();
        let mut rng = StdRng::seed_from_u64(2019);
        for k in 1..50 {
            let draws = sampler.sample(k, &mut rng);
            assert_eq!(draws.len(), k);
            assert!(draws.iter().all(|idx| *idx < 3));
        }
    }

    #[test]
    fn test_singleton() {
        let sampler = AliasSampler::new(&[5.]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sampler.sample(1000, &mut rng).into_iter().all(|idx| idx == 0));
    }

    #[test]
    fn test_zero_weights_never_drawn() {
        let weights = [0., 1., 0., 0., 7., 0.];
        let sampler = AliasSampler::new(&weights).unwrap();
        let counts = counts(&sampler, 50_000, 7);
        for (i, w) in weights.iter().enumerate() {
            if *w == 0. {
                assert_eq!(counts[i], 0, "index {} was drawn", i);
            }
        }
    }

    #[test]
    fn test_distribution_fidelity() {
        let weights = [1., 2., 3., 4., 0.5];
        let sampler = AliasSampler::new(&weights).unwrap();
        let draws = 100_000;
        let counts = counts(&sampler, draws, 2019);

        let total: f32 = weights.iter().sum();
        let statistic: f64 = weights.iter().zip(counts.iter())
            .map(|(w, c)| {
                let expected = draws as f64 * (*w / total) as f64;
                (*c as f64 - expected).powi(2) / expected
            })
            .sum();

        let chi = ChiSquared::new((weights.len() - 1) as f64).unwrap();
        let p_value = 1. - chi.cdf(statistic);
        assert!(p_value > 1e-4, "chi-square {} p-value {}", statistic, p_value);
    }

    #[test]
    fn test_frequencies_converge() {
        let weights = [10., 1., 1.];
        let sampler = AliasSampler::new(&weights).unwrap();
        let draws = 60_000;
        let counts = counts(&sampler, draws, 42);
        for (i, c) in counts.iter().enumerate() {
            let emp = *c as f32 / draws as f32;
            let p = weights[i] / 12.;
            assert!((emp - p).abs() < 0.01, "i={} emp={} p={}", i, emp, p);
        }
    }
}
