//! Query seeded random walks over the user/item graph.
//!
//! A walk starts from an item sampled out of the query, then repeatedly hops
//! item -> user who interacted with it -> item from that user's collection.
//! `draws` such chains run per query, each `depth` hops long.
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;

use crate::error::{InvalidWeight, SamplerError, WalkError};
use crate::graph::BipartiteGraph;
use crate::sampler::{self, AliasSampler};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HopMode {

    // Each hop starts from the items reached by the previous hop
    Chained,

    // Every hop starts again from the seed items, so the output is `depth`
    // independent single hops per chain
    FromSeeds
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub depth: usize,
    pub draws: usize,
    pub mode: HopMode
}

impl Default for Config {
    fn default() -> Self {
        Config { depth: 1, draws: 1000, mode: HopMode::Chained }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryItem {
    pub item: usize,

    // Multiplier applied to the item's global weight, for instance the number
    // of past interactions with the item
    pub weight: f32
}

/// Items visited by a `process` call along with the users that referred them.
///
/// Results are laid out hop by hop: all chains' first hop, then all chains'
/// second hop, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Walk {
    pub items: Vec<usize>,
    pub referrers: Vec<usize>
}

impl Walk {
    fn with_capacity(n: usize) -> Self {
        Walk { items: Vec::with_capacity(n), referrers: Vec::with_capacity(n) }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// (item, referrer) pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item=(usize, usize)> + '_ {
        self.items.iter().cloned().zip(self.referrers.iter().cloned())
    }
}

/// Recommendation engine walking the user/item bipartite graph.
///
/// The walker holds no random state: every call takes its own generator, so a
/// `Walker` can be shared between threads freely.
#[derive(Debug, Clone)]
pub struct Walker {
    config: Config,
    graph: BipartiteGraph
}

impl Walker {

    pub fn new(
        config: Config,
        item_weights: Vec<f32>,
        users_to_items: Vec<Vec<usize>>
    ) -> Result<Self, WalkError> {
        // Output holds depth * draws entries, which must fit in a Vec
        let max_len = std::isize::MAX as usize / std::mem::size_of::<usize>();
        let fits = config.depth.checked_mul(config.draws).map_or(false, |n| n <= max_len);
        if config.depth < 1 || config.draws < 1 || !fits {
            return Err(WalkError::InvalidConfig { depth: config.depth, draws: config.draws })
        }

        let graph = BipartiteGraph::new(item_weights, users_to_items)?;
        Ok(Walker { config, graph })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn graph(&self) -> &BipartiteGraph {
        &self.graph
    }

    /// Samples `draws` seeds out of the query and walks `depth` hops from each.
    pub fn process<R: Rng + ?Sized>(
        &self,
        query: &[QueryItem],
        rng: &mut R
    ) -> Result<Walk, WalkError> {
        let seeds = self.sample_seeds(query, rng)?;

        let mut walk = Walk::with_capacity(self.config.depth * seeds.len());
        let mut current = seeds.clone();
        for _ in 0..self.config.depth {
            let start = if self.config.mode == HopMode::Chained { &current } else { &seeds };
            let mut next = Vec::with_capacity(start.len());
            for item in start.iter() {
                let (new_item, referrer) = self.hop(*item, rng)?;
                next.push(new_item);
                walk.referrers.push(referrer);
            }
            walk.items.extend_from_slice(&next);
            current = next;
        }
        Ok(walk)
    }

    /// Same as `process`, but runs each chain on the rayon pool.  Seeds are drawn
    /// from `seed`; chain `c` walks with its own generator seeded from `seed + c + 1`,
    /// so the output only depends on `seed`.
    pub fn process_par(&self, query: &[QueryItem], seed: u64) -> Result<Walk, WalkError> {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let seeds = self.sample_seeds(query, &mut rng)?;

        let chains = seeds.par_iter().enumerate().map(|(c, start)| {
            let mut rng = XorShiftRng::seed_from_u64(seed.wrapping_add(c as u64 + 1));
            self.chain(*start, &mut rng)
        }).collect::<Result<Vec<_>, _>>()?;

        // Chains come back one per seed; lay them out hop by hop
        let mut walk = Walk::with_capacity(self.config.depth * seeds.len());
        for d in 0..self.config.depth {
            for chain in chains.iter() {
                let (item, referrer) = chain[d];
                walk.items.push(item);
                walk.referrers.push(referrer);
            }
        }
        Ok(walk)
    }

    fn chain<R: Rng + ?Sized>(&self, seed: usize, rng: &mut R) -> Result<Vec<(usize, usize)>, WalkError> {
        let mut steps = Vec::with_capacity(self.config.depth);
        let mut item = seed;
        for _ in 0..self.config.depth {
            let start = if self.config.mode == HopMode::Chained { item } else { seed };
            let step = self.hop(start, rng)?;
            item = step.0;
            steps.push(step);
        }
        Ok(steps)
    }

    // item -> referrer -> next item
    #[inline]
    fn hop<R: Rng + ?Sized>(&self, item: usize, rng: &mut R) -> Result<(usize, usize), WalkError> {
        let referrer = self.graph.sample_referrer(item, rng)?;

        // A referrer always holds `item`, so their collection can't be empty
        let next = self.graph.sample_item(referrer, rng)
            .ok_or(WalkError::OrphanItem(item))?;
        Ok((next, referrer))
    }

    /// Draws `draws` starting items from the query.  Entries whose item has
    /// no recorded interaction can't start a walk and are left out of the
    /// seed distribution entirely.
    fn sample_seeds<R: Rng + ?Sized>(
        &self,
        query: &[QueryItem],
        rng: &mut R
    ) -> Result<Vec<usize>, WalkError> {
        if query.is_empty() {
            return Err(WalkError::EmptyQuery)
        }

        let num_items = self.graph.num_items();
        let mut items = Vec::with_capacity(query.len());
        let mut weights = Vec::with_capacity(query.len());
        for (i, q) in query.iter().enumerate() {
            if q.item >= num_items {
                return Err(WalkError::IndexOutOfRange { item: q.item, num_items })
            }

            let weight = q.weight * self.graph.item_weight(q.item);
            sampler::check_weight(i, weight)
                .map_err(|e| WalkError::InvalidQuery(e.into()))?;

            if !self.graph.users_of(q.item).is_empty() {
                items.push(q.item);
                weights.push(weight);
            }
        }

        if items.is_empty() {
            return Err(WalkError::NoValidSeeds)
        }

        let seed_sampler = AliasSampler::new(&weights).map_err(|e| match e {
            SamplerError::InvalidWeight(InvalidWeight::ZeroSum) => WalkError::NoValidSeeds,
            e => WalkError::InvalidQuery(e)
        })?;

        Ok(seed_sampler.sample(self.config.draws, rng).into_iter()
            .map(|idx| items[idx])
            .collect())
    }
}
