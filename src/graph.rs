//! The user/item interaction graph.
//!
//! The forward adjacency (users to items) is what callers hand us; the reverse
//! adjacency is derived from it once.  Both are kept since walks need to move in
//! both directions, trading memory for speed.
use rand::Rng;

use crate::error::WalkError;
use crate::sampler::{check_weight, AliasSampler};

#[derive(Debug, Clone)]
pub struct BipartiteGraph {
    item_weights: Vec<f32>,
    users_to_items: Vec<Vec<usize>>,
    items_to_users: Vec<Vec<usize>>,

    // One sampler per user over their own collection, None when it is empty
    samplers: Vec<Option<AliasSampler>>
}

impl BipartiteGraph {

    pub fn new(
        item_weights: Vec<f32>,
        users_to_items: Vec<Vec<usize>>
    ) -> Result<Self, WalkError> {
        validate(&item_weights, &users_to_items)?;

        let samplers = build_samplers(&item_weights, &users_to_items)?;
        let items_to_users = invert(item_weights.len(), &users_to_items);

        Ok(BipartiteGraph { item_weights, users_to_items, items_to_users, samplers })
    }

    pub fn num_items(&self) -> usize {
        self.item_weights.len()
    }

    pub fn num_users(&self) -> usize {
        self.users_to_items.len()
    }

    pub fn item_weight(&self, item: usize) -> f32 {
        self.item_weights[item]
    }

    pub fn items_of(&self, user: usize) -> &[usize] {
        &self.users_to_items[user]
    }

    pub fn users_of(&self, item: usize) -> &[usize] {
        &self.items_to_users[item]
    }

    /// Picks one user who interacted with `item`, uniformly.
    pub fn sample_referrer<R: Rng + ?Sized>(
        &self,
        item: usize,
        rng: &mut R
    ) -> Result<usize, WalkError> {
        let users = &self.items_to_users[item];
        if users.is_empty() {
            return Err(WalkError::OrphanItem(item))
        }
        Ok(users[rng.gen_range(0, users.len())])
    }

    /// Draws one item from `user`'s collection, biased by item weight.
    pub fn sample_item<R: Rng + ?Sized>(&self, user: usize, rng: &mut R) -> Option<usize> {
        self.samplers[user].as_ref().map(|s| {
            self.users_to_items[user][s.sample_index(rng)]
        })
    }
}

fn validate(item_weights: &[f32], users_to_items: &[Vec<usize>]) -> Result<(), WalkError> {
    if item_weights.is_empty() {
        return Err(WalkError::EmptyInput("item weights"))
    }
    if users_to_items.is_empty() {
        return Err(WalkError::EmptyInput("users to items adjacency"))
    }

    for (item, w) in item_weights.iter().enumerate() {
        check_weight(item, *w).map_err(WalkError::InvalidItemWeight)?;
    }

    let num_items = item_weights.len();
    for items in users_to_items.iter() {
        if let Some(&item) = items.iter().find(|i| **i >= num_items) {
            return Err(WalkError::IndexOutOfRange { item, num_items })
        }
    }
    Ok(())
}

fn build_samplers(
    item_weights: &[f32],
    users_to_items: &[Vec<usize>]
) -> Result<Vec<Option<AliasSampler>>, WalkError> {
    users_to_items.iter().enumerate().map(|(user, items)| {
        if items.is_empty() {
            return Ok(None)
        }
        let weights: Vec<f32> = items.iter().map(|i| item_weights[*i]).collect();
        AliasSampler::new(&weights)
            .map(Some)
            .map_err(|source| WalkError::SamplerInitFailed { user, source })
    }).collect()
}

// Users are visited in order so each reverse list is sorted by user, with one
// entry per occurrence in the forward list.
fn invert(num_items: usize, users_to_items: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut items_to_users = vec![Vec::new(); num_items];
    for (user, items) in users_to_items.iter().enumerate() {
        for item in items.iter() {
            items_to_users[*item].push(user);
        }
    }
    items_to_users
}

#[cfg(test)]
mod test_graph {
    use super::*;
    use crate::error::{InvalidWeight, SamplerError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn example() -> BipartiteGraph {
        BipartiteGraph::new(vec![1.; 4], vec![vec![0, 1], vec![1, 2], vec![2, 3]]).unwrap()
    }

    #[test]
    fn test_reverse_adjacency() {
        let g = example();
        assert_eq!(g.users_of(0), &[0]);
        assert_eq!(g.users_of(1), &[0, 1]);
        assert_eq!(g.users_of(2), &[1, 2]);
        assert_eq!(g.users_of(3), &[2]);
        assert_eq!(g.num_items(), 4);
        assert_eq!(g.num_users(), 3);
    }

    #[test]
    fn test_reverse_keeps_multiplicity() {
        let g = BipartiteGraph::new(vec![1.; 3], vec![vec![2, 0, 2], vec![], vec![2]]).unwrap();
        assert_eq!(g.users_of(2), &[0, 0, 2]);
        assert_eq!(g.users_of(0), &[0]);
        assert!(g.users_of(1).is_empty());

        // Every forward edge shows up in reverse and vice versa
        for user in 0..g.num_users() {
            for item in g.items_of(user) {
                let fwd = g.items_of(user).iter().filter(|i| *i == item).count();
                let rev = g.users_of(*item).iter().filter(|u| **u == user).count();
                assert_eq!(fwd, rev);
            }
        }
    }

    #[test]
    fn test_construction_is_repeatable() {
        let a = example();
        let b = example();
        assert_eq!(a.items_to_users, b.items_to_users);
    }

    #[test]
    fn test_reverse_independent_of_order() {
        let forward = vec![vec![0, 1, 1], vec![1, 2], vec![2, 3, 0], vec![]];
        let a = BipartiteGraph::new(vec![1.; 4], forward.clone()).unwrap();

        // Same users listed in a different order, with shuffled collections.
        // Position j of the reordered table holds original user order[j].
        let order = [2, 3, 0, 1];
        let reordered: Vec<Vec<usize>> = order.iter()
            .map(|u| forward[*u].iter().rev().cloned().collect())
            .collect();
        let b = BipartiteGraph::new(vec![1.; 4], reordered).unwrap();

        for item in 0..4 {
            let mut expected = a.users_of(item).to_vec();
            let mut got: Vec<usize> = b.users_of(item).iter().map(|u| order[*u]).collect();
            expected.sort();
            got.sort();
            assert_eq!(expected, got, "item {}", item);
        }
    }

    #[test]
    fn test_validation() {
        assert_eq!(BipartiteGraph::new(vec![], vec![vec![0]]).err(),
            Some(WalkError::EmptyInput("item weights")));
        assert_eq!(BipartiteGraph::new(vec![1.], vec![]).err(),
            Some(WalkError::EmptyInput("users to items adjacency")));
        assert_eq!(BipartiteGraph::new(vec![1., 1.], vec![vec![0], vec![1, 2]]).err(),
            Some(WalkError::IndexOutOfRange { item: 2, num_items: 2 }));

        // Items no one holds are checked too
        assert_eq!(BipartiteGraph::new(vec![1., -5., 1.], vec![vec![0]]).err(),
            Some(WalkError::InvalidItemWeight(InvalidWeight::Negative { index: 1, value: -5. })));
        match BipartiteGraph::new(vec![1., 1., std::f32::NAN], vec![vec![0]]) {
            Err(WalkError::InvalidItemWeight(InvalidWeight::NonFinite { index: 2, .. })) => {},
            other => panic!("unexpected: {:?}", other)
        }
        assert!(BipartiteGraph::new(vec![std::f32::INFINITY], vec![vec![]]).is_err());
    }

    #[test]
    fn test_sampler_failure_names_user() {
        let err = BipartiteGraph::new(vec![1., 0., 2.], vec![vec![0], vec![1, 1], vec![2]])
            .err()
            .unwrap();

        assert_eq!(err, WalkError::SamplerInitFailed {
            user: 1,
            source: SamplerError::InvalidWeight(InvalidWeight::ZeroSum)
        });
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_sampling() {
        let g = example();
        let mut rng = StdRng::seed_from_u64(2019);
        for _ in 0..100 {
            assert_eq!(g.sample_referrer(0, &mut rng), Ok(0));
            let item = g.sample_item(2, &mut rng).unwrap();
            assert!(item == 2 || item == 3);
        }

        let g = BipartiteGraph::new(vec![1.; 2], vec![vec![0], vec![]]).unwrap();
        assert_eq!(g.sample_referrer(1, &mut rng), Err(WalkError::OrphanItem(1)));
        assert_eq!(g.sample_item(1, &mut rng), None);
    }
}
