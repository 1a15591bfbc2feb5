use std::collections::VecDeque;

use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;

use crate::error::WalkError;
use crate::walker::{QueryItem, Walk, Walker};

/// Walks a list of queries on the rayon pool, `buffer_size` queries at a time,
/// yielding one result per query in query order.
///
/// Query `i` uses a generator seeded from `seed + i`, so results don't depend
/// on buffer size or thread count.
pub struct BatchIterator<'a> {
    walker: &'a Walker,
    queries: &'a [Vec<QueryItem>],
    offset: usize,
    buffer: VecDeque<Result<Walk, WalkError>>,
    buffer_size: usize,
    seed: u64
}

impl <'a> BatchIterator<'a> {
    pub fn new(
        walker: &'a Walker,
        queries: &'a [Vec<QueryItem>],
        buffer_size: usize,
        seed: u64
    ) -> Self {
        BatchIterator {
            walker,
            queries,
            offset: 0,
            buffer: VecDeque::with_capacity(buffer_size.max(1)),
            buffer_size: buffer_size.max(1),
            seed
        }
    }
}

impl <'a> Iterator for BatchIterator<'a> {
    type Item = Result<Walk, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && self.offset < self.queries.len() {
            let end = (self.offset + self.buffer_size).min(self.queries.len());
            let walker = self.walker;
            let queries = self.queries;
            let seed = self.seed;

            let mut tmp_buff = Vec::with_capacity(end - self.offset);
            (self.offset..end).into_par_iter().map(|idx| {
                let mut rng = XorShiftRng::seed_from_u64(seed.wrapping_add(idx as u64));
                walker.process(&queries[idx], &mut rng)
            }).collect_into_vec(&mut tmp_buff);

            self.buffer.extend(tmp_buff);
            self.offset = end;
        }
        self.buffer.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len() + self.queries.len() - self.offset;
        (remaining, Some(remaining))
    }
}
