extern crate heap;
extern crate hashbrown;

use float_ord::FloatOrd;
use hashbrown::HashMap;

// Orders by score, breaking ties toward the smaller item id
#[inline]
fn better(a: &(usize, f32), b: &(usize, f32)) -> bool {
    a.1 > b.1 || (a.1 == b.1 && a.0 < b.0)
}

/// Ranks the items visited by a walk by how often they were reached.  Scores
/// are visit frequencies; at most `max_terms` items are returned, best first.
pub fn top_items(items: &[usize], max_terms: usize) -> Vec<(usize, f32)> {
    if items.is_empty() || max_terms == 0 {
        return Vec::new()
    }

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for item in items.iter() {
        *counts.entry(*item).or_insert(0) += 1;
    }

    let total = items.len() as f32;
    let mut out: Vec<(usize, f32)> = Vec::with_capacity(max_terms.min(counts.len()));
    for (item, count) in counts.drain() {
        let scored = (item, count as f32 / total);

        // Fill the heap first, then only swap out its weakest member
        if out.len() < max_terms {
            out.push(scored);
            if out.len() == max_terms {
                heap::build(out.len(),
                    |a, b| better(b, a),
                    out.as_mut_slice());
            }
        } else if better(&scored, &out[0]) {
            heap::replace_root(
                out.len(),
                |a, b| better(b, a),
                out.as_mut_slice(),
                scored);
        }
    }

    out.sort_by_key(|(item, score)| (FloatOrd(-*score), *item));
    out
}
