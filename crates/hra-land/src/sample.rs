use std::collections::BTreeSet;

use hra_core::RngHandle;

/// Picks up to `count` distinct indices below `total`, in draw order.
///
/// Draw `k` uses substream `k` of `seed`, so a selection is reproducible and
/// any single draw can be replayed on its own.
pub fn sample_indices(total: usize, count: usize, seed: u64) -> Vec<usize> {
    if count >= total {
        return (0..total).collect();
    }
    let mut picked = Vec::with_capacity(count);
    let mut seen = BTreeSet::new();
    let mut draw = 0u64;
    while picked.len() < count {
        if let Some(index) = RngHandle::substream(seed, draw).pick_index(total) {
            if seen.insert(index) {
                picked.push(index);
            }
        }
        draw += 1;
    }
    picked
}
