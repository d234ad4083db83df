use crate::models::{CatalogSnapshot, MovieRecord};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// Source of indices in `[0, bound)`. `bound` is never zero.
pub trait IndexSource: Send + Sync {
    fn next_index(&self, bound: usize) -> usize;
}

/// Uniform indices from a single entropy-seeded generator.
pub struct RandomIndex {
    rng: Mutex<StdRng>,
}

impl RandomIndex {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexSource for RandomIndex {
    fn next_index(&self, bound: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..bound)
    }
}

#[derive(Clone)]
pub struct MovieSelector {
    source: Arc<dyn IndexSource>,
}

impl MovieSelector {
    pub fn new(source: Arc<dyn IndexSource>) -> Self {
        Self { source }
    }

    pub fn pick(&self, snapshot: Option<&CatalogSnapshot>) -> Option<MovieRecord> {
        let items = &snapshot?.items;
        if items.is_empty() {
            return None;
        }
        let idx = self.source.next_index(items.len()) % items.len();
        items.get(idx).cloned()
    }
}
