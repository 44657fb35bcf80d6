//! Deterministic randomness for the solver.
//!
//! Every start of the multi-start driver draws from its own integer counter
//! through a stateless hash, so streams are reproducible and disjoint by
//! construction no matter how starts are scheduled across threads.

/// Thomas Wang's 64-bit integer hash, scaled into `[0, 1)`.
pub fn hash_double(mut key: u64) -> f64 {
    key = (!key).wrapping_add(key << 21);
    key ^= key >> 24;
    key = key.wrapping_add(key << 3).wrapping_add(key << 8);
    key ^= key >> 14;
    key = key.wrapping_add(key << 2).wrapping_add(key << 4);
    key ^= key >> 28;
    key = key.wrapping_add(key << 31);
    5.421010862427522e-20 * key as f64
}

/// A counter walking through the hash stream.
#[derive(Clone, Debug)]
pub struct HashRng {
    counter: u64,
}

impl HashRng {
    pub fn new(counter: u64) -> Self {
        Self { counter }
    }

    /// Next double in `[0, 1)`; advances the counter by one.
    pub fn next_f64(&mut self) -> f64 {
        let value = hash_double(self.counter);
        self.counter = self.counter.wrapping_add(1);
        value
    }

    /// Uniform index in `[0, bound)`. The scaled draw is rejected and redrawn
    /// whenever rounding lands it on `bound` itself.
    pub fn index_below(&mut self, bound: usize) -> usize {
        loop {
            let index = (self.next_f64() * bound as f64) as usize;
            if index < bound {
                return index;
            }
        }
    }

    /// Random permutation of `0..len`, drawn back to front. Each position `i`
    /// swaps with an index `k` drawn from `[0, i+1)` and redrawn until
    /// `k < i`, so `i` always trades places with a strictly lower slot.
    pub fn permutation(&mut self, len: usize) -> Vec<usize> {
        let mut items: Vec<usize> = (0..len).collect();
        for i in (1..len).rev() {
            let mut k = (self.next_f64() * (i + 1) as f64) as usize;
            while k >= i {
                k = (self.next_f64() * (i + 1) as f64) as usize;
            }
            items.swap(k, i);
        }
        items
    }
}
