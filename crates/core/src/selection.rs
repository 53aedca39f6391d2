//! Random choices (which candidate, which title) behind a swappable trait.

use rand::Rng;

/// Picks an index in `0..len`.
pub trait Selector: Send + Sync {
    /// `len` is always greater than zero.
    fn pick(&self, len: usize) -> usize;
}

/// Uniformly random selector backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl Selector for RandomSelector {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Pick one element of `items`, or `None` if it is empty.
///
/// Out-of-range picks from a misbehaving selector wrap around.
pub fn choose<'a, T>(selector: &dyn Selector, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(selector.pick(items.len()) % items.len())
}
