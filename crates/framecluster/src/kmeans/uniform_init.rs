use rand::RngExt;
use rand::seq::index;

/// `k` distinct indices drawn uniformly from `0..n`.
///
/// The validity mask is not consulted: an invalid pick still carries a position
/// and is moved onto a valid sample by the first snap of the Lloyd step.
///
/// When `k > n` all `n` indices are returned, in random order.
pub fn find_initial(rng: &mut impl RngExt, n: usize, k: usize) -> Vec<usize> {
    // More clusters than points => silent clamping
    let k = k.min(n);
    index::sample(rng, n, k).into_vec()
}
