//! Uniform sampling without replacement.

use rand::seq::SliceRandom;
use rand::Rng;

/// Draw `amount` distinct elements uniformly at random, in draw order.
///
/// Uses a partial Fisher-Yates shuffle: every element has the same chance
/// of being picked and no position is picked twice. Asking for more
/// elements than exist returns all of them, shuffled.
pub fn sample_without_replacement<T, R>(items: &[T], amount: usize, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let amount = amount.min(items.len());
    let mut pool = items.to_vec();
    let (picked, _rest) = pool.partial_shuffle(rng, amount);
    picked.to_vec()
}
