use crate::types::NUM_CLUSTERS;
use rayon::prelude::*;

/// Per-sample soft membership: recency-weighted votes over the clusters.
///
/// Entries are relative weights, not probabilities, and never go negative.
pub type Votes = [f32; NUM_CLUSTERS];

pub const DECAY: f32 = 0.5;

/// Weight a sample converges to for a cluster that wins every frame:
/// the fixed point of `w = w * DECAY + 1`.
pub const CEILING: f32 = 1.0 / (1.0 - DECAY);

/// Records one assignment: every entry decays, then the winner gains a vote.
#[inline(always)]
pub fn vote(votes: &mut Votes, winner: usize) {
    for v in votes.iter_mut() {
        *v *= DECAY;
    }
    votes[winner] += 1.0;
}

/// The cluster with the largest weight and that weight. Ties go to the lower
/// cluster index.
#[inline]
pub fn dominant(votes: &Votes) -> (usize, f32) {
    let mut best = 0;
    for j in 1..NUM_CLUSTERS {
        if votes[j] > votes[best] {
            best = j;
        }
    }
    (best, votes[best])
}

pub fn reset(membership: &mut [Votes]) {
    membership
        .par_iter_mut()
        .for_each(|votes| *votes = [0.0; NUM_CLUSTERS]);
}
