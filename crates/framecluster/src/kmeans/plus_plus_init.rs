use super::CHUNK_SIZE;
use crate::frame::FrameSoA;
use crate::types::Vec3;
use rand::RngExt;
use rayon::prelude::*;

/// Scikit uses (2+log(k)); the capture pipeline always ran with 5.
pub const DEFAULT_LOCAL_TRIES: usize = 5;

/// How the first seed is picked.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FirstSeed {
    /// Uniformly among the valid samples.
    #[default]
    Random,
    /// A fixed grid index (wrapped into range). May be an invalid sample; the
    /// first snap of the Lloyd step corrects that.
    Index(usize),
}

#[derive(Debug)]
pub struct Initial {
    pub indices: Vec<usize>,
    /// Total potential after each chosen seed, `potentials[i]` being the sum of
    /// squared distances to the nearest of the first `i + 1` seeds.
    pub potentials: Vec<f64>,
}

#[inline(always)]
fn sample_by_distance(rng: &mut impl RngExt, min_distances: &[f64], sum: f64) -> Option<usize> {
    let random_threshold = rng.random::<f64>() * sum;
    let mut cumsum = 0.0;
    let mut last_positive = None;

    for (i, &distance) in min_distances.iter().enumerate() {
        if distance > 0.0 {
            cumsum += distance;
            last_positive = Some(i);
            if cumsum > random_threshold {
                return Some(i);
            }
        }
    }

    // Rounding can leave the threshold just above the final cumsum
    last_positive
}

// Summed in a fixed chunk order so that element-wise smaller inputs always
// produce a smaller or equal total.
fn chunked_sum(values: &[f64]) -> f64 {
    values
        .par_chunks(CHUNK_SIZE)
        .map(|chunk| chunk.iter().sum::<f64>())
        .collect::<Vec<_>>()
        .into_iter()
        .sum()
}

fn update_min_distances(frame: &FrameSoA, center: Vec3, min_distances: &mut [f64]) {
    min_distances
        .par_iter_mut()
        .zip(frame.positions().par_iter())
        .zip(frame.valid().par_iter())
        .for_each(|((current, &position), &valid)| {
            *current = if valid {
                (position.squared_distance(center) as f64).min(*current)
            } else {
                0.0
            };
        });
}

fn nth_valid(frame: &FrameSoA, nth: usize) -> Option<usize> {
    frame
        .valid()
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v)
        .nth(nth)
        .map(|(i, _)| i)
}

/// Greedy k-means++ over the valid sample positions.
///
/// After the first seed, each of the remaining `k - 1` rounds draws `local_tries`
/// candidates with probability proportional to their squared distance to the
/// nearest seed so far, and keeps the one that minimises the total potential.
///
/// Returns at most `min(k, frame.len())` indices; none when the frame has no
/// valid sample. If every valid sample already coincides with a seed, the
/// remaining rounds repeat the first seed.
pub fn find_initial(
    rng: &mut impl RngExt,
    frame: &FrameSoA,
    k: usize,
    local_tries: usize,
    first: FirstSeed,
) -> Initial {
    let n = frame.len();
    let positions = frame.positions();
    let valid = frame.valid();
    let local_tries = local_tries.max(1);

    let valid_count = frame.valid_count();
    if valid_count == 0 {
        return Initial {
            indices: Vec::new(),
            potentials: Vec::new(),
        };
    }

    // More clusters than points => silent clamping
    let k = k.min(n);

    let c0 = match first {
        FirstSeed::Random => {
            let nth = rng.random_range(0..valid_count);
            nth_valid(frame, nth).unwrap_or(0)
        }
        FirstSeed::Index(i) => i % n,
    };

    let mut indices = Vec::<usize>::with_capacity(k);
    let mut potentials = Vec::<f64>::with_capacity(k);
    indices.push(c0);

    let mut min_distances = vec![f64::INFINITY; n];
    update_min_distances(frame, positions[c0], &mut min_distances);
    let mut min_distances_sum = chunked_sum(&min_distances);
    potentials.push(min_distances_sum);

    for _ in 1..k {
        // Sample all candidates upfront (uses cached sum)
        let candidates: Vec<usize> = (0..local_tries)
            .map_while(|_| sample_by_distance(rng, &min_distances, min_distances_sum))
            .collect();

        if candidates.is_empty() {
            // Nothing left with positive potential
            indices.push(c0);
            potentials.push(min_distances_sum);
            continue;
        }

        let candidate_positions: Vec<Vec3> = candidates.iter().map(|&c| positions[c]).collect();

        let candidate_potentials = positions
            .par_iter()
            .zip(valid.par_iter())
            .zip(min_distances.par_iter())
            .fold(
                || vec![0.0f64; candidate_positions.len()],
                |mut acc, ((&position, &is_valid), &current_min)| {
                    if is_valid {
                        for (potential, &c) in acc.iter_mut().zip(&candidate_positions) {
                            *potential += (position.squared_distance(c) as f64).min(current_min);
                        }
                    }
                    acc
                },
            )
            .reduce(
                || vec![0.0f64; candidate_positions.len()],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(b) {
                        *x += y;
                    }
                    a
                },
            );

        let mut best_potential = f64::INFINITY;
        let mut best = 0;
        for (i, potential) in candidate_potentials.iter().copied().enumerate() {
            if potential < best_potential {
                best_potential = potential;
                best = i;
            }
        }

        let chosen = candidates[best];
        update_min_distances(frame, positions[chosen], &mut min_distances);
        min_distances_sum = chunked_sum(&min_distances);
        potentials.push(min_distances_sum);
        indices.push(chosen);
    }

    indices.truncate(k);
    Initial {
        indices,
        potentials,
    }
}
