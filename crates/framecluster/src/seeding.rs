use crate::frame::FrameSoA;
use crate::kmeans::plus_plus_init::{self, DEFAULT_LOCAL_TRIES, FirstSeed};
use crate::kmeans::{Representatives, uniform_init};
use crate::rng::{self, FrameRng};
use crate::types::NUM_CLUSTERS;
use std::array;
use tracing::debug;

/// Produces the initial representatives the first time the engine runs.
pub trait Seeder: Send {
    /// `None` declines, leaving the engine uninitialized for this frame.
    fn seed(&mut self, frame: &FrameSoA) -> Option<Representatives>;

    fn name(&self) -> &'static str;
}

// Frames smaller than the cluster count reuse picks cyclically.
fn positions_of(frame: &FrameSoA, indices: &[usize]) -> Option<Representatives> {
    if indices.is_empty() {
        return None;
    }
    let positions = frame.positions();
    Some(array::from_fn(|j| positions[indices[j % indices.len()]]))
}

#[derive(Debug, Clone)]
pub struct UniformSeeder {
    rng: FrameRng,
}

impl UniformSeeder {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: rng::with_seed(seed),
        }
    }
}

impl Seeder for UniformSeeder {
    fn seed(&mut self, frame: &FrameSoA) -> Option<Representatives> {
        let indices = uniform_init::find_initial(&mut self.rng, frame.len(), NUM_CLUSTERS);
        debug!(?indices, "uniform seeds");
        positions_of(frame, &indices)
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}

#[derive(Debug, Clone)]
pub struct GreedySeeder {
    rng: FrameRng,
    local_tries: usize,
    first_seed: FirstSeed,
}

impl GreedySeeder {
    pub fn new(seed: u64, local_tries: usize, first_seed: FirstSeed) -> Self {
        Self {
            rng: rng::with_seed(seed),
            local_tries,
            first_seed,
        }
    }
}

impl Default for GreedySeeder {
    fn default() -> Self {
        Self::new(rng::DEFAULT_SEED, DEFAULT_LOCAL_TRIES, FirstSeed::Random)
    }
}

impl Seeder for GreedySeeder {
    fn seed(&mut self, frame: &FrameSoA) -> Option<Representatives> {
        let initial = plus_plus_init::find_initial(
            &mut self.rng,
            frame,
            NUM_CLUSTERS,
            self.local_tries,
            self.first_seed,
        );
        debug!(
            indices = ?initial.indices,
            potentials = ?initial.potentials,
            "greedy k-means++ seeds"
        );
        positions_of(frame, &initial.indices)
    }

    fn name(&self) -> &'static str {
        "greedy k-means++"
    }
}

/// Externally supplied positions, e.g. read with [`crate::read_seeds`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FixedSeeds(pub Representatives);

impl Seeder for FixedSeeds {
    fn seed(&mut self, _frame: &FrameSoA) -> Option<Representatives> {
        Some(self.0)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame;
    use crate::types::Vec3;
    use pretty_assertions::assert_eq;

    fn grid() -> FrameSoA {
        let positions: Vec<Vec3> = (0..100)
            .map(|i| Vec3::new((i % 10) as f32, (i / 10) as f32, 1.0))
            .collect();
        frame::from_positions(&positions)
    }

    #[test]
    fn uniform_seeds_are_frame_positions() {
        let frame = grid();
        let seeds = UniformSeeder::new(7).seed(&frame).unwrap();
        for s in seeds {
            assert!(frame.positions().contains(&s));
        }
    }

    #[test]
    fn greedy_seeds_are_distinct_frame_positions() {
        let frame = grid();
        let seeds = GreedySeeder::default().seed(&frame).unwrap();
        for (i, s) in seeds.iter().enumerate() {
            assert!(frame.positions().contains(s));
            for t in &seeds[i + 1..] {
                assert_ne!(s, t);
            }
        }
    }

    #[test]
    fn same_seed_same_representatives() {
        let frame = grid();
        let a = GreedySeeder::new(11, 3, FirstSeed::Random).seed(&frame);
        let b = GreedySeeder::new(11, 3, FirstSeed::Random).seed(&frame);
        assert_eq!(a, b);
    }

    #[test]
    fn greedy_declines_without_valid_samples() {
        let frame = FrameSoA::new(5, 5).unwrap();
        assert_eq!(GreedySeeder::default().seed(&frame), None);
    }

    #[test]
    fn tiny_frame_reuses_picks() {
        let frame = frame::from_positions(&[Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)]);
        let seeds = UniformSeeder::new(1).seed(&frame).unwrap();
        assert_eq!(seeds[0], seeds[2]);
        assert_eq!(seeds[1], seeds[3]);
        assert_ne!(seeds[0], seeds[1]);
    }

    #[test]
    fn fixed_seeds_ignore_the_frame() {
        let reps = [Vec3::new(1.0, 2.0, 3.0); NUM_CLUSTERS];
        let frame = FrameSoA::new(1, 1).unwrap();
        assert_eq!(FixedSeeds(reps).seed(&frame), Some(reps));
    }
}
