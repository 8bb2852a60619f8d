#[cfg(feature = "_debug")]
pub mod debug_helpers;
#[cfg(feature = "_debug")]
pub mod kmeans;
#[cfg(not(feature = "_debug"))]
mod kmeans;
#[cfg(feature = "_debug")]
pub mod membership;
#[cfg(not(feature = "_debug"))]
mod membership;
#[cfg(feature = "_debug")]
pub mod rng;
#[cfg(not(feature = "_debug"))]
mod rng;

mod blend;
mod engine;
mod frame;
mod seeding;
mod seeds_io;
mod types;

pub use blend::{DisplayMode, Palette, TEMPORAL_FACTOR};
pub use engine::{Engine, EngineConfig, SeedingKind, SkipReason, StepOutcome};
pub use frame::{FrameError, FrameSoA, Sample};
pub use kmeans::Representatives;
pub use kmeans::distance::{
    DEFAULT_COLOR_WEIGHT, DEFAULT_NORMAL_WEIGHT, DistanceWeights, Terms,
};
pub use kmeans::lloyds::StepReport;
pub use kmeans::plus_plus_init::{DEFAULT_LOCAL_TRIES, FirstSeed};
pub use kmeans::snap::nearest_valid;
pub use membership::{CEILING, DECAY, Votes, dominant};
pub use rgb::RGB8;
pub use rng::DEFAULT_SEED;
pub use seeding::{FixedSeeds, GreedySeeder, Seeder, UniformSeeder};
pub use seeds_io::{SeedsError, format_seeds, parse_seeds, read_seeds, write_seeds};
pub use types::{Features, NUM_CLUSTERS, Vec3};

/// Clusters one frame with a fresh engine and returns the hard label of every
/// sample, `None` where the sample is invalid.
///
/// Streams should keep an [`Engine`] around instead: it warm-starts each frame
/// from the previous one, which is what keeps the segments stable over time.
///
/// ```
/// use framecluster::{FrameSoA, Sample, Vec3};
///
/// let samples: Vec<Sample> = (0..8)
///     .map(|i| Sample {
///         position: Vec3::new(i as f32 * 10.0, 0.0, 1.0),
///         valid: i != 3,
///         ..Default::default()
///     })
///     .collect();
/// let frame = FrameSoA::from_samples(4, 2, &samples).unwrap();
///
/// let labels = framecluster::segment(&frame);
///
/// assert_eq!(labels.len(), 8);
/// assert_eq!(labels[3], None);
/// assert!(labels.iter().enumerate().all(|(i, l)| l.is_some() == (i != 3)));
/// ```
pub fn segment(frame: &FrameSoA) -> Vec<Option<u8>> {
    let config = EngineConfig::new(frame.width(), frame.height());
    let Ok(mut engine) = Engine::new(config) else {
        return vec![None; frame.len()];
    };
    engine.update(frame);
    (0..frame.len()).map(|i| engine.label(frame, i)).collect()
}
