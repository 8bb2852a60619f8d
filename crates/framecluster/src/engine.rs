use crate::blend::{self, DisplayMode, Palette};
use crate::frame::{FrameError, FrameSoA, ZeroFrameSizeSnafu};
use crate::kmeans::Representatives;
use crate::kmeans::distance::DistanceWeights;
use crate::kmeans::lloyds::{self, StepReport};
use crate::kmeans::plus_plus_init::{DEFAULT_LOCAL_TRIES, FirstSeed};
use crate::membership::{self, Votes};
use crate::rng;
use crate::seeding::{FixedSeeds, GreedySeeder, Seeder, UniformSeeder};
use crate::seeds_io;
use crate::types::{NUM_CLUSTERS, Vec3};
use rgb::RGB8;
use snafu::prelude::*;
use std::path::PathBuf;
use tracing::{debug, debug_span, info, warn};

/// Which seeding strategy initializes the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedingKind {
    /// No strategy: the engine declines to run until one is injected.
    None,
    Uniform,
    Greedy {
        local_tries: usize,
        first_seed: FirstSeed,
    },
    Fixed(Representatives),
}

impl Default for SeedingKind {
    fn default() -> Self {
        Self::Greedy {
            local_tries: DEFAULT_LOCAL_TRIES,
            first_seed: FirstSeed::Random,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub width: u16,
    pub height: u16,
    pub seeding: SeedingKind,
    pub weights: DistanceWeights,
    pub display: DisplayMode,
    /// Seeds the seeding strategy and the random palette.
    pub rng_seed: u64,
    /// Where to write automatically chosen seeds, for debugging.
    pub seed_export: Option<PathBuf>,
}

impl EngineConfig {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            seeding: SeedingKind::default(),
            weights: DistanceWeights::default(),
            display: DisplayMode::default(),
            rng_seed: rng::DEFAULT_SEED,
            seed_export: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoSeedingPolicy,
    /// The seeding strategy returned nothing.
    SeedingDeclined,
    NoValidSamples,
    FrameSizeMismatch { expected: usize, got: usize },
}

#[derive(Debug, Clone)]
pub enum StepOutcome {
    Stepped(StepReport),
    /// Nothing changed this frame.
    Skipped(SkipReason),
}

impl StepOutcome {
    pub fn report(&self) -> Option<&StepReport> {
        match self {
            Self::Stepped(report) => Some(report),
            Self::Skipped(_) => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum State {
    Uninitialized,
    Warm(Representatives),
}

/// Online clustering of a stream of same-sized frames.
///
/// Every [`Engine::update`] runs exactly one Lloyd step, warm-started from the
/// previous frame's representatives, then refreshes the soft memberships and the
/// display buffer. The first update seeds the representatives.
pub struct Engine {
    seeder: Option<Box<dyn Seeder>>,
    seed_export: Option<PathBuf>,
    weights: DistanceWeights,
    display_mode: DisplayMode,
    palette: Palette,
    state: State,
    labels: Vec<u8>,
    membership: Vec<Votes>,
    history: Vec<Vec3>,
    display: Vec<RGB8>,
    frames: u64,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("seeder", &self.seeder.as_ref().map(|s| s.name()))
            .field("state", &self.state)
            .field("samples", &self.labels.len())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, FrameError> {
        ensure!(config.width > 0 && config.height > 0, ZeroFrameSizeSnafu);

        let n = config.width as usize * config.height as usize;
        let seeder: Option<Box<dyn Seeder>> = match config.seeding {
            SeedingKind::None => None,
            SeedingKind::Uniform => Some(Box::new(UniformSeeder::new(config.rng_seed))),
            SeedingKind::Greedy {
                local_tries,
                first_seed,
            } => Some(Box::new(GreedySeeder::new(
                config.rng_seed,
                local_tries,
                first_seed,
            ))),
            SeedingKind::Fixed(representatives) => Some(Box::new(FixedSeeds(representatives))),
        };

        Ok(Self {
            seeder,
            seed_export: config.seed_export,
            weights: config.weights,
            display_mode: config.display,
            palette: blend::cluster_palette(&mut rng::with_seed(config.rng_seed)),
            state: State::Uninitialized,
            labels: vec![0; n],
            membership: vec![[0.0; NUM_CLUSTERS]; n],
            history: vec![Vec3::ZERO; n],
            display: vec![RGB8::default(); n],
            frames: 0,
        })
    }

    /// Replaces the seeding strategy. Only matters before the first successful
    /// update or after [`Engine::reset`].
    pub fn with_seeder(mut self, seeder: Box<dyn Seeder>) -> Self {
        self.seeder = Some(seeder);
        self
    }

    /// Processes one frame. Never fails: anything that prevents a step leaves
    /// the engine as it was and is reported as [`StepOutcome::Skipped`].
    pub fn update(&mut self, frame: &FrameSoA) -> StepOutcome {
        let _span = debug_span!("update", frame = self.frames).entered();

        if frame.len() != self.labels.len() {
            warn!(
                expected = self.labels.len(),
                got = frame.len(),
                "frame size doesn't match the engine"
            );
            return StepOutcome::Skipped(SkipReason::FrameSizeMismatch {
                expected: self.labels.len(),
                got: frame.len(),
            });
        }

        let valid = frame.valid_count();
        if valid == 0 {
            debug!("no valid samples, skipping");
            return StepOutcome::Skipped(SkipReason::NoValidSamples);
        }

        let mut representatives = match self.state {
            State::Warm(representatives) => representatives,
            State::Uninitialized => match self.initialize(frame) {
                Ok(representatives) => representatives,
                Err(reason) => return StepOutcome::Skipped(reason),
            },
        };

        let Some(report) = lloyds::step(
            frame,
            &self.weights,
            &mut representatives,
            &mut self.labels,
            &mut self.membership,
        ) else {
            return StepOutcome::Skipped(SkipReason::NoValidSamples);
        };

        self.state = State::Warm(representatives);

        blend::blend(
            frame,
            &self.membership,
            &self.palette,
            self.display_mode,
            &mut self.history,
            &mut self.display,
        );

        self.frames += 1;
        debug!(
            valid,
            counts = ?report.counts,
            empty = report.empty_clusters(),
            shift_squared = report.shift_squared,
            "lloyd step"
        );

        StepOutcome::Stepped(report)
    }

    fn initialize(&mut self, frame: &FrameSoA) -> Result<Representatives, SkipReason> {
        let Some(seeder) = self.seeder.as_mut() else {
            debug!("no seeding policy, staying uninitialized");
            return Err(SkipReason::NoSeedingPolicy);
        };

        let Some(seeds) = seeder.seed(frame) else {
            debug!(seeder = seeder.name(), "seeder declined");
            return Err(SkipReason::SeedingDeclined);
        };
        info!(seeder = seeder.name(), ?seeds, "initialized representatives");

        if let Some(path) = &self.seed_export
            && let Err(err) = seeds_io::write_seeds(path, &seeds)
        {
            warn!(%err, "seed export failed");
        }

        membership::reset(&mut self.membership);
        self.labels.fill(0);
        self.history.fill(Vec3::ZERO);

        Ok(seeds)
    }

    /// Back to the uninitialized state: the next update seeds again.
    pub fn reset(&mut self) {
        self.state = State::Uninitialized;
        membership::reset(&mut self.membership);
        self.labels.fill(0);
        self.history.fill(Vec3::ZERO);
        self.display.fill(RGB8::default());
        self.frames = 0;
    }

    pub fn is_warm(&self) -> bool {
        matches!(self.state, State::Warm(_))
    }

    /// Current cluster centers; `None` until the first successful update.
    pub fn representatives(&self) -> Option<&Representatives> {
        match &self.state {
            State::Warm(representatives) => Some(representatives),
            State::Uninitialized => None,
        }
    }

    /// Hard labels from the latest step. Only meaningful where the frame's
    /// validity mask is set; see [`Engine::label`].
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Hard label of one sample, `None` for invalid or out-of-range samples.
    pub fn label(&self, frame: &FrameSoA, index: usize) -> Option<u8> {
        let valid = *frame.valid().get(index)?;
        let label = *self.labels.get(index)?;
        (valid && self.is_warm()).then_some(label)
    }

    pub fn membership(&self) -> &[Votes] {
        &self.membership
    }

    /// Blended display colors, one per sample.
    pub fn display(&self) -> &[RGB8] {
        &self.display
    }

    /// Palette color of each sample's hard label, black where invalid.
    pub fn label_colors(&self, frame: &FrameSoA) -> Vec<RGB8> {
        let mut out = vec![RGB8::default(); self.labels.len()];
        if frame.len() == self.labels.len() {
            blend::label_colors(frame, &self.labels, &self.palette, &mut out);
        }
        out
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
    }

    /// Frames that produced a step since creation or the last reset.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
