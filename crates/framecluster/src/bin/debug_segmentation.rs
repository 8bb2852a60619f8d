use clap::{Parser, ValueEnum};
use framecluster::debug_helpers::{SceneArgs, ensure_out_dir, input_colors, render_scene, to_image};
use framecluster::{
    DEFAULT_LOCAL_TRIES, DEFAULT_SEED, DisplayMode, Engine, EngineConfig, FirstSeed, FrameSoA,
    SeedingKind, StepOutcome, read_seeds,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, ValueEnum)]
enum Seeding {
    Uniform,
    Greedy,
}

#[derive(Parser)]
struct Args {
    #[command(flatten)]
    scene: SceneArgs,

    #[arg(long, value_enum, default_value_t = Seeding::Greedy)]
    seeding: Seeding,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Start from these representatives instead of seeding automatically
    #[arg(long)]
    seeds_file: Option<PathBuf>,

    /// Write the automatically chosen seeds here
    #[arg(long)]
    export_seeds: Option<PathBuf>,

    /// Show only this cluster, in the input colors
    #[arg(long)]
    highlight: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let (w, h) = (args.scene.width, args.scene.height);
    let out_dir = ensure_out_dir(&args.scene.out, "segmentation")?;

    let seeding = match (&args.seeds_file, args.seeding) {
        (Some(path), _) => SeedingKind::Fixed(read_seeds(path)?),
        (None, Seeding::Uniform) => SeedingKind::Uniform,
        (None, Seeding::Greedy) => SeedingKind::Greedy {
            local_tries: DEFAULT_LOCAL_TRIES,
            first_seed: FirstSeed::Random,
        },
    };
    let config = EngineConfig {
        seeding,
        rng_seed: args.seed,
        seed_export: args.export_seeds.clone(),
        display: args
            .highlight
            .map_or(DisplayMode::Palette, DisplayMode::Highlight),
        ..EngineConfig::new(w, h)
    };

    let mut engine = Engine::new(config)?;
    let mut frame = FrameSoA::new(w, h)?;

    for t in 0..args.scene.frames {
        render_scene(&mut frame, t);

        let start = Instant::now();
        let outcome = engine.update(&frame);
        let elapsed = start.elapsed();

        match &outcome {
            StepOutcome::Stepped(report) => println!(
                "frame {t}: {:?}, counts {:?}, shift² {:.6}",
                elapsed, report.counts, report.shift_squared
            ),
            StepOutcome::Skipped(reason) => println!("frame {t}: skipped ({reason:?})"),
        }

        to_image(w, h, engine.display()).save(out_dir.join(format!("{t:03}_blended.png")))?;
        to_image(w, h, &engine.label_colors(&frame))
            .save(out_dir.join(format!("{t:03}_labels.png")))?;
        to_image(w, h, &input_colors(&frame)).save(out_dir.join(format!("{t:03}_input.png")))?;
    }

    if let Some(reps) = engine.representatives() {
        println!("final representatives: {reps:?}");
    }

    Ok(())
}
