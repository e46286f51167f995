use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use hybridtrack_core::evaluation::batch_evaluator::BatchEvaluator;
use hybridtrack_core::evaluation::domain::sequence_source::SequenceSource;
use hybridtrack_core::evaluation::infrastructure::dataset_sequence::discover;
use hybridtrack_core::evaluation::infrastructure::fps_summary_writer::FpsSummaryWriter;
use hybridtrack_core::evaluation::infrastructure::text_result_writer::{
    format_records, write_records, TextResultWriter,
};
use hybridtrack_core::pipeline::run_logger::StdoutRunLogger;
use hybridtrack_core::pipeline::sequence_runner::{RunnerConfig, SequenceRunner};
use hybridtrack_core::shared::bbox::BBox;
use hybridtrack_core::shared::tracking_config::{RunMode, TrackingConfig};
use hybridtrack_core::shared::tracking_error::TrackingError;
use hybridtrack_core::tracking::domain::pending_selection::PendingSelection;
use hybridtrack_core::tracking::domain::tracker_arbiter::{ArbiterConfig, TrackerArbiter};
use hybridtrack_core::tracking::infrastructure::global_template_detector::GlobalTemplateDetector;
use hybridtrack_core::tracking::infrastructure::template_tracker::TemplateTracker;
use hybridtrack_core::video::infrastructure::image_sequence_reader::ImageSequenceReader;

/// Hybrid single-object tracking over image sequences.
#[derive(Parser)]
#[command(name = "hybridtrack")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Track the annotated target through every sequence of a dataset.
    Benchmark(BenchmarkArgs),
    /// Track one target through one directory of frames.
    Track(TrackArgs),
}

#[derive(Args)]
struct BenchmarkArgs {
    /// Directory holding one subdirectory of frames per sequence.
    sequences_dir: PathBuf,

    /// Directory holding `<sequence>.txt` annotations.
    annotations_dir: PathBuf,

    /// Directory receiving `<sequence>.txt` results.
    results_dir: PathBuf,

    /// File that per-sequence mean fps lines are appended to.
    fps_file: PathBuf,

    /// Sequences evaluated in parallel.
    #[arg(long, default_value = "1")]
    workers: usize,

    #[command(flatten)]
    tuning: TuningArgs,
}

#[derive(Args)]
struct TrackArgs {
    /// Directory of frames, ordered by file name.
    frames_dir: PathBuf,

    /// Initial target box as x,y,width,height.
    #[arg(long, value_parser = parse_box)]
    init_box: BBox,

    /// Write results here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    tuning: TuningArgs,
}

#[derive(Args)]
struct TuningArgs {
    /// JSON settings file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings to this JSON file.
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Hash distance (0-64) at which the re-detector takes over.
    #[arg(long)]
    threshold: Option<u32>,

    /// Smallest box side kept, in pixels.
    #[arg(long)]
    min_side: Option<f64>,

    /// Side of the hashed thumbnail (1-16).
    #[arg(long)]
    fingerprint_side: Option<u32>,

    /// Frames slower than this end the sequence early.
    #[arg(long)]
    stall_fps: Option<f64>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Benchmark(args) => run_benchmark(args),
        Command::Track(args) => run_track(args),
    }
}

fn run_benchmark(args: BenchmarkArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&args.tuning, RunMode::Benchmark)?;

    let sequences: Vec<Box<dyn SequenceSource>> =
        discover(&args.sequences_dir, &args.annotations_dir)?
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn SequenceSource>)
            .collect();
    if sequences.is_empty() {
        return Err(format!("No sequences found in {}", args.sequences_dir.display()).into());
    }

    let factory = || build_arbiter(&config);
    let report = BatchEvaluator::new(RunnerConfig::from(&config))
        .with_workers(args.workers)
        .with_result_sink(Box::new(TextResultWriter::new(&args.results_dir)))
        .with_summary_sink(Box::new(FpsSummaryWriter::new(&args.fps_file)))
        .run(&sequences, &factory);

    for (label, reason) in &report.skipped {
        log::warn!("{label} skipped: {reason}");
    }
    log::info!("Results written to {}", args.results_dir.display());
    println!("Re-detector trigger rate: {}", report.mean_trigger_rate);
    Ok(())
}

fn run_track(args: TrackArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&args.tuning, RunMode::Interactive)?;

    let mut frames = ImageSequenceReader::open(&args.frames_dir)?;
    let mut arbiter = build_arbiter(&config)?;
    let mut runner = SequenceRunner::new(RunnerConfig::from(&config))
        .with_logger(Box::new(StdoutRunLogger::default()));
    let run = runner.run(
        &mut arbiter,
        &mut frames,
        PendingSelection::new(args.init_box),
    )?;

    match &args.output {
        Some(path) => {
            write_records(path, &run.records)?;
            log::info!("Results written to {}", path.display());
        }
        None => print!("{}", format_records(&run.records)),
    }
    Ok(())
}

/// Settings file (or mode defaults), then flag overrides.
fn resolve_config(
    tuning: &TuningArgs,
    mode: RunMode,
) -> Result<TrackingConfig, Box<dyn std::error::Error>> {
    let mut config = match &tuning.config {
        Some(path) => TrackingConfig::load(path)?,
        None => TrackingConfig::for_mode(mode),
    };
    config.mode = mode;
    apply_overrides(&mut config, tuning);
    config.validate()?;

    if let Some(path) = &tuning.save_config {
        config.save(path)?;
        log::info!("Settings saved to {}", path.display());
    }
    log::info!(
        "Mode {mode}: threshold {}, min side {}, fingerprint {}x{}, stall floor {} fps",
        config.change_threshold,
        config.min_side,
        config.fingerprint_side,
        config.fingerprint_side,
        config.stall_fps()
    );
    Ok(config)
}

fn apply_overrides(config: &mut TrackingConfig, tuning: &TuningArgs) {
    if let Some(threshold) = tuning.threshold {
        config.change_threshold = threshold;
    }
    if let Some(min_side) = tuning.min_side {
        config.min_side = min_side;
    }
    if let Some(side) = tuning.fingerprint_side {
        config.fingerprint_side = side;
    }
    if let Some(floor) = tuning.stall_fps {
        config.stall_fps_floor = Some(floor);
    }
}

fn build_arbiter(config: &TrackingConfig) -> Result<TrackerArbiter, TrackingError> {
    Ok(TrackerArbiter::new(
        Box::new(TemplateTracker::default()),
        Box::new(GlobalTemplateDetector::default()),
        ArbiterConfig::from(config),
    ))
}

fn parse_box(value: &str) -> Result<BBox, String> {
    let fields: Vec<f64> = value
        .split(',')
        .map(|f| f.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid box '{value}': {e}"))?;
    match fields.as_slice() {
        [x, y, width, height] => Ok(BBox::new(*x, *y, *width, *height)),
        _ => Err(format!("expected x,y,width,height, got '{value}'")),
    }
}
