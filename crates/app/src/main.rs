use std::path::{Path, PathBuf};

use chartgen_core::{
    generator::{MAX_KEYS, MIN_KEYS},
    rng::{create_rng, derive_section_seed, entropy_rng},
    AnalysisInput, AppConfig, ChartMetadata, DifficultyLevel, NoteChart,
};
use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Serialize};
use tracing_subscriber::EnvFilter;

fn main() -> chartgen_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Regenerate(args) => run_regenerate(args),
        Commands::Score { chart } => run_score(&chart),
    }
}

fn run_generate(args: GenerateArgs) -> chartgen_core::Result<()> {
    tracing::info!(input = ?args.analysis, output = ?args.output, "generating chart");

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(difficulty) = args.difficulty {
        config.generator.difficulty = difficulty;
    }
    if let Some(seed) = args.seed {
        config.generator.seed = Some(seed);
    }

    let input: AnalysisInput = read_json(&args.analysis)?;
    input.validate()?;

    // Key counts typed on the command line are clamped; the config file is not.
    if let Some(keys) = args.keys {
        let clamped = keys.clamp(MIN_KEYS, MAX_KEYS);
        if clamped != keys {
            tracing::warn!(requested = keys, used = clamped, "clamped key count");
        }
        config.generator.num_keys = clamped;
    }
    let generator = config.generator.build_generator()?;

    let metadata = ChartMetadata::new(args.title, args.artist, args.audio_file);
    let mut rng = config.generator.rng();
    let chart = generator.generate(&input, metadata, &mut rng)?;

    tracing::info!(
        notes = chart.notes.len(),
        rating = chart.difficulty_value,
        "chart written"
    );
    write_json(&args.output, &chart)
}

fn run_regenerate(args: RegenerateArgs) -> chartgen_core::Result<()> {
    tracing::info!(
        chart = ?args.chart,
        start = args.start,
        end = args.end,
        "regenerating section"
    );

    let chart: NoteChart = read_json(&args.chart)?;
    let input: AnalysisInput = read_json(&args.analysis)?;
    input.validate()?;

    let mut rng = match args.seed {
        Some(seed) => create_rng(derive_section_seed(seed, args.start, args.end)),
        None => entropy_rng(),
    };

    // Charts do not store their profile, so an override must come from the
    // same config file used to generate them.
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let generator = config.generator.generator_for_chart(&chart)?;
    let mut result =
        generator.regenerate_section(&chart, args.start, args.end, &input, &mut rng)?;
    if args.rescore {
        let rating = result.rescore();
        tracing::info!(rating, "rescored chart");
    }

    write_json(&args.output, &result)
}

fn run_score(path: &Path) -> chartgen_core::Result<()> {
    let chart: NoteChart = read_json(path)?;
    let rating = chartgen_core::score_difficulty(&chart.notes, chart.duration_seconds);
    println!("{rating}");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> chartgen_core::Result<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> chartgen_core::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text)?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Rhythm game chart generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a new chart from a song's analysis.
    Generate(GenerateArgs),
    /// Re-roll the notes inside a time window of an existing chart.
    Regenerate(RegenerateArgs),
    /// Print the 1-10 difficulty rating of a chart.
    Score {
        /// Chart file to rate.
        chart: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Analysis JSON with tempo, beats, onsets and energy envelope.
    analysis: PathBuf,
    /// Output path for the generated chart.
    #[arg(short, long)]
    output: PathBuf,
    /// Number of lanes, clamped to 1-6.
    #[arg(short, long)]
    keys: Option<usize>,
    /// One of easy, normal, hard, expert or master.
    #[arg(short, long)]
    difficulty: Option<DifficultyLevel>,
    /// Seed for a reproducible chart.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Optional configuration file providing generator defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    artist: String,
    #[arg(long, default_value = "")]
    audio_file: String,
}

#[derive(clap::Args, Debug)]
struct RegenerateArgs {
    /// Chart to edit.
    chart: PathBuf,
    /// Analysis the chart was generated from.
    analysis: PathBuf,
    /// Window start in seconds, inclusive.
    #[arg(long, allow_negative_numbers = true)]
    start: f64,
    /// Window end in seconds, exclusive.
    #[arg(long, allow_negative_numbers = true)]
    end: f64,
    #[arg(short, long)]
    output: PathBuf,
    /// Base seed; combined with the window bounds to pick the stream.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Configuration file whose profile override, if any, is reused.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Recompute the difficulty rating after regenerating.
    #[arg(long)]
    rescore: bool,
}
