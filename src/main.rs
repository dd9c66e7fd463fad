//! farm-hud: command-line front end for the farm HUD assistant.
//!
//! Frames are JSON files mapping HUD field names to their raw OCR text, as
//! produced by an external capture/OCR stage.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use farm_hud_assistant::batch::{FrameWorkItem, create_work_queue, run_frame_worker};
use farm_hud_assistant::knowledge::KnowledgeBase;
use farm_hud_assistant::paths;
use farm_hud_assistant::pipeline::{analyze, load_engine, read_fields};
use farm_hud_assistant::report::{Journal, render_frame};
use farm_hud_assistant::rules::{EngineSettings, RuleEngine};

#[derive(Parser, Debug)]
#[command(name = "farm-hud")]
#[command(about = "Interprets OCR text from a farm game's crop HUD and gives advice")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one frame file and print the advice.
    Analyze {
        /// JSON object of HUD field name → raw OCR text
        frame: PathBuf,

        #[command(flatten)]
        common: CommonArgs,

        /// Also write the frame summary as pretty JSON
        #[arg(long)]
        save_json: Option<PathBuf>,

        /// Journal file (default: logs/farm_log.txt next to the executable)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Analyze many frame files on a background worker.
    Batch {
        #[arg(required = true)]
        frames: Vec<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,

        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Load a knowledge table and list what it knows.
    Knowledge {
        /// Knowledge table (JSON or YAML); the embedded table if omitted
        #[arg(long)]
        knowledge: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Settings file (JSON or YAML). Without it, settings.json next to the
    /// executable is used if present
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Knowledge table overriding the one named in the settings
    #[arg(long)]
    knowledge: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            frame,
            common,
            save_json,
            log_file,
        } => run_analyze(&frame, &common, save_json.as_deref(), log_file),
        Commands::Batch {
            frames,
            common,
            log_file,
        } => run_batch(frames, &common, log_file),
        Commands::Knowledge { knowledge } => run_knowledge(knowledge.as_deref()),
    }
}

/// An explicit settings file must load; the default one may be missing.
fn load_settings(path: Option<&Path>) -> Result<EngineSettings> {
    match path {
        Some(path) => EngineSettings::load_strict(path),
        None => Ok(EngineSettings::load(&paths::default_settings_path())),
    }
}

fn build_engine(common: &CommonArgs) -> Result<RuleEngine> {
    let settings = load_settings(common.settings.as_deref())?;
    load_engine(settings, common.knowledge.as_deref())
}

fn open_journal(log_file: Option<PathBuf>) -> Result<Journal> {
    Journal::new(log_file.unwrap_or_else(paths::default_log_path))
}

fn run_analyze(frame: &Path, common: &CommonArgs, save_json: Option<&Path>, log_file: Option<PathBuf>) -> Result<()> {
    let engine = build_engine(common)?;
    let fields = read_fields(frame)?;
    let journal = open_journal(log_file)?;

    let analysis = analyze(&engine, &fields);
    render_frame(&analysis, &journal, save_json)?;
    if let Some(path) = save_json {
        info!(path = %path.display(), "summary saved");
    }
    Ok(())
}

fn run_batch(frames: Vec<PathBuf>, common: &CommonArgs, log_file: Option<PathBuf>) -> Result<()> {
    let engine = Arc::new(build_engine(common)?);
    let journal = open_journal(log_file)?;
    let (sender, receiver) = create_work_queue();

    let worker = thread::Builder::new()
        .name("frame-worker".to_string())
        .spawn(move || run_frame_worker(receiver, engine, journal))
        .context("Failed to spawn frame worker")?;

    for (i, frame) in frames.into_iter().enumerate() {
        let sequence = u32::try_from(i + 1).context("Too many frames in one batch")?;
        sender
            .send(FrameWorkItem::new(frame, sequence))
            .context("Frame worker stopped early")?;
    }
    drop(sender);

    let stats = match worker.join() {
        Ok(stats) => stats,
        Err(_) => bail!("Frame worker panicked"),
    };
    info!(
        analyzed = stats.analyzed,
        skipped = stats.skipped,
        alerted = stats.alerted,
        "batch complete"
    );
    if stats.analyzed == 0 && stats.skipped > 0 {
        bail!("No frame could be read");
    }
    Ok(())
}

fn run_knowledge(path: Option<&Path>) -> Result<()> {
    let knowledge = match path {
        Some(path) => KnowledgeBase::load_from_file(path)
            .with_context(|| format!("Failed to load knowledge table: {}", path.display()))?,
        None => KnowledgeBase::load_default().context("Embedded knowledge table is invalid")?,
    };

    println!("Crops ({}):", knowledge.crop_names().len());
    for crop in knowledge.crop_names() {
        println!("  {}", crop);
    }
    for category in knowledge.pest_categories() {
        println!("Pests [{}]:", category);
        for (class, chemical) in knowledge.chemicals(category) {
            println!("  {} {:.1} л: {}", class, chemical.volume_l, chemical.targets.join(", "));
        }
    }
    Ok(())
}
