use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use harmonia::chart::{ChartOrchestrator, Subject, TransitMoment};
use harmonia::ephemeris::PrecomputedEphemeris;
use harmonia::{AspectConfig, Point};
use harmonia_config::HarmoniaSettings;

#[derive(Parser)]
#[command(name = "harmonia", about = "Aspect, composite and compatibility charts")]
struct Cli {
    /// Config file (defaults to configs/harmonia.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Precomputed positions JSON, overriding [ephemeris].positions
    #[arg(long, global = true)]
    positions: Option<PathBuf>,
    /// JSON array of subjects
    #[arg(long, global = true, default_value = "subjects.json")]
    subjects: PathBuf,
    /// Restrict aspects to these points for this run (comma separated)
    #[arg(long, global = true, value_delimiter = ',')]
    points: Vec<String>,
    /// Include minor aspects, with their default orbs
    #[arg(long, global = true)]
    minor: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Positions of one subject
    Positions {
        /// Subject name
        name: String,
    },
    /// Natal aspects of one subject
    Natal {
        /// Subject name
        name: String,
    },
    /// Cross aspects between two subjects
    Synastry {
        first: String,
        second: String,
        /// Include the relationship score
        #[arg(long)]
        score: bool,
    },
    /// Relationship score between two subjects
    Score { first: String, second: String },
    /// Natal subject against the sky at a later local time
    Transit {
        name: String,
        /// Local date-time (YYYY-MM-DDThh:mm:ss) at the natal place
        #[arg(long)]
        at: String,
    },
    /// Midpoint composite of two subjects
    Composite { first: String, second: String },
    /// Positions for a UTC instant at Greenwich
    Now {
        /// UTC date-time (YYYY-MM-DDThh:mm:ssZ); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = harmonia_config::load_config(cli.config.as_deref())?;
    let orchestrator = build_orchestrator(&settings, cli.positions.as_deref())?;
    let selection = aspect_selection(&settings, &cli.points, cli.minor)?;
    let aspects = selection.as_ref();

    match cli.command {
        Commands::Positions { name } => {
            let subjects = load_subjects(&cli.subjects)?;
            let set = orchestrator.birth_data(find(&subjects, &name)?).await?;
            print_json(&set)
        }
        Commands::Natal { name } => {
            let subjects = load_subjects(&cli.subjects)?;
            let chart = orchestrator
                .birth_aspects(find(&subjects, &name)?, aspects)
                .await?;
            print_json(&chart)
        }
        Commands::Synastry {
            first,
            second,
            score,
        } => {
            let subjects = load_subjects(&cli.subjects)?;
            let chart = orchestrator
                .synastry_aspects(
                    find(&subjects, &first)?,
                    find(&subjects, &second)?,
                    score,
                    aspects,
                )
                .await?;
            print_json(&chart)
        }
        Commands::Score { first, second } => {
            let subjects = load_subjects(&cli.subjects)?;
            let score = orchestrator
                .relationship_score(find(&subjects, &first)?, find(&subjects, &second)?, aspects)
                .await?;
            print_json(&score)
        }
        Commands::Transit { name, at } => {
            let subjects = load_subjects(&cli.subjects)?;
            let local = NaiveDateTime::parse_from_str(&at, "%Y-%m-%dT%H:%M:%S")
                .with_context(|| format!("Invalid transit time {at:?}, expected YYYY-MM-DDThh:mm:ss"))?;
            let chart = orchestrator
                .transit_aspects(find(&subjects, &name)?, &TransitMoment::new(local), aspects)
                .await?;
            print_json(&chart)
        }
        Commands::Composite { first, second } => {
            let subjects = load_subjects(&cli.subjects)?;
            let chart = orchestrator
                .composite_aspects(find(&subjects, &first)?, find(&subjects, &second)?, aspects)
                .await?;
            print_json(&chart)
        }
        Commands::Now { at } => {
            let now = match at {
                Some(text) => DateTime::parse_from_rfc3339(&text)
                    .with_context(|| format!("Invalid UTC time {text:?}"))?
                    .with_timezone(&Utc),
                None => Utc::now(),
            };
            let set = orchestrator.current_sky(now).await?;
            print_json(&set)
        }
    }
}

fn build_orchestrator(
    settings: &HarmoniaSettings,
    positions_override: Option<&Path>,
) -> anyhow::Result<ChartOrchestrator> {
    let path = positions_override
        .map(Path::to_path_buf)
        .or_else(|| settings.positions_path.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("No positions file: pass --positions or set [ephemeris].positions")
        })?;
    let ephemeris = PrecomputedEphemeris::from_json_file(&path)
        .with_context(|| format!("Failed to load positions from {}", path.display()))?;
    log::info!(
        "Loaded {} position sets from {}",
        ephemeris.sets().len(),
        path.display()
    );
    Ok(ChartOrchestrator::new(Arc::new(ephemeris)).with_settings(settings.engine.clone()))
}

/// Per-run aspect selection, when `--points` or `--minor` is given.
fn aspect_selection(
    settings: &HarmoniaSettings,
    points: &[String],
    minor: bool,
) -> anyhow::Result<Option<AspectConfig>> {
    if points.is_empty() && !minor {
        return Ok(None);
    }
    let mut config = if minor {
        AspectConfig::major_and_minor()
    } else {
        settings.engine.aspects.clone()
    };
    if !points.is_empty() {
        let points = points
            .iter()
            .map(|name| name.parse::<Point>())
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid --points")?;
        config = config.with_points(points);
    }
    Ok(Some(config))
}

fn load_subjects(path: &Path) -> anyhow::Result<Vec<Subject>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read subjects file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse subjects file {}", path.display()))
}

fn find<'a>(subjects: &'a [Subject], name: &str) -> anyhow::Result<&'a Subject> {
    subjects
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| anyhow::anyhow!("No subject named {name:?} in the subjects file"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
