use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use croprec_core::FeatureRequest;
use croprec_host::{Health, Recommender};
use croprec_store::ArtifactStore;
use serde_json::Value;

mod display;

#[derive(Parser)]
#[command(
    name = "croprec",
    version,
    about = "Crop recommendations from soil and climate measurements"
)]
struct Cli {
    /// Model artifact (JSON bundle).
    #[arg(
        long,
        global = true,
        env = "CROPREC_ARTIFACT",
        default_value = "models/crop_recommendation.json"
    )]
    artifact: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank the most suitable crops for a set of measurements.
    Recommend {
        /// Number of crops to return [default: 5].
        #[arg(long, short = 'n')]
        top_n: Option<usize>,

        /// Feature value as NAME=VALUE, e.g. `-f ph=6.5`. Repeatable; overrides --input.
        #[arg(long = "feature", short = 'f', value_parser = parse_feature)]
        features: Vec<(String, String)>,

        /// JSON object with feature values (and optionally `top_n`). `-` reads stdin.
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show what a model artifact contains.
    Inspect,
    /// Load the artifact and print a readiness report.
    Health,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    tracing::info!("croprec v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(ArtifactStore::new());

    match cli.command {
        Command::Recommend {
            top_n,
            features,
            input,
            json,
        } => {
            load(&store, &cli.artifact)?;
            let recommender = Recommender::new(store);

            let mut request = match input {
                Some(path) => read_request(&path)?,
                None => FeatureRequest::new(),
            };
            for (name, value) in features {
                request.features.insert(name, Value::String(value));
            }
            if top_n.is_some() {
                request.top_n = top_n;
            }

            // The recommender has already logged the full error; callers only
            // see the redacted message.
            let recs = match recommender.recommend(&request) {
                Ok(recs) => recs,
                Err(e) => {
                    if json {
                        display::print_error_json(&e)?;
                    }
                    anyhow::bail!("recommendation failed: {}", e.public_message());
                }
            };
            if json {
                display::print_json(&recs)?;
            } else {
                display::print_recommendations(&recs);
            }
        }
        Command::Inspect => {
            let artifact = load(&store, &cli.artifact)?;
            display::print_artifact(&artifact, &cli.artifact);
        }
        Command::Health => {
            let loaded = load(&store, &cli.artifact);
            let health = match &loaded {
                Ok(_) => Recommender::new(Arc::clone(&store)).health(),
                Err(_) => Health::unavailable(),
            };
            println!("{}", serde_json::to_string_pretty(&health)?);
            if !health.is_ok() {
                loaded?;
                anyhow::bail!("model artifact is not available");
            }
        }
    }

    Ok(())
}

/// Load the artifact or fail the process; nothing is served without one.
fn load(store: &ArtifactStore, path: &Path) -> anyhow::Result<Arc<croprec_ai::ModelArtifact>> {
    store
        .load(path)
        .with_context(|| format!("loading model artifact {}", path.display()))
}

fn read_request(path: &Path) -> anyhow::Result<FeatureRequest> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading request {}", path.display()))?
    };
    serde_json::from_str(&text).context("request must be a JSON object of feature values")
}

fn parse_feature(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing feature name in '{s}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
