use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dendroscan::{Detection, Pipeline, PipelineConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Classify the plants in one photo and print the JSON answer.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Photo to classify (JPEG or PNG)
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Pipeline YAML; the built-in configuration when omitted
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON list of detections answered by the static detector
    #[arg(long, value_name = "FILE")]
    detections: Option<PathBuf>,

    /// Request id used in object names and logs
    #[arg(long, default_value = "local")]
    request_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::builtin()?,
    };
    if let Some(path) = &args.detections {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let detections: Vec<Detection> =
            serde_json::from_str(&raw).context("parsing detections")?;
        config.detector.mode = "static".into();
        config.detector.detections = detections;
    }

    let pipeline = Pipeline::from_config(&config).await?;
    info!(pipeline = ?pipeline.describe(), "pipeline built");

    let photo = std::fs::read(&args.image)
        .with_context(|| format!("reading {}", args.image.display()))?;
    let response = pipeline.predict(&photo, &args.request_id).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
