//! Command line entry points for the pipeline.
//!
//! `faceinsight <image>` analyzes a still image and prints the structured
//! JSON result; `faceinsight --stream` writes annotated multipart JPEG
//! parts from the configured capture device to stdout.

use std::env;
use std::fs;

use anyhow::{bail, Context, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use faceinsight::annotations::PredictionReport;
use faceinsight::config::Config;
use faceinsight::error::PipelineError;
use faceinsight::pipeline::{Analysis, Pipeline};

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let config = Config::load(Config::default_path()).unwrap_or_else(|error| {
        info!("Using default config ({error})");
        Config::default()
    });

    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("--stream") => run_stream(&config),
        Some(path) => analyze_still(&config, path),
        None => bail!("usage: faceinsight <image> | faceinsight --stream"),
    }
}

fn analyze_still(config: &Config, path: &str) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let bytes = fs::read(path).with_context(|| format!("failed to read {path}"))?;
    let output = match pipeline.analyze_bytes(&bytes) {
        Ok(Analysis::Face { prediction, .. }) => {
            serde_json::to_string_pretty(&PredictionReport::from(&prediction))?
        }
        Ok(Analysis::NoFace) => rejection("No face detected")?,
        Err(PipelineError::InvalidImage(error)) => {
            info!("rejected input: {error}");
            rejection("Invalid image format")?
        }
        Err(error) => return Err(error.into()),
    };
    println!("{output}");
    Ok(())
}

fn rejection(message: &str) -> Result<String> {
    Ok(serde_json::to_string_pretty(
        &serde_json::json!({ "error": message }),
    )?)
}

#[cfg(feature = "camera")]
fn run_stream(config: &Config) -> Result<()> {
    use std::io::{self, Write};

    use faceinsight::pipeline::LiveAnnotator;
    use faceinsight::render::OverlayRenderer;
    use faceinsight::stream::{AnnotatedStream, CameraSource};

    let pipeline = Pipeline::from_config(config)?;
    let renderer = OverlayRenderer::new(&config.overlay)?;
    let source = CameraSource::open(&config.stream)?;
    info!(
        device = config.stream.device_index,
        "streaming annotated frames to stdout"
    );

    let mut stdout = io::stdout().lock();
    for part in AnnotatedStream::new(source, LiveAnnotator::new(pipeline, renderer)) {
        stdout.write_all(&part)?;
        stdout.flush()?;
    }
    info!("capture source closed, stream finished");
    Ok(())
}

#[cfg(not(feature = "camera"))]
fn run_stream(_config: &Config) -> Result<()> {
    bail!("this build has no camera support; rebuild with --features camera")
}
