//! CardScan - business-card capture and text recognition
//!
//! Acquires a camera stream (here: a still-image device fed from disk),
//! snapshots a frame, and runs OCR through either the local engine or the
//! cloud text-detection endpoint.

mod camera;
mod capture;
mod config;
mod error;
mod recognize;
mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::camera::{CameraSessionManager, FacingMode, StillImageCamera};
use crate::capture::{FrameCapture, FrameStore};
use crate::config::AppConfig;
use crate::recognize::{
    CloudVisionClient, EngineSelector, RecognitionDispatcher, TesseractCliEngine,
};
use crate::status::{StatusReporter, TextField};

/// CardScan - capture a business card and extract its text
#[derive(Parser, Debug)]
#[command(name = "cardscan")]
#[command(about = "Capture a business card image and extract its text")]
struct Args {
    /// Image file served by the still-image camera device
    image: PathBuf,

    /// Recognition engine (local-ocr or cloud-vision); defaults to the
    /// configured engine
    #[arg(short, long)]
    engine: Option<EngineSelector>,

    /// Facing mode the still-image device satisfies; requesting the other
    /// mode exercises the rear-camera fallback
    #[arg(long, default_value = "user")]
    device_facing: FacingMode,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_or_create_config(args.config.as_deref());
    let engine = args.engine.unwrap_or(config.recognition.engine);

    let status = StatusReporter::new();
    let output = TextField::new();
    let store = FrameStore::new();

    let device = Arc::new(StillImageCamera::new(&args.image, args.device_facing));
    let session = Arc::new(CameraSessionManager::new(
        device,
        store.clone(),
        status.clone(),
    ));

    session
        .start(config.camera.initial_facing)
        .await
        .context("camera start failed")?;

    let frame_capture = FrameCapture::new(session.clone(), store.clone(), status.clone());
    let (width, height) = frame_capture.capture().context("frame capture failed")?;
    info!("captured {}x{} frame from {}", width, height, args.image.display());

    let dispatcher = RecognitionDispatcher::new(
        Box::new(TesseractCliEngine::default()),
        CloudVisionClient::new(&config.cloud),
        store,
        status.clone(),
        output.clone(),
        &config.recognition,
    );
    dispatcher
        .recognize(engine)
        .await
        .context("recognition failed")?;

    info!("status: {}", status.current().message);
    println!("{}", output.get());

    Ok(())
}

/// Load configuration from the given path, the default location, or fall
/// back to defaults
fn load_or_create_config(path: Option<&Path>) -> AppConfig {
    if let Some(path) = path {
        match config::load_config(path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                return config;
            }
            Err(e) => {
                tracing::warn!("Failed to load {:?}: {e}, using defaults", path);
                return AppConfig::default();
            }
        }
    }

    if let Ok(default_path) = config::default_config_path() {
        if default_path.exists() {
            if let Ok(config) = config::load_config(&default_path) {
                info!("Loaded configuration from {:?}", default_path);
                return config;
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}
