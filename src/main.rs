mod aws_clients;
mod config;
mod error;
mod event;
mod recognition;
mod resolver;
mod storage;
mod web_server;

use crate::aws_clients::rekognition::RekognitionRecognizer;
use crate::aws_clients::s3::S3ObjectStore;
use crate::config::AppConfig;
use crate::recognition::FaceRecognizer;
use crate::resolver::{FaceResolutionWorkflow, ResolutionSettings};
use crate::storage::ObjectStore;
use anyhow::Result;
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::new()?;

    // Initialize env_logger based on config.log_level
    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    info!("Starting face-resolver");

    let sdk_config = aws_clients::load_sdk_config(&config).await;
    let recognizer: Arc<dyn FaceRecognizer> =
        Arc::new(RekognitionRecognizer::new(&sdk_config, &config));
    let store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::new(&sdk_config));

    let workflow = Arc::new(FaceResolutionWorkflow::new(
        recognizer,
        store,
        ResolutionSettings::from(&config),
    ));

    // Run the web server in the foreground
    if let Err(e) = web_server::start_web_server(config.web_port, workflow).await {
        log::error!("Web server error: {}", e);
    }

    info!("face-resolver finished");

    Ok(())
}
