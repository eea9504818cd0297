pub mod rekognition;
pub mod s3;

use crate::config::AppConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Loads the shared AWS SDK configuration. The endpoint override is only
/// set when configured, so production deployments resolve the regional
/// endpoints while local runs can point at an emulator.
pub async fn load_sdk_config(config: &AppConfig) -> SdkConfig {
    log::debug!("Loading AWS SDK configuration for region: {}", config.aws_region);

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));

    if let Some(endpoint) = &config.aws_endpoint_url {
        log::info!("Using AWS endpoint override: {}", endpoint);
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}
