use crate::error::AppError;
use crate::event::ImageReference;
use crate::storage::{ObjectMetadata, ObjectStore};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;

pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        log::debug!("Creating S3 client");
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn head_object(&self, image: &ImageReference) -> Result<ObjectMetadata, AppError> {
        log::trace!("Fetching object metadata for {}", image);

        let output = self
            .client
            .head_object()
            .bucket(&image.bucket)
            .key(&image.key)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.into_service_error().to_string()))?;

        Ok(ObjectMetadata {
            content_type: output.content_type().map(str::to_string),
            content_length: output.content_length(),
        })
    }
}
