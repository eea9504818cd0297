use crate::error::AppError;
use crate::event::ImageReference;
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    pub content_length: Option<i64>,
}

/// The storage capability this service consumes: a metadata lookup used to
/// confirm an uploaded object actually exists before recognition runs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn head_object(&self, image: &ImageReference) -> Result<ObjectMetadata, AppError>;
}
