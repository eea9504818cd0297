use crate::error::AppError;
use crate::event::ImageReference;
use async_trait::async_trait;
use serde::Serialize;

/// One search hit: an indexed face and how similar it is to the probe,
/// as a percentage in [0, 100].
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MatchCandidate {
    pub face_id: String,
    pub similarity: f32,
}

/// One face added to the collection by an index call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFace {
    pub face_id: String,
    pub image_id: Option<String>,
}

/// The external face-recognition capability. The collection a client
/// operates on is fixed at construction; face ids are opaque strings owned
/// by the service.
#[async_trait]
pub trait FaceRecognizer: Send + Sync {
    /// Detects faces in the image and adds at most `max_faces` of them
    /// (the most prominent first) to the collection. Returns one record per
    /// face actually indexed; an empty list means no face was detected.
    async fn index_face(
        &self,
        image: &ImageReference,
        max_faces: i32,
    ) -> Result<Vec<IndexedFace>, AppError>;

    /// Detects the primary face in a fresh image and searches the
    /// collection for similar indexed faces, without indexing the probe.
    async fn search_by_image(
        &self,
        image: &ImageReference,
        threshold: f32,
        max_results: i32,
    ) -> Result<Vec<MatchCandidate>, AppError>;

    /// Searches the collection for faces similar to an already-indexed one.
    async fn search_by_face_id(
        &self,
        face_id: &str,
        threshold: f32,
        max_results: i32,
    ) -> Result<Vec<MatchCandidate>, AppError>;
}
