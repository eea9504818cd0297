use crate::config::AppConfig;
use crate::error::AppError;
use crate::event::ImageReference;
use crate::recognition::{FaceRecognizer, MatchCandidate};
use crate::storage::ObjectStore;
use std::sync::Arc;

/// Thresholds and limits the workflow applies around the recognition calls.
///
/// `match_acceptance` is the floor a candidate must clear to appear in a
/// search result at all; `match_certainty` is the stricter bar this
/// workflow applies before trusting a candidate as identity proof.
#[derive(Debug, Clone)]
pub struct ResolutionSettings {
    pub match_acceptance: f32,
    pub match_certainty: f32,
    pub max_search_results: i32,
    pub max_faces_per_index: i32,
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self {
            match_acceptance: 70.0,
            match_certainty: 99.0,
            max_search_results: 2,
            max_faces_per_index: 1,
        }
    }
}

impl From<&AppConfig> for ResolutionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            match_acceptance: config.match_acceptance,
            match_certainty: config.match_certainty,
            max_search_results: config.max_search_results,
            max_faces_per_index: config.max_faces_per_index,
        }
    }
}

/// Terminal outcome of resolving one uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched(String),
    Registered(String),
    NoFaceDetected,
}

impl Resolution {
    pub fn face_id(&self) -> Option<&str> {
        match self {
            Resolution::Matched(face_id) | Resolution::Registered(face_id) => Some(face_id),
            Resolution::NoFaceDetected => None,
        }
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::Matched(_) => "matched",
            Resolution::Registered(_) => "registered",
            Resolution::NoFaceDetected => "no_face",
        }
    }
}

pub struct FaceResolutionWorkflow {
    recognizer: Arc<dyn FaceRecognizer>,
    store: Arc<dyn ObjectStore>,
    settings: ResolutionSettings,
}

impl FaceResolutionWorkflow {
    pub fn new(
        recognizer: Arc<dyn FaceRecognizer>,
        store: Arc<dyn ObjectStore>,
        settings: ResolutionSettings,
    ) -> Self {
        Self {
            recognizer,
            store,
            settings,
        }
    }

    /// Searches the collection for the primary face in `image` and returns
    /// the id of a candidate that clears the certainty bar, or `None`.
    ///
    /// A candidate can clear the search threshold without being accepted
    /// here; a 85%-similar face is a plausible sibling, not the same person.
    pub async fn find_match(&self, image: &ImageReference) -> Result<Option<String>, AppError> {
        log::info!("Searching for faces matching {}", image);

        let candidates = self
            .recognizer
            .search_by_image(
                image,
                self.settings.match_acceptance,
                self.settings.max_search_results,
            )
            .await?;

        if candidates.is_empty() {
            log::info!(
                "No candidates above {}% similarity for {}",
                self.settings.match_acceptance,
                image
            );
            return Ok(None);
        }

        // When several candidates clear the certainty bar the last one
        // wins; see the open questions in DESIGN.md before changing this.
        let mut face_id = None;
        for candidate in &candidates {
            log::debug!(
                "Candidate face {} at {:.1}% similarity for {}",
                candidate.face_id,
                candidate.similarity,
                image
            );
            if candidate.similarity >= self.settings.match_certainty {
                face_id = Some(candidate.face_id.clone());
            }
        }

        if face_id.is_none() {
            log::info!(
                "{} candidate(s) for {} but none reached {}% certainty",
                candidates.len(),
                image,
                self.settings.match_certainty
            );
        }
        Ok(face_id)
    }

    /// Adds the primary face in `image` to the collection. Returns `None`
    /// when the service detected no face, in which case nothing was indexed.
    pub async fn register(&self, image: &ImageReference) -> Result<Option<String>, AppError> {
        log::info!("Registering primary face from {}", image);

        let records = self
            .recognizer
            .index_face(image, self.settings.max_faces_per_index)
            .await?;

        if records.is_empty() {
            log::info!("No face detected in {}", image);
            return Ok(None);
        }

        // Last record wins, as in find_match. With max_faces_per_index = 1
        // there is normally only one.
        let mut face_id = None;
        for record in &records {
            log::debug!(
                "Indexed face {} (image id {:?}) from {}",
                record.face_id,
                record.image_id,
                image
            );
            face_id = Some(record.face_id.clone());
        }
        Ok(face_id)
    }

    /// The composed workflow: confirm the object exists, try to match it
    /// against the collection, and fall back to registering it. Any service
    /// error aborts immediately and propagates unmodified.
    pub async fn resolve(&self, image: &ImageReference) -> Result<Resolution, AppError> {
        let metadata = self.store.head_object(image).await.map_err(|e| {
            log::error!("Failed to read object metadata for {}: {}", image, e);
            e
        })?;
        log::debug!(
            "Object {} present (content type {:?})",
            image,
            metadata.content_type
        );

        let matched = self.find_match(image).await.map_err(|e| {
            log::error!("Face search failed for {}: {}", image, e);
            e
        })?;

        if let Some(face_id) = matched {
            log::info!("Matched {} to known face {}", image, face_id);
            return Ok(Resolution::Matched(face_id));
        }

        let registered = self.register(image).await.map_err(|e| {
            log::error!("Face registration failed for {}: {}", image, e);
            e
        })?;

        match registered {
            Some(face_id) => {
                log::info!("Registered new face {} from {}", face_id, image);
                Ok(Resolution::Registered(face_id))
            }
            None => {
                log::info!("Nothing to resolve for {}: no detectable face", image);
                Ok(Resolution::NoFaceDetected)
            }
        }
    }

    /// Diagnostic listing of collection faces similar to an already-indexed
    /// face.
    pub async fn similar_faces(&self, face_id: &str) -> Result<Vec<MatchCandidate>, AppError> {
        log::debug!("Listing collection matches for face {}", face_id);
        self.recognizer
            .search_by_face_id(
                face_id,
                self.settings.match_acceptance,
                self.settings.max_search_results,
            )
            .await
    }
}
