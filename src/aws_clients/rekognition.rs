use crate::config::AppConfig;
use crate::error::AppError;
use crate::event::ImageReference;
use crate::recognition::{FaceRecognizer, IndexedFace, MatchCandidate};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_rekognition::types::{Attribute, Image, S3Object};
use aws_sdk_rekognition::Client;

pub struct RekognitionRecognizer {
    client: Client,
    collection_id: String,
}

impl RekognitionRecognizer {
    pub fn new(sdk_config: &SdkConfig, config: &AppConfig) -> Self {
        log::debug!(
            "Creating Rekognition client for collection: {}",
            config.collection_id
        );
        Self {
            client: Client::new(sdk_config),
            collection_id: config.collection_id.clone(),
        }
    }

    fn s3_image(image: &ImageReference) -> Image {
        Image::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(&image.bucket)
                    .name(&image.key)
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl FaceRecognizer for RekognitionRecognizer {
    async fn index_face(
        &self,
        image: &ImageReference,
        max_faces: i32,
    ) -> Result<Vec<IndexedFace>, AppError> {
        log::debug!(
            "Indexing faces from {} into collection '{}'",
            image,
            self.collection_id
        );

        let output = self
            .client
            .index_faces()
            .collection_id(&self.collection_id)
            .image(Self::s3_image(image))
            .max_faces(max_faces)
            .external_image_id(&image.key)
            .detection_attributes(Attribute::All)
            .send()
            .await
            .map_err(|e| AppError::Recognition(e.into_service_error().to_string()))?;

        let mut faces = Vec::new();
        for record in output.face_records() {
            if let Some(face) = record.face() {
                if let Some(face_id) = face.face_id() {
                    log::trace!(
                        "Indexed face {} (image id {:?}) from {}",
                        face_id,
                        face.image_id(),
                        image
                    );
                    faces.push(IndexedFace {
                        face_id: face_id.to_string(),
                        image_id: face.image_id().map(str::to_string),
                    });
                }
            }
        }
        log::debug!("Indexed {} face(s) from {}", faces.len(), image);
        Ok(faces)
    }

    async fn search_by_image(
        &self,
        image: &ImageReference,
        threshold: f32,
        max_results: i32,
    ) -> Result<Vec<MatchCandidate>, AppError> {
        log::debug!(
            "Searching collection '{}' for faces matching the primary face in {}",
            self.collection_id,
            image
        );

        let output = self
            .client
            .search_faces_by_image()
            .collection_id(&self.collection_id)
            .image(Self::s3_image(image))
            .face_match_threshold(threshold)
            .max_faces(max_results)
            .send()
            .await
            .map_err(|e| AppError::Recognition(e.into_service_error().to_string()))?;

        let candidates = collect_candidates(output.face_matches());
        log::debug!("Search for {} returned {} candidate(s)", image, candidates.len());
        Ok(candidates)
    }

    async fn search_by_face_id(
        &self,
        face_id: &str,
        threshold: f32,
        max_results: i32,
    ) -> Result<Vec<MatchCandidate>, AppError> {
        log::debug!(
            "Searching collection '{}' for faces matching face id {}",
            self.collection_id,
            face_id
        );

        let output = self
            .client
            .search_faces()
            .collection_id(&self.collection_id)
            .face_id(face_id)
            .face_match_threshold(threshold)
            .max_faces(max_results)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_resource_not_found_exception() {
                    AppError::NotFound(format!(
                        "face {} is not in collection '{}'",
                        face_id, self.collection_id
                    ))
                } else {
                    AppError::Recognition(service_error.to_string())
                }
            })?;

        let candidates = collect_candidates(output.face_matches());
        log::debug!(
            "Search for face id {} returned {} candidate(s)",
            face_id,
            candidates.len()
        );
        Ok(candidates)
    }
}

fn collect_candidates(matches: &[aws_sdk_rekognition::types::FaceMatch]) -> Vec<MatchCandidate> {
    let mut candidates = Vec::new();
    for face_match in matches {
        if let Some(face_id) = face_match.face().and_then(|f| f.face_id()) {
            candidates.push(MatchCandidate {
                face_id: face_id.to_string(),
                similarity: face_match.similarity().unwrap_or(0.0),
            });
        }
    }
    candidates
}
