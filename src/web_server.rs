use crate::error::AppError;
use crate::event::UploadNotification;
use crate::resolver::FaceResolutionWorkflow;
use actix_web::{web, App, HttpResponse, HttpServer};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize, Debug)]
struct ResolutionOutcome {
    bucket: String,
    key: String,
    face_id: Option<String>,
    outcome: &'static str,
}

async fn post_event(
    workflow: web::Data<Arc<FaceResolutionWorkflow>>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    // A notification that cannot be read is treated the same as one with no
    // usable records: nothing to do, empty result.
    let notification: UploadNotification = match serde_json::from_slice(&body) {
        Ok(notification) => notification,
        Err(e) => {
            log::warn!("Ignoring malformed upload notification: {}", e);
            UploadNotification::default()
        }
    };

    let references = notification.image_references();
    if references.is_empty() {
        log::warn!("Upload notification carried no usable records");
        return Ok(HttpResponse::Ok().json(Vec::<ResolutionOutcome>::new()));
    }

    log::debug!("Received notification with {} record(s)", references.len());

    let mut outcomes = Vec::with_capacity(references.len());
    for image in references {
        let resolution = workflow.resolve(&image).await?;
        outcomes.push(ResolutionOutcome {
            face_id: resolution.face_id().map(str::to_string),
            outcome: resolution.outcome(),
            bucket: image.bucket,
            key: image.key,
        });
    }

    Ok(HttpResponse::Ok().json(outcomes))
}

async fn get_face_matches(
    path: web::Path<String>,
    workflow: web::Data<Arc<FaceResolutionWorkflow>>,
) -> Result<HttpResponse, AppError> {
    let face_id = path.into_inner();
    log::debug!("Received request for faces matching face id: {}", face_id);

    let candidates = workflow.similar_faces(&face_id).await?;
    Ok(HttpResponse::Ok().json(candidates))
}

pub async fn start_web_server(
    port: u16,
    workflow: Arc<FaceResolutionWorkflow>,
) -> std::io::Result<()> {
    let workflow_data = web::Data::new(workflow);

    log::info!("Starting web server on port: {}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(workflow_data.clone())
            .service(web::resource("/api/events").route(web::post().to(post_event)))
            .service(
                web::resource("/api/faces/{face_id}/matches").route(web::get().to(get_face_matches)),
            )
    })
    .bind(format!("0.0.0.0:{}", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::event::ImageReference;
    use crate::recognition::{FaceRecognizer, IndexedFace, MatchCandidate};
    use crate::resolver::ResolutionSettings;
    use crate::storage::{ObjectMetadata, ObjectStore};
    use actix_web::{http::StatusCode, test};
    use async_trait::async_trait;

    /// Fixed-response doubles; enough to drive the handlers end to end.
    struct FixedRecognizer {
        search: Result<Vec<MatchCandidate>, AppError>,
        index: Result<Vec<IndexedFace>, AppError>,
    }

    #[async_trait]
    impl FaceRecognizer for FixedRecognizer {
        async fn index_face(
            &self,
            _image: &ImageReference,
            _max_faces: i32,
        ) -> Result<Vec<IndexedFace>, AppError> {
            clone_result(&self.index)
        }

        async fn search_by_image(
            &self,
            _image: &ImageReference,
            _threshold: f32,
            _max_results: i32,
        ) -> Result<Vec<MatchCandidate>, AppError> {
            clone_result(&self.search)
        }

        async fn search_by_face_id(
            &self,
            face_id: &str,
            _threshold: f32,
            _max_results: i32,
        ) -> Result<Vec<MatchCandidate>, AppError> {
            if face_id == "known" {
                Ok(vec![MatchCandidate {
                    face_id: "F2".to_string(),
                    similarity: 99.3,
                }])
            } else {
                Err(AppError::NotFound(format!("face {} not indexed", face_id)))
            }
        }
    }

    fn clone_result<T: Clone>(result: &Result<T, AppError>) -> Result<T, AppError> {
        match result {
            Ok(value) => Ok(value.clone()),
            Err(AppError::Recognition(message)) => Err(AppError::Recognition(message.clone())),
            Err(_) => Err(AppError::Recognition("unexpected".to_string())),
        }
    }

    struct AlwaysPresentStore;

    #[async_trait]
    impl ObjectStore for AlwaysPresentStore {
        async fn head_object(&self, _image: &ImageReference) -> Result<ObjectMetadata, AppError> {
            Ok(ObjectMetadata::default())
        }
    }

    fn test_workflow(recognizer: FixedRecognizer) -> web::Data<Arc<FaceResolutionWorkflow>> {
        web::Data::new(Arc::new(FaceResolutionWorkflow::new(
            Arc::new(recognizer),
            Arc::new(AlwaysPresentStore),
            ResolutionSettings::default(),
        )))
    }

    fn notification_body() -> serde_json::Value {
        serde_json::json!({
            "Records": [{
                "s3": {
                    "bucket": { "name": "guest-uploads" },
                    "object": { "key": "visitor.jpg" }
                }
            }]
        })
    }

    #[actix_web::test]
    async fn event_with_a_match_reports_the_face_id() {
        let app = test::init_service(
            App::new()
                .app_data(test_workflow(FixedRecognizer {
                    search: Ok(vec![MatchCandidate {
                        face_id: "F1".to_string(),
                        similarity: 99.8,
                    }]),
                    index: Ok(vec![]),
                }))
                .service(web::resource("/api/events").route(web::post().to(post_event))),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/api/events")
            .set_json(notification_body())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body[0]["outcome"], "matched");
        assert_eq!(body[0]["face_id"], "F1");
        assert_eq!(body[0]["bucket"], "guest-uploads");
        assert_eq!(body[0]["key"], "visitor.jpg");
    }

    #[actix_web::test]
    async fn event_without_a_match_registers_the_face() {
        let app = test::init_service(
            App::new()
                .app_data(test_workflow(FixedRecognizer {
                    search: Ok(vec![]),
                    index: Ok(vec![IndexedFace {
                        face_id: "F7".to_string(),
                        image_id: None,
                    }]),
                }))
                .service(web::resource("/api/events").route(web::post().to(post_event))),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/api/events")
            .set_json(notification_body())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body[0]["outcome"], "registered");
        assert_eq!(body[0]["face_id"], "F7");
    }

    #[actix_web::test]
    async fn malformed_notification_is_a_no_op() {
        let app = test::init_service(
            App::new()
                .app_data(test_workflow(FixedRecognizer {
                    search: Ok(vec![]),
                    index: Ok(vec![]),
                }))
                .service(web::resource("/api/events").route(web::post().to(post_event))),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/api/events")
            .set_payload("this is not json")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body, serde_json::json!([]));
    }

    #[actix_web::test]
    async fn recognition_failure_maps_to_bad_gateway() {
        let app = test::init_service(
            App::new()
                .app_data(test_workflow(FixedRecognizer {
                    search: Err(AppError::Recognition("throttled".to_string())),
                    index: Ok(vec![]),
                }))
                .service(web::resource("/api/events").route(web::post().to(post_event))),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/api/events")
            .set_json(notification_body())
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn face_matches_endpoint_lists_candidates() {
        let app = test::init_service(
            App::new()
                .app_data(test_workflow(FixedRecognizer {
                    search: Ok(vec![]),
                    index: Ok(vec![]),
                }))
                .service(
                    web::resource("/api/faces/{face_id}/matches")
                        .route(web::get().to(get_face_matches)),
                ),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/api/faces/known/matches")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body[0]["face_id"], "F2");

        let request = test::TestRequest::get()
            .uri("/api/faces/unknown/matches")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
