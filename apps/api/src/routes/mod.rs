pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/generate-job-description",
            post(handlers::handle_generate),
        )
        .route("/example", get(handlers::handle_example))
        .route("/designations", get(handlers::handle_designations))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::generation::generator::tests::{three_variants, StubInvoker};
    use crate::generation::handlers::JobDescriptionResponse;
    use crate::generation::normalizer::JsonExtraction;
    use crate::llm_client::LlmError;
    use crate::models::job_description::FALLBACK_DESCRIPTION;

    fn app(stub: Arc<StubInvoker>) -> Router {
        build_router(AppState::new(stub, JsonExtraction::Strict))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_envelope_with_three_records() {
        let stub = Arc::new(StubInvoker::replying(three_variants(5)));
        let request = post_json(
            "/generate-job-description",
            json!({
                "designation": "Software Engineer",
                "yoe": 5,
                "skills": ["Python", "Django", "React"],
                "extraInfo": ""
            }),
        );

        let response = app(stub).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: JobDescriptionResponse =
            serde_json::from_value(read_json(response).await).unwrap();
        assert!(body.success);
        assert_eq!(body.count, 3);
        assert_eq!(body.data.len(), 3);
        assert!(body.data.iter().all(|r| r.experience == 5));
        assert_eq!(
            body.message,
            "Successfully generated 3 job description variations"
        );
    }

    #[tokio::test]
    async fn test_empty_designation_rejected_before_model_call() {
        let stub = Arc::new(StubInvoker::replying(three_variants(5)));
        let request = post_json(
            "/generate-job-description",
            json!({"designation": "   ", "yoe": 5, "skills": ["Python"], "extraInfo": "Test"}),
        );

        let response = app(stub.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Designation cannot be empty"));
        assert_eq!(body["error"], json!("INVALID_REQUEST"));
        assert!(stub.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_yoe_rejected() {
        let stub = Arc::new(StubInvoker::replying(three_variants(5)));
        let request = post_json(
            "/generate-job-description",
            json!({"designation": "Data Engineer", "yoe": 51}),
        );

        let response = app(stub.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(stub.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mistyped_body_uses_error_envelope() {
        let stub = Arc::new(StubInvoker::replying(three_variants(5)));
        let request = post_json(
            "/generate-job-description",
            json!({"designation": "Data Engineer", "yoe": "five"}),
        );

        let response = app(stub.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = read_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("UNPROCESSABLE_ENTITY"));
        assert!(body["message"].as_str().unwrap().contains("yoe"));
        assert!(stub.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_designation_uses_error_envelope() {
        let stub = Arc::new(StubInvoker::replying(three_variants(5)));
        let request = post_json("/generate-job-description", json!({"yoe": 3}));

        let response = app(stub.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = read_json(response).await;
        assert_eq!(body["error"], json!("UNPROCESSABLE_ENTITY"));
        assert!(body["message"].as_str().unwrap().contains("designation"));
        assert!(stub.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_model_output_is_still_success() {
        let stub = Arc::new(StubInvoker::replying("not json at all"));
        let request = post_json(
            "/generate-job-description",
            json!({"designation": "Product Manager", "yoe": 4, "skills": ["", "Roadmaps"]}),
        );

        let response = app(stub).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["count"], json!(1));
        assert_eq!(
            body["data"][0],
            json!({
                "designation": "product manager",
                "experience": 4,
                "skills": ["Roadmaps"],
                "description": FALLBACK_DESCRIPTION,
                "responsibilities": [],
                "requirements": []
            })
        );
    }

    #[tokio::test]
    async fn test_model_unavailable_maps_to_503() {
        let stub = Arc::new(StubInvoker::failing(|| {
            LlmError::Unavailable("connection refused".to_string())
        }));
        let request = post_json(
            "/generate-job-description",
            json!({"designation": "QA Engineer", "yoe": 2}),
        );

        let response = app(stub).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = read_json(response).await;
        assert_eq!(body["error"], json!("MODEL_UNAVAILABLE"));
    }

    #[tokio::test]
    async fn test_model_timeout_maps_to_504() {
        let stub = Arc::new(StubInvoker::failing(|| {
            LlmError::Timeout(Duration::from_secs(120))
        }));
        let request = post_json(
            "/generate-job-description",
            json!({"designation": "QA Engineer", "yoe": 2}),
        );

        let response = app(stub).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_health_reports_model_status() {
        let stub = Arc::new(StubInvoker::replying("[]"));
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app(stub).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["status"], json!("healthy"));
        assert_eq!(body["model"], json!("stub-model"));
        assert_eq!(body["model_status"], json!("reachable"));
    }

    #[tokio::test]
    async fn test_health_reports_unreachable_model() {
        let stub = Arc::new(StubInvoker::failing(|| {
            LlmError::Unavailable("connection refused".to_string())
        }));
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app(stub).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["status"], json!("healthy"));
        assert_eq!(body["model_status"], json!("unreachable"));
        assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
    }

    #[tokio::test]
    async fn test_documentation_endpoints() {
        let stub = Arc::new(StubInvoker::replying("[]"));
        let router = app(stub);

        let example = router
            .clone()
            .oneshot(Request::builder().uri("/example").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(example.status(), StatusCode::OK);
        let example = read_json(example).await;
        assert_eq!(example["example_request"]["yoe"], json!(5));

        let designations = router
            .oneshot(Request::builder().uri("/designations").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let designations = read_json(designations).await;
        assert_eq!(
            designations["supported_designations"].as_array().unwrap().len(),
            18
        );
    }
}
