//! HTTP surface for the PDF question-answering gateway.
//!
//! Two routers share the same handler pipeline:
//!
//! - Folder-scoped: `POST /query` with `{ "query", "folder_path" }` ingests every `*.pdf` in the
//!   folder before answering.
//! - Fixed corpus: `POST /query` with `{ "query" }` answers against documents loaded at startup.
//!
//! Both expose `GET /metrics`. Successful queries return `{ "query", "response" }`; every
//! failure returns `{ "detail": "An error occurred: <message>" }` with a status derived from the
//! failure kind.

use crate::capability::CapabilityError;
use crate::qa::{QaApi, QaError, QueryOutcome};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Build the router for the folder-scoped variant.
pub fn create_folder_router<S>(service: Arc<S>) -> Router
where
    S: QaApi + 'static,
{
    Router::new()
        .route("/query", post(query_folder::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Build the router for the fixed-corpus variant.
pub fn create_fixed_router<S>(service: Arc<S>) -> Router
where
    S: QaApi + 'static,
{
    Router::new()
        .route("/query", post(query_fixed::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Request body for the folder-scoped `POST /query`.
#[derive(Deserialize)]
struct FolderQueryRequest {
    /// Natural-language question.
    query: String,
    /// Folder scanned for PDF files before answering. Not checked for existence.
    folder_path: String,
}

/// Request body for the fixed-corpus `POST /query`.
#[derive(Deserialize)]
struct QueryRequest {
    /// Natural-language question.
    query: String,
}

/// Success response for both `POST /query` variants.
#[derive(Serialize)]
struct QueryResponse {
    query: String,
    response: String,
}

impl From<QueryOutcome> for QueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        Self {
            query: outcome.query,
            response: outcome.response,
        }
    }
}

/// Error envelope shared by every failure.
#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// Ingest the requested folder, then answer the question against the store.
async fn query_folder<S>(
    State(service): State<Arc<S>>,
    payload: Result<Json<FolderQueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, AppError>
where
    S: QaApi,
{
    let Json(request) = payload.inspect_err(|_| service.record_rejected())?;
    tracing::info!(folder = %request.folder_path, "Folder query received");
    let outcome = service
        .answer(request.query, Some(Path::new(&request.folder_path)))
        .await?;
    Ok(Json(outcome.into()))
}

/// Answer the question against the corpus loaded at startup.
async fn query_fixed<S>(
    State(service): State<Arc<S>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, AppError>
where
    S: QaApi,
{
    let Json(request) = payload.inspect_err(|_| service.record_rejected())?;
    tracing::info!("Fixed-corpus query received");
    let outcome = service.answer(request.query, None).await?;
    Ok(Json(outcome.into()))
}

/// Return query and ingestion counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> impl IntoResponse
where
    S: QaApi,
{
    Json(service.metrics_snapshot())
}

enum AppError {
    Rejected(JsonRejection),
    Qa(QaError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Rejected(rejection) => rejection.status(),
            Self::Qa(QaError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Qa(QaError::Ingestion(_)) => StatusCode::BAD_GATEWAY,
            Self::Qa(QaError::Capability(CapabilityError::Internal(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Qa(QaError::Capability(_)) => StatusCode::BAD_GATEWAY,
            Self::Qa(QaError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Rejected(rejection) => rejection.body_text(),
            Self::Qa(error) => error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = format!("An error occurred: {}", self.message());
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), %detail, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), %detail, "Request rejected");
        }
        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<QaError> for AppError {
    fn from(inner: QaError) -> Self {
        Self::Qa(inner)
    }
}

impl From<JsonRejection> for AppError {
    fn from(inner: JsonRejection) -> Self {
        Self::Rejected(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{create_fixed_router, create_folder_router};
    use crate::capability::CapabilityError;
    use crate::corpus::{ConversionError, IngestionError};
    use crate::metrics::MetricsSnapshot;
    use crate::qa::{NO_ANSWER, QaApi, QaError, QueryOutcome};
    use async_trait::async_trait;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Clone, Debug)]
    struct AnswerCall {
        query: String,
        folder: Option<PathBuf>,
    }

    enum Reply {
        Answer(Option<&'static str>),
        Fail(fn() -> QaError),
    }

    struct StubQaService {
        calls: Mutex<Vec<AnswerCall>>,
        rejected: AtomicUsize,
        reply: Reply,
    }

    impl StubQaService {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                rejected: AtomicUsize::new(0),
                reply,
            })
        }

        async fn recorded_calls(&self) -> Vec<AnswerCall> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl QaApi for StubQaService {
        async fn answer(
            &self,
            query: String,
            folder: Option<&Path>,
        ) -> Result<QueryOutcome, QaError> {
            self.calls.lock().await.push(AnswerCall {
                query: query.clone(),
                folder: folder.map(Path::to_path_buf),
            });
            match &self.reply {
                Reply::Answer(text) => Ok(QueryOutcome {
                    query,
                    response: text.unwrap_or(NO_ANSWER).to_string(),
                    answered: text.is_some(),
                    candidates: usize::from(text.is_some()),
                }),
                Reply::Fail(make) => Err(make()),
            }
        }

        fn record_rejected(&self) {
            self.rejected.fetch_add(1, Ordering::SeqCst);
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                queries_answered: 3,
                queries_unanswered: 1,
                queries_failed: 0,
                documents_ingested: 7,
                corpus_documents: 7,
            }
        }
    }

    async fn post_json(app: Router, body: String) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/query")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&bytes).expect("json body");
        (status, json)
    }

    #[tokio::test]
    async fn fixed_route_returns_top_answer() {
        let service = StubQaService::new(Reply::Answer(Some("Jane Doe graduated in 2015")));
        let app = create_fixed_router(service.clone());

        let (status, body) = post_json(
            app,
            json!({ "query": "Who graduated in 2015?" }).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "query": "Who graduated in 2015?", "response": "Jane Doe graduated in 2015" })
        );
        let calls = service.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        assert!(calls[0].folder.is_none());
    }

    #[tokio::test]
    async fn folder_route_forwards_folder_path() {
        let service = StubQaService::new(Reply::Answer(None));
        let app = create_folder_router(service.clone());

        let (status, body) = post_json(
            app,
            json!({ "query": "anything", "folder_path": "/srv/pdfs" }).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], NO_ANSWER);
        let calls = service.recorded_calls().await;
        assert_eq!(calls[0].query, "anything");
        assert_eq!(calls[0].folder.as_deref(), Some(Path::new("/srv/pdfs")));
    }

    #[tokio::test]
    async fn missing_query_is_rejected_before_service() {
        let service = StubQaService::new(Reply::Answer(Some("unused")));
        let app = create_folder_router(service.clone());

        let (status, body) =
            post_json(app, json!({ "folder_path": "/srv/pdfs" }).to_string()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body["detail"].as_str().expect("detail string");
        assert!(detail.starts_with("An error occurred: "));
        assert!(service.recorded_calls().await.is_empty());
        assert_eq!(service.rejected.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_string_query_is_rejected() {
        let service = StubQaService::new(Reply::Answer(Some("unused")));
        let app = create_fixed_router(service.clone());

        let (status, _) = post_json(app, json!({ "query": 42 }).to_string()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(service.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let service = StubQaService::new(Reply::Answer(Some("unused")));
        let app = create_fixed_router(service.clone());

        let (status, body) = post_json(app, "{ not json".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
        assert_eq!(service.rejected.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn accepted_requests_are_not_counted_as_rejected() {
        let service = StubQaService::new(Reply::Answer(Some("answer")));
        let app = create_fixed_router(service.clone());

        let (status, _) = post_json(app, json!({ "query": "q" }).to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(service.rejected.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn error_kinds_map_to_distinct_statuses() {
        let cases: [(fn() -> QaError, StatusCode); 5] = [
            (
                || QaError::Validation("query must not be empty".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                || QaError::Capability(CapabilityError::Internal("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                || QaError::Capability(CapabilityError::Unavailable("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                || {
                    QaError::Ingestion(IngestionError::Conversion {
                        path: PathBuf::from("bad.pdf"),
                        source: ConversionError::Extraction("corrupt".into()),
                    })
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                || QaError::Timeout(Duration::from_secs(30)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];

        for (make, expected) in cases {
            let app = create_fixed_router(StubQaService::new(Reply::Fail(make)));
            let (status, body) = post_json(app, json!({ "query": "q" }).to_string()).await;
            assert_eq!(status, expected);
            assert_eq!(
                body["detail"],
                format!("An error occurred: {}", make()).as_str()
            );
        }
    }

    #[tokio::test]
    async fn capability_exception_keeps_message() {
        let app = create_fixed_router(StubQaService::new(Reply::Fail(|| {
            QaError::Capability(CapabilityError::Internal("boom".into()))
        })));

        let (status, body) = post_json(app, json!({ "query": "q" }).to_string()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "detail": "An error occurred: boom" }));
    }

    #[tokio::test]
    async fn metrics_route_reports_snapshot() {
        let app = create_fixed_router(StubQaService::new(Reply::Answer(None)));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(json["queries_answered"], 3);
        assert_eq!(json["corpus_documents"], 7);
    }
}
