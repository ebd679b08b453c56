//! HTTP request handlers for the MoneySaver service.
//!
//! Implements transaction recording, action classification, user management
//! and health check endpoints using axum.

use crate::service::{MoneySaverService, ServiceError};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use moneysaver_domain::{AssistantActionView, TransactionView, User};
use moneysaver_extractor::ExtractorError;
use moneysaver_llm::Provider;
use moneysaver_store::SqliteStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// The service as wired by the server
pub type AppService = MoneySaverService<Provider, SqliteStore>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Orchestration over extractor and store
    pub service: Arc<AppService>,
}

/// POST /ask_transaction_text body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskTransactionRequest {
    /// Free-text description of the transaction
    pub prompt: String,
    /// Owner of the new transaction
    pub user_name: String,
}

/// POST /classify_action body
#[derive(Debug, Deserialize)]
pub struct ClassifyActionRequest {
    /// Free-text request to classify
    pub prompt: String,
}

/// POST /users body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Unique user name
    pub user_name: String,
    /// Unique email
    pub email: String,
}

/// A user as returned over HTTP
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Database identifier
    pub id: i64,
    /// User name
    pub user_name: String,
    /// Email
    pub email: String,
    /// Access role
    pub role: String,
    /// Registration platform
    pub platform: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.0,
            user_name: user.user_name,
            email: user.email,
            role: user.role.as_str().to_string(),
            platform: user.platform.as_str().to_string(),
        }
    }
}

/// GET /ping response
#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    /// Always "pong"
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Machine-readable error class
    pub kind: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The body could not be read as the expected JSON
    BadRequest(String),
    /// Error from the service layer
    Service(ServiceError),
}

impl AppError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::Service(e) => match e {
                ServiceError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
                ServiceError::UnknownUser(_) => (StatusCode::NOT_FOUND, "unknown_user"),
                ServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
                ServiceError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
                ServiceError::Extraction(ExtractorError::Cancelled) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
                ServiceError::Extraction(ExtractorError::BudgetExhausted { .. }) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "extraction_failed")
                }
                ServiceError::Extraction(_) | ServiceError::Domain(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal")
                }
                ServiceError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence"),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = match self {
            AppError::BadRequest(msg) => msg,
            AppError::Service(e) => e.to_string(),
        };

        if status.is_server_error() {
            error!("{} ({}): {}", status, kind, message);
        }

        let body = Json(ErrorResponse {
            error: message,
            kind: kind.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        AppError::Service(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// POST /ask_transaction_text - Record a transaction from free text
///
/// Returns the stored transaction's view, id included.
async fn ask_transaction_text(
    State(state): State<AppState>,
    payload: Result<Json<AskTransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionView>, AppError> {
    let Json(request) = payload?;
    let recorded = state
        .service
        .add_transaction(&request.user_name, &request.prompt)
        .await?;
    Ok(Json(recorded.transaction.view()))
}

/// POST /classify_action - Classify what a free-text request asks for
async fn classify_action(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyActionRequest>, JsonRejection>,
) -> Result<Json<AssistantActionView>, AppError> {
    let Json(request) = payload?;
    let action = state.service.classify_action(&request.prompt).await?;
    Ok(Json(AssistantActionView {
        action_type: action.as_str().to_string(),
    }))
}

/// POST /users - Register a user
async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let Json(request) = payload?;
    let user = state.service.create_user(&request.user_name, &request.email)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/:user_name/transactions - List a user's transactions
async fn list_transactions(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<Json<Vec<TransactionView>>, AppError> {
    let transactions = state.service.list_transactions(&user_name)?;
    Ok(Json(transactions.iter().map(|t| t.view()).collect()))
}

/// GET /ping - Liveness check
async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong".to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/ask_transaction_text", post(ask_transaction_text))
        .route("/classify_action", post(classify_action))
        .route("/users", post(create_user))
        .route("/users/:user_name/transactions", get(list_transactions))
        .route("/ping", get(ping))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use moneysaver_extractor::{Extractor, ExtractorConfig};
    use moneysaver_llm::MockProvider;
    use tower::ServiceExt; // for oneshot

    fn create_test_state() -> AppState {
        let provider = Provider::Mock(MockProvider::new(r#"{"action_type":"Unclear"}"#));
        let store = SqliteStore::new(":memory:").unwrap();
        let extractor = Extractor::new(provider, ExtractorConfig::default());

        AppState {
            service: Arc::new(MoneySaverService::new(extractor, store)),
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let app = create_router(create_test_state());

        let request = Request::builder().uri("/ping").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_classify_action() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/classify_action")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"prompt": "hello there"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (AppError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::UnknownUser("x".into()).into(), StatusCode::NOT_FOUND),
            (ServiceError::Extraction(ExtractorError::Cancelled).into(), StatusCode::GATEWAY_TIMEOUT),
            (
                ServiceError::Extraction(ExtractorError::BudgetExhausted {
                    attempts: 5,
                    last_error: "x".into(),
                })
                .into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ServiceError::Store("disk".into()).into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            let error: AppError = error;
            assert_eq!(error.status_and_kind().0, expected);
        }
    }
}
