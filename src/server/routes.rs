//! REST endpoints: the form webhook plus diagnostic routes.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::board::{BoardApi, ColumnValues, CreatedItem, map_submission};
use crate::error::{Error, ValidationError};
use crate::forms::{FieldValue, Submission, submission_from_form_response};

/// Shared state for the relay routes. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub board: Arc<dyn BoardApi>,
}

impl AppState {
    pub fn new(board: Arc<dyn BoardApi>) -> Self {
        Self { board }
    }
}

/// Build the relay router.
pub fn relay_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/test-remote", get(test_remote))
        .route("/form-webhook", post(form_webhook))
        .route("/test-board", post(test_board))
        .route("/create-task", post(create_task))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Responses ───────────────────────────────────────────────────────────

/// The submission as extracted, plus the columns sent to the board.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    #[serde(flatten)]
    pub submission: Submission,
    pub column_values: ColumnValues,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub monday_item: CreatedItem,
    pub form_data: FormData,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::Validation(e) => {
                warn!(error = %e, "Rejected submission");
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "success": false, "message": e.to_string() }),
                )
            }
            Error::Board(e) => {
                error!(error = %e, "Board request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "success": false,
                        "message": "Failed to process form submission",
                        "error": e.to_string(),
                    }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Map a validated submission, create the board item, and build the reply.
async fn forward(
    board: &dyn BoardApi,
    submission: Submission,
    message: &'static str,
) -> Result<Json<ItemCreatedResponse>, Error> {
    let column_values = map_submission(&submission);
    debug!(columns = column_values.len(), "Mapped submission to board columns");

    let item = board
        .create_item(&submission.task_name, &column_values)
        .await?;

    Ok(Json(ItemCreatedResponse {
        success: true,
        message,
        monday_item: item,
        form_data: FormData {
            submission,
            column_values,
        },
    }))
}

// ── Webhook ─────────────────────────────────────────────────────────────

/// POST /form-webhook
///
/// Body: `{ "formResponse": { "answers": { ... } } }`. One board item per
/// request; 400 without an outbound call when the body is unusable.
async fn form_webhook(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ItemCreatedResponse>, Error> {
    let span = info_span!("form_webhook", request_id = %Uuid::new_v4());
    handle_webhook(state, body).instrument(span).await
}

async fn handle_webhook(
    state: AppState,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ItemCreatedResponse>, Error> {
    let Json(body) = body.map_err(|e| ValidationError::MalformedBody(e.body_text()))?;
    info!("Received form webhook");
    debug!(payload = %body, "Webhook payload");

    let form_response = body
        .get("formResponse")
        .filter(|v| !v.is_null())
        .ok_or(ValidationError::MissingFormResponse)?;

    let submission = submission_from_form_response(form_response);
    submission.ensure_task_name()?;

    forward(
        state.board.as_ref(),
        submission,
        "Form submission processed successfully",
    )
    .await
}

/// POST /create-task
///
/// Body is a flat submission (`taskName`, `email`, ...).
async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<Submission>, JsonRejection>,
) -> Result<Json<ItemCreatedResponse>, Error> {
    let Json(submission) = body.map_err(|e| ValidationError::MalformedBody(e.body_text()))?;
    if submission.task_name.trim().is_empty() {
        return Err(ValidationError::TaskNameRequired.into());
    }
    forward(state.board.as_ref(), submission, "Event created successfully!").await
}

// ── Diagnostics ─────────────────────────────────────────────────────────

async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "Form submission to board relay",
        "status": "Running",
        "endpoints": {
            "webhook": "POST /form-webhook",
            "health": "GET /health",
            "test": "GET /test-remote",
            "testBoard": "POST /test-board",
            "createTask": "POST /create-task"
        }
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// GET /test-remote
///
/// Checks the board connection by listing its columns. Always 200 with
/// `success: true`; `columns` is `null` when the listing failed.
async fn test_remote(State(state): State<AppState>) -> impl IntoResponse {
    let columns = state.board.list_columns().await;
    if columns.is_none() {
        warn!("Board column listing returned nothing");
    }
    Json(json!({
        "success": true,
        "message": "Board connection successful",
        "boardId": state.board.board_id().to_string(),
        "columns": columns,
    }))
}

/// Fixed submission used by `/test-board` to exercise every column.
pub fn sample_submission(task_name: String) -> Submission {
    Submission {
        event_name: task_name.clone(),
        task_name,
        email: "test@example.com".to_string(),
        event_address: "123 Test Street, City".to_string(),
        event_timing: "January 15, 2024 at 2:00 PM".to_string(),
        event_type: "Conference".to_string(),
        organization: "Tech Corp".to_string(),
        days_to_attend: FieldValue::List(vec![
            "Day 1".to_string(),
            "Day 2".to_string(),
            "Day 3".to_string(),
        ]),
        dietary_restrictions: "Vegetarian".to_string(),
        acknowledgement: FieldValue::Flag(true),
    }
}

/// POST /test-board
async fn test_board(State(state): State<AppState>) -> Result<Json<ItemCreatedResponse>, Error> {
    let name = format!("Test Event - {}", Utc::now().format("%H:%M:%S"));
    forward(
        state.board.as_ref(),
        sample_submission(name),
        "Test item created on your board",
    )
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::board::BoardColumn;
    use crate::error::BoardError;

    /// Board stub that records every create call.
    #[derive(Default)]
    struct RecordingBoard {
        calls: Mutex<Vec<(String, ColumnValues)>>,
        fail_with: Option<String>,
        columns: Option<Vec<BoardColumn>>,
    }

    impl RecordingBoard {
        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<(String, ColumnValues)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BoardApi for RecordingBoard {
        fn board_id(&self) -> u64 {
            777
        }

        async fn create_item(
            &self,
            name: &str,
            columns: &ColumnValues,
        ) -> Result<CreatedItem, BoardError> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), columns.clone()));
            match &self.fail_with {
                Some(message) => Err(BoardError::Api(message.clone())),
                None => Ok(CreatedItem {
                    id: "1001".to_string(),
                    name: name.to_string(),
                }),
            }
        }

        async fn list_columns(&self) -> Option<Vec<BoardColumn>> {
            self.columns.clone()
        }
    }

    fn app(board: Arc<RecordingBoard>) -> Router {
        relay_routes(AppState::new(board))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(json) => request.body(Body::from(json.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn webhook_body() -> Value {
        json!({
            "formResponse": {
                "responseId": "resp-1",
                "answers": {
                    "event_name": {"textAnswers": {"answers": [{"value": "Rust Meetup"}]}},
                    "email": {"email": "ada@example.com"},
                    "what_days_will_you_attend": {"choiceQuestions": {"answers": [
                        {"value": "Mon"}, {"value": "Tue"}
                    ]}},
                    "i_understand_that_i_will_have_to_pay_10_upon_arrival": {
                        "choiceQuestions": {"answers": [{"value": "Yes"}]}
                    }
                }
            }
        })
    }

    #[tokio::test]
    async fn webhook_creates_exactly_one_item() {
        let board = Arc::new(RecordingBoard::default());
        let (status, json) = send(app(board.clone()), "POST", "/form-webhook", Some(webhook_body())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["mondayItem"]["id"], "1001");
        assert_eq!(json["mondayItem"]["name"], "Rust Meetup");
        assert_eq!(json["formData"]["taskName"], "Rust Meetup");
        assert_eq!(json["formData"]["email"], "ada@example.com");
        assert_eq!(json["formData"]["columnValues"]["status"]["label"], "New");

        let calls = board.calls();
        assert_eq!(calls.len(), 1);
        let (name, columns) = &calls[0];
        assert_eq!(name, "Rust Meetup");
        assert!(columns.contains("status"));
        assert_eq!(
            columns.get("dropdown_days"),
            Some(&json!({"labels": ["Mon", "Tue"]}))
        );
        assert_eq!(columns.get("boolean_col"), Some(&json!({"checked": "true"})));
    }

    #[tokio::test]
    async fn webhook_other_acknowledgement_choice_is_unchecked() {
        let board = Arc::new(RecordingBoard::default());
        let mut body = webhook_body();
        body["formResponse"]["answers"]["i_understand_that_i_will_have_to_pay_10_upon_arrival"] =
            json!({"choiceQuestions": {"answers": [{"value": "I understand"}]}});
        let (status, _) = send(app(board.clone()), "POST", "/form-webhook", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        let calls = board.calls();
        assert_eq!(calls[0].1.get("boolean_col"), Some(&json!({})));
    }

    #[tokio::test]
    async fn missing_form_response_is_400_without_outbound_call() {
        let board = Arc::new(RecordingBoard::default());
        let (status, json) =
            send(app(board.clone()), "POST", "/form-webhook", Some(json!({"other": 1}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Invalid webhook data: missing formResponse");
        assert!(board.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_task_name_is_400_without_outbound_call() {
        let board = Arc::new(RecordingBoard::default());
        let body = json!({
            "formResponse": {"answers": {"email": {"email": "ada@example.com"}}}
        });
        let (status, json) = send(app(board.clone()), "POST", "/form-webhook", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "No task name found in form submission");
        assert!(board.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let board = Arc::new(RecordingBoard::default());
        let request = Request::builder()
            .method("POST")
            .uri("/form-webhook")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(board.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(board.calls().is_empty());
    }

    #[tokio::test]
    async fn downstream_error_is_500_with_upstream_message() {
        let board = Arc::new(RecordingBoard::failing("X"));
        let (status, json) = send(app(board.clone()), "POST", "/form-webhook", Some(webhook_body())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "X");

        // The mapped document is the same one a healthy board would receive.
        let healthy = Arc::new(RecordingBoard::default());
        send(app(healthy.clone()), "POST", "/form-webhook", Some(webhook_body())).await;
        assert_eq!(board.calls(), healthy.calls());
    }

    #[tokio::test]
    async fn create_task_requires_task_name() {
        let board = Arc::new(RecordingBoard::default());
        let (status, json) = send(
            app(board.clone()),
            "POST",
            "/create-task",
            Some(json!({"email": "a@b.c"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Task name is required");
        assert!(board.calls().is_empty());
    }

    #[tokio::test]
    async fn create_task_maps_flat_body() {
        let board = Arc::new(RecordingBoard::default());
        let (status, json) = send(
            app(board.clone()),
            "POST",
            "/create-task",
            Some(json!({
                "taskName": "Direct Event",
                "eventType": "Workshop",
                "daysToAttend": "Mon, Tue",
                "acknowledgement": true
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Event created successfully!");
        let calls = board.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Direct Event");
        assert_eq!(calls[0].1.get("color_col"), Some(&json!({"label": "Workshop"})));
        assert_eq!(
            calls[0].1.get("dropdown_days"),
            Some(&json!({"labels": ["Mon", "Tue"]}))
        );
        assert_eq!(calls[0].1.get("boolean_col"), Some(&json!({"checked": "true"})));
    }

    #[tokio::test]
    async fn create_task_accepts_null_fields() {
        let board = Arc::new(RecordingBoard::default());
        let (status, json) = send(
            app(board.clone()),
            "POST",
            "/create-task",
            Some(json!({
                "taskName": "Null Fields",
                "email": null,
                "organization": null,
                "daysToAttend": null,
                "acknowledgement": null
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["formData"]["email"], "");
        let calls = board.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Null Fields");
        assert_eq!(calls[0].1.len(), 1);
        assert!(calls[0].1.contains("status"));
    }

    #[tokio::test]
    async fn test_board_sends_every_column() {
        let board = Arc::new(RecordingBoard::default());
        let (status, json) = send(app(board.clone()), "POST", "/test-board", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(
            json["mondayItem"]["name"]
                .as_str()
                .unwrap()
                .starts_with("Test Event - ")
        );
        let calls = board.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.len(), 9);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let board = Arc::new(RecordingBoard::default());
        let (status, json) = send(app(board), "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "OK");
        let ts = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[tokio::test]
    async fn test_remote_reports_columns() {
        let board = Arc::new(RecordingBoard {
            columns: Some(vec![BoardColumn {
                id: "status".into(),
                title: "Status".into(),
                column_type: "status".into(),
            }]),
            ..Default::default()
        });
        let (status, json) = send(app(board), "GET", "/test-remote", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["boardId"], "777");
        assert_eq!(json["columns"][0]["type"], "status");
    }

    #[tokio::test]
    async fn test_remote_failure_yields_null_columns() {
        let board = Arc::new(RecordingBoard::default());
        let (status, json) = send(app(board), "GET", "/test-remote", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["boardId"], "777");
        assert!(json["columns"].is_null());
    }
}
