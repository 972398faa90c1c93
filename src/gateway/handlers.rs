use super::AppState;
use crate::access::{self, Decision, PathClass};
use crate::diagnostics::health::{self, MODEL_COMPONENT, STORE_COMPONENT};
use crate::error::CareError;
use crate::pipeline::{RawFields, UserId};
use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;

const PROFILE_SAVE_FAILURE_MESSAGE: &str = "An error occurred while saving your profile.";
const READ_FAILURE_MESSAGE: &str = "An error occurred while loading your data.";
const INTERNAL_FAILURE_MESSAGE: &str = "An internal error occurred. Please try again.";

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

/// HTTP status for a failed operation.
pub(super) fn status_for(error: &CareError) -> StatusCode {
    match error {
        CareError::Validation(_) => StatusCode::BAD_REQUEST,
        CareError::ExternalService(_) | CareError::MalformedModelOutput { .. } => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn record_health(error: &CareError) {
    if error.is_model_failure() {
        health::mark_component_error(MODEL_COMPONENT, error);
    } else if matches!(error, CareError::Persistence(_)) {
        health::mark_component_error(STORE_COMPONENT, error);
    }
}

/// Unwrap a JSON object body or answer 400.
fn form_body(body: Result<Json<RawFields>, JsonRejection>) -> Result<RawFields, Response> {
    body.map(|Json(fields)| fields).map_err(|e| {
        tracing::debug!(error = %e, "rejected request body");
        error_response(
            StatusCode::BAD_REQUEST,
            "Invalid input: body must be a JSON object.",
        )
    })
}

/// Run `task` on its own tokio task so a dropped connection or the request
/// timeout cannot cancel it halfway.
async fn detached<F>(task: F) -> Result<F::Output, Response>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(task).await.map_err(|error| {
        tracing::error!(%error, "detached request task failed");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_FAILURE_MESSAGE)
    })
}

fn path_user(raw: &str) -> Result<UserId, Response> {
    UserId::parse(raw).map_err(|e| error_response(StatusCode::BAD_REQUEST, e.user_message()))
}

/// GET /health (public)
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(health::snapshot_json())
}

/// POST /api/messages
pub(super) async fn handle_send_message(
    State(state): State<AppState>,
    body: Result<Json<RawFields>, JsonRejection>,
) -> Response {
    let fields = match form_body(body) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    let services = state.services.clone();
    let run = match detached(async move { services.pipeline.run(&fields).await }).await {
        Ok(run) => run,
        Err(response) => return response,
    };

    match run {
        Ok(outcome) => {
            health::mark_component_ok(MODEL_COMPONENT);
            health::mark_component_ok(STORE_COMPONENT);
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(failure) => {
            record_health(&failure.error);
            let body = serde_json::json!({
                "error": failure.user_message(),
                "stage": failure.stage.to_string(),
            });
            (status_for(&failure.error), Json(body)).into_response()
        }
    }
}

/// GET /api/conversations/{user}
pub(super) async fn handle_conversations(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Response {
    let user_id = match path_user(&user) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match state.services.history.read(&user_id).await {
        Ok(turns) => {
            let body = serde_json::json!({ "userId": user_id, "turns": turns });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => {
            tracing::warn!(user_id = %user_id, %error, "conversation read failed");
            record_health(&error);
            error_response(status_for(&error), READ_FAILURE_MESSAGE)
        }
    }
}

/// POST /api/history/delete
pub(super) async fn handle_delete_history(
    State(state): State<AppState>,
    body: Result<Json<RawFields>, JsonRejection>,
) -> Response {
    let fields = match form_body(body) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    let services = state.services.clone();
    let erased = match detached(async move { services.history.erase(&fields).await }).await {
        Ok(erased) => erased,
        Err(response) => return response,
    };

    match erased {
        Ok(deleted) => (StatusCode::OK, Json(serde_json::json!({ "deleted": deleted })))
            .into_response(),
        Err(failure) => {
            record_health(failure.error());
            error_response(status_for(failure.error()), failure.user_message())
        }
    }
}

/// GET /api/profile/{user}
pub(super) async fn handle_load_profile(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Response {
    let user_id = match path_user(&user) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match state.services.profiles.load(&user_id).await {
        Ok(Some(profile)) => (StatusCode::OK, Json(profile)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Profile not found."),
        Err(error) => {
            tracing::warn!(user_id = %user_id, %error, "profile load failed");
            record_health(&error);
            error_response(status_for(&error), READ_FAILURE_MESSAGE)
        }
    }
}

/// PUT /api/profile
pub(super) async fn handle_save_profile(
    State(state): State<AppState>,
    body: Result<Json<RawFields>, JsonRejection>,
) -> Response {
    let fields = match form_body(body) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    match state.services.profiles.save(&fields).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(CareError::Validation(err)) => {
            error_response(StatusCode::BAD_REQUEST, err.user_message())
        }
        Err(error) => {
            tracing::warn!(%error, "profile save failed");
            record_health(&error);
            error_response(status_for(&error), PROFILE_SAVE_FAILURE_MESSAGE)
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct NavigateQuery {
    pub path: String,
    #[serde(default)]
    pub authenticated: bool,
}

/// GET /api/navigate?path=..&authenticated=..
pub(super) async fn handle_navigate(
    query: Result<Query<NavigateQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected navigate query");
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid input: path is required; authenticated must be true or false.",
            );
        }
    };
    let class = PathClass::of(&query.path);
    let decision = access::decide(query.authenticated, &query.path);
    let target = match decision {
        Decision::Allow => None,
        Decision::Redirect { target } => Some(target),
    };
    Json(serde_json::json!({
        "path": query.path,
        "class": class,
        "decision": match decision {
            Decision::Allow => "allow",
            Decision::Redirect { .. } => "redirect",
        },
        "target": target,
    }))
    .into_response()
}
