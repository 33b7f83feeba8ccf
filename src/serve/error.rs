use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Unable to find user requested data")]
    NotFound,

    #[error("Users request/query was malformed: {0}")]
    MalformedRequest(String),

    #[error("no chain selected")]
    NoChainSelected,

    #[error("module {0} is not enabled for this chain")]
    ModuleDisabled(String),

    #[error("explorer error: {0}")]
    Explorer(#[from] crate::Error),
}

impl ServeError {
    pub fn malformed_request(str: impl ToString) -> Self {
        ServeError::MalformedRequest(str.to_string())
    }

    pub fn internal(str: impl ToString) -> Self {
        ServeError::Internal(str.to_string())
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let (status, string) = match self {
            ServeError::NotFound => (
                StatusCode::NOT_FOUND,
                "unable to find requested data".to_string(),
            ),
            ServeError::Explorer(e) if e.is_not_found() => (
                StatusCode::NOT_FOUND,
                format!("unable to find requested data: {e}"),
            ),
            ServeError::MalformedRequest(e) => (
                StatusCode::BAD_REQUEST,
                format!("unable to parse request parameters: {e}"),
            ),
            ServeError::ModuleDisabled(module) => (
                StatusCode::NOT_FOUND,
                format!("module {module} is not enabled for this chain"),
            ),
            ServeError::NoChainSelected => (
                StatusCode::SERVICE_UNAVAILABLE,
                "no chain selected".to_string(),
            ),
            ServeError::Explorer(e) if e.is_connectivity() => {
                warn!("upstream node error: {e}");
                (StatusCode::BAD_GATEWAY, format!("upstream node error: {e}"))
            }
            other => {
                error!("internal server error: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({
                "error": string
            })),
        )
            .into_response()
    }
}
