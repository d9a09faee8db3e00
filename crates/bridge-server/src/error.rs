use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::error::{JobError, SdkError};
use serde_json::json;
use uuid::Uuid;

/// Error body returned by every route: `{error, message?, code?, kind?, jobId?}`
#[derive(Debug)]
pub enum ApiError {
    /// Request rejected before reaching the printer
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    /// A printer operation failed; `context` titles the 500 case
    Job {
        context: &'static str,
        error: JobError,
        job_id: Option<Uuid>,
    },
}

impl ApiError {
    pub fn job(context: &'static str, error: JobError, job_id: Option<Uuid>) -> Self {
        Self::Job {
            context,
            error,
            job_id,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Job { error, .. } => job_status(error),
        }
    }
}

fn job_status(error: &JobError) -> StatusCode {
    match error {
        JobError::Busy => StatusCode::TOO_MANY_REQUESTS,
        JobError::NoPrinter | JobError::Sdk(SdkError::NotConnected) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        JobError::InvalidRequest(_) | JobError::Sequence(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::BadRequest(message) => json!({
                "error": "Invalid request body",
                "message": message,
                "kind": "invalid_request",
            }),
            Self::Unauthorized => json!({ "error": "Invalid or missing API key" }),
            Self::Forbidden(ip) => json!({ "error": format!("IP {} not allowed", ip) }),
            Self::Job {
                context,
                error,
                job_id,
            } => {
                // client-side failures carry their own title
                let title = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    context.to_string()
                } else {
                    error.to_string()
                };
                json!({
                    "error": title,
                    "message": error.to_string(),
                    "code": error.code(),
                    "kind": error.kind(),
                    "jobId": job_id,
                })
            }
        };
        (status, Json(body)).into_response()
    }
}
