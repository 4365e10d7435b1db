//! Error taxonomy shared by every connector.
//!
//! Each variant maps to a fixed HTTP status and to the `tryLater` flag the
//! platform uses to decide whether a failed page should be retried. The
//! connector itself never retries.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Errors surfaced to the integration platform.
#[derive(Error, Debug)]
pub enum AppError {
    /// The caller sent a malformed request (missing field, unknown type, ...).
    #[error("{0}")]
    Validation(String),

    /// A vendor API call failed. Status and retryability come from the vendor.
    #[error("{message}")]
    Vendor {
        status: u16,
        message: String,
        try_later: bool,
    },

    /// The cumulative size of synchronized files went over the ceiling.
    #[error(
        "Total size of files to sync ({:.2} GB) exceeds the limit of {} GB. Please select fewer drives to sync.",
        gigabytes(.total_bytes),
        whole_gigabytes(.limit_bytes)
    )]
    QuotaExceeded { total_bytes: u64, limit_bytes: u64 },

    /// Anything else. Logged, never shown to the caller.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn gigabytes(bytes: &u64) -> f64 {
    *bytes as f64 / BYTES_PER_GB
}

fn whole_gigabytes(bytes: &u64) -> u64 {
    bytes / (1024 * 1024 * 1024)
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Shorthand for the `"<field>" is missing` validation failure.
    pub fn missing(field: &str) -> Self {
        AppError::Validation(format!("\"{}\" is missing", field))
    }

    pub fn vendor(status: u16, message: impl Into<String>, try_later: bool) -> Self {
        AppError::Vendor {
            status,
            message: message.into(),
            try_later,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::QuotaExceeded { .. } => StatusCode::BAD_REQUEST,
            AppError::Vendor { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `None` for unexpected errors, where retryability is unknown.
    pub fn try_later(&self) -> Option<bool> {
        match self {
            AppError::Validation(_) | AppError::QuotaExceeded { .. } => Some(false),
            AppError::Vendor { try_later, .. } => Some(*try_later),
            AppError::Internal(_) => None,
        }
    }
}

/// Error body: `{message, tryLater?}`.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub try_later: Option<bool>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let try_later = self.try_later();

        let message = match &self {
            AppError::Internal(err) => {
                error!(error = ?err, "unhandled error");
                "Oops, something goes wrong".to_string()
            }
            handled => {
                warn!(
                    status = status.as_u16(),
                    try_later = ?try_later,
                    "Handled app error: {}",
                    handled
                );
                handled.to_string()
            }
        };

        (status, Json(ErrorResponse { message, try_later })).into_response()
    }
}
