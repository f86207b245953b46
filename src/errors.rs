use crate::schema::RecordName;
use axum::http::StatusCode;
use thiserror::Error;

/// Failure reported by a persistence backend. The caller keeps its in-memory
/// value when this happens.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, {quota} allowed")]
    Quota {
        key: String,
        needed: usize,
        quota: usize,
    },

    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write storage file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown record {0:?}")]
    UnknownRecord(String),

    #[error("{0} is derived and cannot be written")]
    Derived(RecordName),

    #[error("value does not match the {name} record: {source}")]
    Invalid {
        name: RecordName,
        #[source]
        source: serde_json::Error,
    },

    #[error("day {0} is outside the challenge")]
    DayOutOfRange(u32),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Persistence(err) => Self::internal(err),
            other => Self::bad_request(other.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
