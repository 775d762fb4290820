use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error envelope returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum AppError {
    /// Request body absent, `null` or `{}`
    MissingData,
    /// Same as `MissingData`, for update requests
    DataNotProvided,
    /// Request body present but not a JSON object
    InvalidBody(String),
    /// Path id is not a 24-character hex ObjectId
    InvalidIdentifier,
    UserNotFound,
    /// Stored user lacks a field the endpoint depends on
    MissingField(&'static str),
    /// External API answered non-200 or could not be reached
    Upstream { status: u16, message: String },
    DatabaseError(String),
}

impl AppError {
    /// Message placed in the `error` field of the envelope.
    /// Database details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::MissingData => "Missing data".to_string(),
            AppError::DataNotProvided => "Data not provided".to_string(),
            AppError::InvalidBody(detail) => format!("Invalid JSON body: {}", detail),
            AppError::InvalidIdentifier => "Invalid ID format".to_string(),
            AppError::UserNotFound => "User not found".to_string(),
            AppError::MissingField(field) => format!("User has no usable '{}' field", field),
            AppError::Upstream { message, .. } => message.clone(),
            AppError::DatabaseError(_) => "Database error".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingData => write!(f, "Missing data"),
            AppError::DataNotProvided => write!(f, "Data not provided"),
            AppError::InvalidBody(msg) => write!(f, "Invalid body: {}", msg),
            AppError::InvalidIdentifier => write!(f, "Invalid identifier"),
            AppError::UserNotFound => write!(f, "User not found"),
            AppError::MissingField(field) => write!(f, "Missing field: {}", field),
            AppError::Upstream { status, message } => {
                write!(f, "Upstream error ({}): {}", status, message)
            }
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingData
            | AppError::DataNotProvided
            | AppError::InvalidBody(_)
            | AppError::InvalidIdentifier => {
                StatusCode::BAD_REQUEST
            }
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::DatabaseError(_) => log::error!("❌ {}", self),
            AppError::Upstream { .. } => log::error!("❌ {}", self),
            _ => log::warn!("⚠️ {}", self),
        }

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.public_message(),
        })
    }
}
