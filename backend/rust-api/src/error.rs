use std::collections::BTreeMap;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::remote::RemoteError;

/// Errors surfaced by the domain services, mapped onto the uniform
/// `{status, message}` envelope shared by every service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// One entry per invalid field.
    #[error("validation failed: {0:?}")]
    Validation(BTreeMap<String, String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    DuplicateOption(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    UpstreamUnavailable(String),

    #[error("{0}")]
    UpstreamDecode(String),

    #[error("{0}")]
    AuthenticationFailed(String),

    #[error("{0}")]
    InvalidToken(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::DuplicateOption(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UpstreamDecode(_) => StatusCode::BAD_GATEWAY,
            AppError::AuthenticationFailed(_) | AppError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), message.into());
        AppError::Validation(fields)
    }

    /// Re-wraps a peer failure with what was being asked of the peer.
    /// A peer `NotFound` stays `NotFound` and the context becomes its message;
    /// the other variants keep their class.
    pub fn from_remote(err: RemoteError, context: impl Into<String>) -> Self {
        let context = context.into();
        let rendered = err.to_string();
        match err {
            RemoteError::NotFound { service, message } => {
                tracing::debug!(peer = %service, peer_message = %message, "{}", context);
                AppError::NotFound(context)
            }
            RemoteError::Unavailable { .. } => {
                AppError::UpstreamUnavailable(format!("{}: {}", context, rendered))
            }
            RemoteError::Decode { .. } => {
                AppError::UpstreamDecode(format!("{}: {}", context, rendered))
            }
        }
    }

    /// Peer failure while fetching one `entity` by `field`. Only a peer
    /// `NotFound` is reported as "not found".
    pub fn from_lookup(err: RemoteError, entity: &str, field: &str, value: impl fmt::Display) -> Self {
        let context = match &err {
            RemoteError::NotFound { .. } => format!("{} not found with {}: {}", entity, field, value),
            _ => format!("{} lookup failed for {} {}", entity, field, value),
        };
        Self::from_remote(err, context)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();
        collect_field_errors(&errors, "", &mut fields);
        AppError::Validation(fields)
    }
}

/// Flattens validator output into `wireName -> message`, nested structs
/// becoming `parent.child`.
fn collect_field_errors(errors: &ValidationErrors, prefix: &str, out: &mut BTreeMap<String, String>) {
    for (field, kind) in errors.errors() {
        let name = camel_case(&field.to_string());
        let key = if prefix.is_empty() {
            name
        } else {
            format!("{}.{}", prefix, name)
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let message = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", key));
                out.insert(key, message);
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(inner, &key, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(inner, &format!("{}[{}]", key, index), out);
                }
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        let message = err.to_string();
        match err {
            RemoteError::NotFound { message, .. } => AppError::NotFound(message),
            RemoteError::Unavailable { .. } => AppError::UpstreamUnavailable(message),
            RemoteError::Decode { .. } => AppError::UpstreamDecode(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(fields) => {
                let mut body = Map::new();
                body.insert("status".to_string(), json!(status.as_u16()));
                for (field, message) in fields {
                    body.insert(field, Value::String(message));
                }
                Value::Object(body)
            }
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "Internal server error");
                json!({
                    "status": status.as_u16(),
                    "message": "Internal Server Error",
                })
            }
            other => {
                if status.is_server_error() {
                    tracing::warn!(status = status.as_u16(), "{}", other);
                }
                json!({
                    "status": status.as_u16(),
                    "message": other.to_string(),
                })
            }
        };

        (status, Json(body)).into_response()
    }
}
