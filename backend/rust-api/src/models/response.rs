use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::CascadeReport;

/// `{status, message}` envelope returned by every mutating endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub status: u16,
    pub message: String,
    /// Id assigned by a create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascade: Option<CascadeReport>,
}

impl SuccessResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            id: None,
            deleted: None,
            cascade: None,
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message)
    }

    pub fn created(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, message)
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_deleted(mut self, deleted: u64) -> Self {
        self.deleted = Some(deleted);
        self
    }

    pub fn with_cascade(mut self, cascade: CascadeReport) -> Self {
        self.cascade = Some(cascade);
        self
    }
}

impl IntoResponse for SuccessResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
