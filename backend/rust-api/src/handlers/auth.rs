use axum::extract::State;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    extractors::{AppJson, AppQuery},
    models::{CredentialRequest, SuccessResponse, TokenRequest},
    services::AuthService,
};

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    #[serde(default)]
    pub token: String,
}

/// POST /auth/register
pub async fn register(
    State(service): State<Arc<AuthService>>,
    AppJson(req): AppJson<CredentialRequest>,
) -> AppResult<SuccessResponse> {
    service.register(req).await
}

/// POST /auth/token - plain-text bearer token
pub async fn token(
    State(service): State<Arc<AuthService>>,
    AppJson(req): AppJson<TokenRequest>,
) -> AppResult<String> {
    service.token(req).await
}

/// GET /auth/validate?token=...
pub async fn validate(
    State(service): State<Arc<AuthService>>,
    AppQuery(query): AppQuery<ValidateQuery>,
) -> AppResult<&'static str> {
    service.validate(&query.token)
}
