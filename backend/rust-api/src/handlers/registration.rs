use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    extractors::{AppJson, AppPath, AppQuery},
    models::{BatchEmailsQuery, LoginRequest, RegistrationRequest, SuccessResponse, UserProfile},
    services::RegistrationService,
};

/// POST /users/register
pub async fn register(
    State(service): State<Arc<RegistrationService>>,
    AppJson(req): AppJson<RegistrationRequest>,
) -> AppResult<SuccessResponse> {
    tracing::info!("Registering user: {}", req.email);
    service.register(req).await
}

/// POST /users/login
pub async fn login(
    State(service): State<Arc<RegistrationService>>,
    AppJson(req): AppJson<LoginRequest>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(service.login(req).await?))
}

/// GET /users
pub async fn list(State(service): State<Arc<RegistrationService>>) -> AppResult<Json<Vec<UserProfile>>> {
    Ok(Json(service.list().await?))
}

/// GET /users/get/{userId}
pub async fn get(
    State(service): State<Arc<RegistrationService>>,
    AppPath(user_id): AppPath<i64>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(service.get(user_id).await?))
}

/// GET /users/getUser/{email}
pub async fn get_by_email(
    State(service): State<Arc<RegistrationService>>,
    AppPath(email): AppPath<String>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(service.get_by_email(&email).await?))
}

/// GET /users/batch?emails=a@x.com,b@y.com
pub async fn batch(
    State(service): State<Arc<RegistrationService>>,
    AppQuery(query): AppQuery<BatchEmailsQuery>,
) -> AppResult<Json<Vec<UserProfile>>> {
    Ok(Json(service.get_batch(&query.parse()).await?))
}

/// PUT /users/{userId}
pub async fn update(
    State(service): State<Arc<RegistrationService>>,
    AppPath(user_id): AppPath<i64>,
    AppJson(req): AppJson<RegistrationRequest>,
) -> AppResult<SuccessResponse> {
    service.update(user_id, req).await
}
