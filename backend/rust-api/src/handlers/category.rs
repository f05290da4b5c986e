use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    extractors::{AppJson, AppPath, AppQuery},
    models::{BatchIdsQuery, Category, CategoryRequest, SuccessResponse},
    services::CategoryService,
};

/// POST /categories
pub async fn add(
    State(service): State<Arc<CategoryService>>,
    AppJson(req): AppJson<CategoryRequest>,
) -> AppResult<SuccessResponse> {
    tracing::info!("Adding category: {}", req.category_name);
    service.add(req).await
}

/// GET /categories
pub async fn list(State(service): State<Arc<CategoryService>>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(service.list().await?))
}

/// GET /categories/{id}
pub async fn get(
    State(service): State<Arc<CategoryService>>,
    AppPath(category_id): AppPath<i64>,
) -> AppResult<Json<Category>> {
    Ok(Json(service.get(category_id).await?))
}

/// GET /categories/batch?ids=3010,3011
pub async fn batch(
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<BatchIdsQuery>,
) -> AppResult<Json<Vec<Category>>> {
    let ids = query.parse().map_err(AppError::BadRequest)?;
    Ok(Json(service.get_batch(&ids).await?))
}

/// PUT /categories/{id}
pub async fn update(
    State(service): State<Arc<CategoryService>>,
    AppPath(category_id): AppPath<i64>,
    AppJson(req): AppJson<CategoryRequest>,
) -> AppResult<SuccessResponse> {
    service.update(category_id, req).await
}

/// DELETE /categories/{id} - also removes the category's quizzes and their questions
pub async fn delete(
    State(service): State<Arc<CategoryService>>,
    AppPath(category_id): AppPath<i64>,
) -> AppResult<SuccessResponse> {
    tracing::info!(category_id, "Deleting category");
    service.delete(category_id).await
}

/// PUT /categories/enable/{id}
pub async fn enable(
    State(service): State<Arc<CategoryService>>,
    AppPath(category_id): AppPath<i64>,
) -> AppResult<SuccessResponse> {
    service.set_enabled(category_id, true).await
}

/// PUT /categories/disable/{id}
pub async fn disable(
    State(service): State<Arc<CategoryService>>,
    AppPath(category_id): AppPath<i64>,
) -> AppResult<SuccessResponse> {
    service.set_enabled(category_id, false).await
}
