use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    extractors::{AppJson, AppPath, AppQuery},
    models::{BatchIdsQuery, QuizRequest, QuizView, SuccessResponse},
    services::QuizService,
};

/// POST /quizzes/save
pub async fn add(
    State(service): State<Arc<QuizService>>,
    AppJson(req): AppJson<QuizRequest>,
) -> AppResult<SuccessResponse> {
    tracing::info!("Adding quiz {} to category {}", req.quiz_name, req.category_id);
    service.add(req).await
}

/// GET /quizzes
pub async fn list(State(service): State<Arc<QuizService>>) -> AppResult<Json<Vec<QuizView>>> {
    Ok(Json(service.list().await?))
}

/// GET /quizzes/{id}
pub async fn get(
    State(service): State<Arc<QuizService>>,
    AppPath(quiz_id): AppPath<i64>,
) -> AppResult<Json<QuizView>> {
    Ok(Json(service.get(quiz_id).await?))
}

/// GET /quizzes/batch?ids=4010,4011
pub async fn batch(
    State(service): State<Arc<QuizService>>,
    AppQuery(query): AppQuery<BatchIdsQuery>,
) -> AppResult<Json<Vec<QuizView>>> {
    let ids = query.parse().map_err(AppError::BadRequest)?;
    Ok(Json(service.get_batch(&ids).await?))
}

/// GET /quizzes/categories/{categoryId}
pub async fn list_by_category(
    State(service): State<Arc<QuizService>>,
    AppPath(category_id): AppPath<i64>,
) -> AppResult<Json<Vec<QuizView>>> {
    Ok(Json(service.list_by_category(category_id).await?))
}

/// PUT /quizzes/{id}
pub async fn update(
    State(service): State<Arc<QuizService>>,
    AppPath(quiz_id): AppPath<i64>,
    AppJson(req): AppJson<QuizRequest>,
) -> AppResult<SuccessResponse> {
    service.update(quiz_id, req).await
}

/// DELETE /quizzes/{id}
pub async fn delete(
    State(service): State<Arc<QuizService>>,
    AppPath(quiz_id): AppPath<i64>,
) -> AppResult<SuccessResponse> {
    tracing::info!(quiz_id, "Deleting quiz");
    service.delete(quiz_id).await
}

/// DELETE /quizzes/delete/quiz/{categoryId} - called by the category service
pub async fn delete_by_category(
    State(service): State<Arc<QuizService>>,
    AppPath(category_id): AppPath<i64>,
) -> AppResult<SuccessResponse> {
    service.delete_by_category(category_id).await
}

/// PUT /quizzes/enable/{id}
pub async fn enable(
    State(service): State<Arc<QuizService>>,
    AppPath(quiz_id): AppPath<i64>,
) -> AppResult<SuccessResponse> {
    service.set_enabled(quiz_id, true).await
}

/// PUT /quizzes/disable/{id}
pub async fn disable(
    State(service): State<Arc<QuizService>>,
    AppPath(quiz_id): AppPath<i64>,
) -> AppResult<SuccessResponse> {
    service.set_enabled(quiz_id, false).await
}
