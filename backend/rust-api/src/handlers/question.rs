use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    extractors::{AppJson, AppPath},
    models::{QuestionRequest, QuestionView, SuccessResponse},
    services::QuestionService,
};

/// POST /api/questions
pub async fn add(
    State(service): State<Arc<QuestionService>>,
    AppJson(req): AppJson<QuestionRequest>,
) -> AppResult<SuccessResponse> {
    service.add(req).await
}

/// GET /api/questions
pub async fn list(State(service): State<Arc<QuestionService>>) -> AppResult<Json<Vec<QuestionView>>> {
    Ok(Json(service.list().await?))
}

/// GET /api/questions/{id}
pub async fn get(
    State(service): State<Arc<QuestionService>>,
    AppPath(question_id): AppPath<i64>,
) -> AppResult<Json<QuestionView>> {
    Ok(Json(service.get(question_id).await?))
}

/// GET /api/questions/quiz/{quizId}
pub async fn list_by_quiz(
    State(service): State<Arc<QuestionService>>,
    AppPath(quiz_id): AppPath<i64>,
) -> AppResult<Json<Vec<QuestionView>>> {
    Ok(Json(service.list_by_quiz(quiz_id).await?))
}

/// PUT /api/questions/{id}
pub async fn update(
    State(service): State<Arc<QuestionService>>,
    AppPath(question_id): AppPath<i64>,
    AppJson(req): AppJson<QuestionRequest>,
) -> AppResult<SuccessResponse> {
    service.update(question_id, req).await
}

/// DELETE /api/questions/{id}
pub async fn delete(
    State(service): State<Arc<QuestionService>>,
    AppPath(question_id): AppPath<i64>,
) -> AppResult<SuccessResponse> {
    service.delete(question_id).await
}

/// DELETE /api/questions/deletebyquiz/{quizId}
pub async fn delete_by_quiz(
    State(service): State<Arc<QuestionService>>,
    AppPath(quiz_id): AppPath<i64>,
) -> AppResult<SuccessResponse> {
    service.delete_by_quiz(quiz_id).await
}
