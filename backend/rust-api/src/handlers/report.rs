use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    extractors::{AppJson, AppPath},
    models::{ReportRequest, ReportView, SuccessResponse},
    services::ReportService,
};

/// POST /reports
pub async fn create(
    State(service): State<Arc<ReportService>>,
    AppJson(req): AppJson<ReportRequest>,
) -> AppResult<SuccessResponse> {
    tracing::info!("Recording report for quiz {}", req.quiz_id);
    service.create(req).await
}

/// GET /reports
pub async fn list(State(service): State<Arc<ReportService>>) -> AppResult<Json<Vec<ReportView>>> {
    Ok(Json(service.list().await?))
}

/// GET /reports/{email}
pub async fn list_by_email(
    State(service): State<Arc<ReportService>>,
    AppPath(email): AppPath<String>,
) -> AppResult<Json<Vec<ReportView>>> {
    Ok(Json(service.list_by_email(&email).await?))
}

/// GET /reports/id/{reportId}
pub async fn get(
    State(service): State<Arc<ReportService>>,
    AppPath(report_id): AppPath<i64>,
) -> AppResult<Json<ReportView>> {
    Ok(Json(service.get(report_id).await?))
}
