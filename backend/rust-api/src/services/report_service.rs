use std::sync::Arc;

use serde_json::json;
use validator::Validate;

use super::aggregation::enrich_reports;
use crate::error::{AppError, AppResult};
use crate::models::{QuizView, Report, ReportRequest, ReportView, SuccessResponse, UserProfile};
use crate::remote::{QuizPeer, RegistrationPeer};
use crate::store::ResourceStore;

pub struct ReportService {
    store: Arc<dyn ResourceStore<Report>>,
    users: Arc<dyn RegistrationPeer>,
    quizzes: Arc<dyn QuizPeer>,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn ResourceStore<Report>>,
        users: Arc<dyn RegistrationPeer>,
        quizzes: Arc<dyn QuizPeer>,
    ) -> Self {
        Self {
            store,
            users,
            quizzes,
        }
    }

    async fn user(&self, email: &str) -> AppResult<UserProfile> {
        self.users
            .get_user(email)
            .await
            .map_err(|e| AppError::from_lookup(e, "User", "email", email))
    }

    async fn quiz(&self, quiz_id: i64) -> AppResult<QuizView> {
        self.quizzes
            .get_quiz(quiz_id)
            .await
            .map_err(|e| AppError::from_lookup(e, "Quiz", "id", quiz_id))
    }

    pub async fn create(&self, request: ReportRequest) -> AppResult<SuccessResponse> {
        request.validate()?;
        self.user(&request.user_email_id).await?;
        self.quiz(request.quiz_id).await?;

        let saved = self.store.insert(request.into_report()).await?;
        tracing::info!(
            report_id = saved.report_id,
            quiz_id = saved.quiz_id,
            "Report created"
        );
        Ok(SuccessResponse::created("Report created successfully").with_id(saved.report_id))
    }

    pub async fn get(&self, report_id: i64) -> AppResult<ReportView> {
        let report = self
            .store
            .get(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report not found with id: {}", report_id)))?;

        let (user, quiz) = futures::try_join!(self.user(&report.user_email_id), self.quiz(report.quiz_id))?;
        Ok(ReportView { report, user, quiz })
    }

    pub async fn list(&self) -> AppResult<Vec<ReportView>> {
        let reports = self.store.list().await?;
        if reports.is_empty() {
            return Err(AppError::NotFound("No reports found".to_string()));
        }
        enrich_reports(self.users.as_ref(), self.quizzes.as_ref(), reports).await
    }

    pub async fn list_by_email(&self, email: &str) -> AppResult<Vec<ReportView>> {
        let reports = self.store.find_by("userEmailId", json!(email)).await?;
        if reports.is_empty() {
            tracing::warn!(email, "No reports for user");
            return Err(AppError::NotFound(format!("No reports found for email: {}", email)));
        }
        enrich_reports(self.users.as_ref(), self.quizzes.as_ref(), reports).await
    }
}
