use std::sync::Arc;

use serde_json::json;
use validator::Validate;

use super::aggregation::enrich_quizzes;
use super::cascade::run_cascade;
use crate::config::CascadePolicy;
use crate::error::{AppError, AppResult};
use crate::models::{Category, Quiz, QuizRequest, QuizView, SuccessResponse};
use crate::remote::{CategoryPeer, QuestionPeer};
use crate::store::ResourceStore;

pub struct QuizService {
    store: Arc<dyn ResourceStore<Quiz>>,
    categories: Arc<dyn CategoryPeer>,
    questions: Arc<dyn QuestionPeer>,
    policy: CascadePolicy,
}

fn not_found(quiz_id: i64) -> AppError {
    AppError::NotFound(format!("Quiz not found with id: {}", quiz_id))
}

impl QuizService {
    pub fn new(
        store: Arc<dyn ResourceStore<Quiz>>,
        categories: Arc<dyn CategoryPeer>,
        questions: Arc<dyn QuestionPeer>,
        policy: CascadePolicy,
    ) -> Self {
        Self {
            store,
            categories,
            questions,
            policy,
        }
    }

    async fn ensure_name_free(&self, name: &str) -> AppResult<()> {
        if !self.store.find_by("quizName", json!(name)).await?.is_empty() {
            tracing::warn!(quiz_name = %name, "Quiz already exists");
            return Err(AppError::Duplicate("Quiz already exists".to_string()));
        }
        Ok(())
    }

    async fn load(&self, quiz_id: i64) -> AppResult<Quiz> {
        self.store.get(quiz_id).await?.ok_or_else(|| {
            tracing::warn!(quiz_id, "Quiz not found");
            not_found(quiz_id)
        })
    }

    async fn category(&self, category_id: i64) -> AppResult<Category> {
        self.categories
            .get_category(category_id)
            .await
            .map_err(|e| AppError::from_lookup(e, "Category", "id", category_id))
    }

    pub async fn add(&self, request: QuizRequest) -> AppResult<SuccessResponse> {
        request.validate()?;
        self.ensure_name_free(&request.quiz_name).await?;
        self.category(request.category_id).await?;

        let saved = self.store.insert(request.into_quiz(0)).await?;
        tracing::info!(quiz_id = saved.quiz_id, category_id = saved.category_id, "Quiz created");
        Ok(SuccessResponse::created("Quiz added successfully").with_id(saved.quiz_id))
    }

    pub async fn get(&self, quiz_id: i64) -> AppResult<QuizView> {
        let quiz = self.load(quiz_id).await?;
        let category = self.category(quiz.category_id).await?;
        Ok(QuizView { quiz, category })
    }

    pub async fn list(&self) -> AppResult<Vec<QuizView>> {
        let quizzes = self.store.list().await?;
        enrich_quizzes(self.categories.as_ref(), quizzes).await
    }

    pub async fn list_by_category(&self, category_id: i64) -> AppResult<Vec<QuizView>> {
        let quizzes = self.store.find_by("categoryId", json!(category_id)).await?;
        enrich_quizzes(self.categories.as_ref(), quizzes).await
    }

    /// Enriched quizzes among `ids`; unknown ids are left out.
    pub async fn get_batch(&self, ids: &[i64]) -> AppResult<Vec<QuizView>> {
        let mut quizzes = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(quiz) = self.store.get(id).await? {
                quizzes.push(quiz);
            }
        }
        enrich_quizzes(self.categories.as_ref(), quizzes).await
    }

    pub async fn update(&self, quiz_id: i64, request: QuizRequest) -> AppResult<SuccessResponse> {
        request.validate()?;
        let existing = self.load(quiz_id).await?;
        if existing.quiz_name != request.quiz_name {
            self.ensure_name_free(&request.quiz_name).await?;
        }
        self.category(request.category_id).await?;

        self.store
            .update(request.into_quiz(quiz_id))
            .await?
            .ok_or_else(|| not_found(quiz_id))?;

        tracing::info!(quiz_id, "Quiz updated");
        Ok(SuccessResponse::ok("Quiz updated successfully"))
    }

    /// Removes the quiz after the question service has removed its questions.
    /// If that call fails the quiz stays and the error is returned.
    pub async fn delete(&self, quiz_id: i64) -> AppResult<SuccessResponse> {
        self.load(quiz_id).await?;

        let removed = self
            .questions
            .delete_questions_by_quiz(quiz_id)
            .await
            .map_err(|e| AppError::from_remote(e, format!("Failed to delete questions of quiz {}", quiz_id)))?;

        self.store.delete(quiz_id).await?;
        tracing::info!(quiz_id, questions = removed, "Quiz deleted");
        Ok(SuccessResponse::ok("Quiz deleted successfully").with_deleted(removed))
    }

    /// Removes every quiz of a category, each one after its questions.
    pub async fn delete_by_category(&self, category_id: i64) -> AppResult<SuccessResponse> {
        let quiz_ids: Vec<i64> = self
            .store
            .find_by("categoryId", json!(category_id))
            .await?
            .iter()
            .map(|q| q.quiz_id)
            .collect();

        let questions = self.questions.as_ref();
        let store = self.store.as_ref();
        let cascade = run_cascade(self.policy, "category", category_id, quiz_ids, |quiz_id| async move {
            questions
                .delete_questions_by_quiz(quiz_id)
                .await
                .map_err(|e| AppError::from_remote(e, format!("Failed to delete questions of quiz {}", quiz_id)))?;
            store.delete(quiz_id).await?;
            Ok(())
        })
        .await?;

        let removed = cascade.completed.len() as u64;
        Ok(SuccessResponse::ok("Quizzes deleted successfully")
            .with_deleted(removed)
            .with_cascade(cascade))
    }

    pub async fn set_enabled(&self, quiz_id: i64, enabled: bool) -> AppResult<SuccessResponse> {
        let mut quiz = self.load(quiz_id).await?;
        quiz.enabled = enabled;
        self.store
            .update(quiz)
            .await?
            .ok_or_else(|| not_found(quiz_id))?;

        let message = if enabled {
            "Quiz enabled successfully"
        } else {
            "Quiz disabled successfully"
        };
        Ok(SuccessResponse::ok(message))
    }
}
