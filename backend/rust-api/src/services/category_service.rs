use std::sync::Arc;

use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Category, CategoryRequest, SuccessResponse};
use crate::remote::QuizPeer;
use crate::store::ResourceStore;

pub struct CategoryService {
    store: Arc<dyn ResourceStore<Category>>,
    quizzes: Arc<dyn QuizPeer>,
}

fn not_found(category_id: i64) -> AppError {
    AppError::NotFound(format!("Category not found with id: {}", category_id))
}

impl CategoryService {
    pub fn new(store: Arc<dyn ResourceStore<Category>>, quizzes: Arc<dyn QuizPeer>) -> Self {
        Self { store, quizzes }
    }

    async fn ensure_name_free(&self, name: &str) -> AppResult<()> {
        let existing = self.store.find_by("categoryName", json!(name)).await?;
        if !existing.is_empty() {
            tracing::warn!(category_name = %name, "Category already exists");
            return Err(AppError::Duplicate("Category already exists".to_string()));
        }
        Ok(())
    }

    async fn load(&self, category_id: i64) -> AppResult<Category> {
        self.store.get(category_id).await?.ok_or_else(|| {
            tracing::warn!(category_id, "Category not found");
            not_found(category_id)
        })
    }

    pub async fn add(&self, request: CategoryRequest) -> AppResult<SuccessResponse> {
        request.validate()?;
        self.ensure_name_free(&request.category_name).await?;

        let saved = self.store.insert(request.into_category(0)).await?;
        tracing::info!(category_id = saved.category_id, "Category created");
        Ok(SuccessResponse::created("Category added successfully").with_id(saved.category_id))
    }

    pub async fn get(&self, category_id: i64) -> AppResult<Category> {
        self.load(category_id).await
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        Ok(self.store.list().await?)
    }

    /// Categories among `ids` that exist; unknown ids are left out.
    pub async fn get_batch(&self, ids: &[i64]) -> AppResult<Vec<Category>> {
        let mut found = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(category) = self.store.get(id).await? {
                found.push(category);
            }
        }
        Ok(found)
    }

    pub async fn update(&self, category_id: i64, request: CategoryRequest) -> AppResult<SuccessResponse> {
        request.validate()?;
        let existing = self.load(category_id).await?;
        if existing.category_name != request.category_name {
            self.ensure_name_free(&request.category_name).await?;
        }

        self.store
            .update(request.into_category(category_id))
            .await?
            .ok_or_else(|| not_found(category_id))?;

        tracing::info!(category_id, "Category updated");
        Ok(SuccessResponse::ok("Category updated successfully"))
    }

    /// Removes the category after the quiz service has removed its quizzes.
    /// If that call fails the category stays and the error is returned.
    pub async fn delete(&self, category_id: i64) -> AppResult<SuccessResponse> {
        self.load(category_id).await?;

        let cascade = self
            .quizzes
            .delete_quizzes_by_category(category_id)
            .await
            .map_err(|e| {
                AppError::from_remote(e, format!("Failed to delete quizzes of category {}", category_id))
            })?;

        self.store.delete(category_id).await?;

        if cascade.is_partial() {
            tracing::warn!(category_id, failed = ?cascade.failed, "Category deleted, some quizzes remain");
        } else {
            tracing::info!(category_id, quizzes = cascade.completed.len(), "Category deleted");
        }
        Ok(SuccessResponse::ok("Category deleted successfully").with_cascade(cascade))
    }

    pub async fn set_enabled(&self, category_id: i64, enabled: bool) -> AppResult<SuccessResponse> {
        let mut category = self.load(category_id).await?;
        category.enabled = enabled;
        self.store
            .update(category)
            .await?
            .ok_or_else(|| not_found(category_id))?;

        let message = if enabled {
            "Category enabled successfully"
        } else {
            "Category disabled successfully"
        };
        Ok(SuccessResponse::ok(message))
    }
}
