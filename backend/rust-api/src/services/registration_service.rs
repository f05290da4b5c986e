use std::sync::Arc;

use anyhow::Context;
use bcrypt::{hash, verify, DEFAULT_COST};
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::registration::DEFAULT_ROLE;
use crate::models::{LoginRequest, Registration, RegistrationRequest, SuccessResponse, UserProfile};
use crate::store::ResourceStore;

pub struct RegistrationService {
    store: Arc<dyn ResourceStore<Registration>>,
    hash_cost: u32,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn ResourceStore<Registration>>) -> Self {
        Self {
            store,
            hash_cost: DEFAULT_COST,
        }
    }

    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Registration>> {
        Ok(self
            .store
            .find_by("email", json!(email))
            .await?
            .into_iter()
            .next())
    }

    async fn load(&self, user_id: i64) -> AppResult<Registration> {
        self.store
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found with id: {}", user_id)))
    }

    fn to_record(&self, user_id: i64, request: RegistrationRequest) -> AppResult<Registration> {
        let password = hash(&request.password, self.hash_cost).context("Failed to hash password")?;
        Ok(Registration {
            user_id,
            first_name: request.first_name,
            last_name: request.last_name,
            mobile_number: request.mobile_number,
            user_role: request
                .user_role
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            email: request.email,
            password,
        })
    }

    pub async fn register(&self, request: RegistrationRequest) -> AppResult<SuccessResponse> {
        request.validate()?;
        if self.find_by_email(&request.email).await?.is_some() {
            tracing::warn!(email = %request.email, "User already registered");
            return Err(AppError::Duplicate("User already exists".to_string()));
        }

        let saved = self.store.insert(self.to_record(0, request)?).await?;
        tracing::info!(user_id = saved.user_id, "User registered");
        Ok(SuccessResponse::created("User registered successfully").with_id(saved.user_id))
    }

    pub async fn get(&self, user_id: i64) -> AppResult<UserProfile> {
        Ok(self.load(user_id).await?.into())
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<UserProfile> {
        self.find_by_email(email)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| AppError::NotFound(format!("User not found with email: {}", email)))
    }

    pub async fn list(&self) -> AppResult<Vec<UserProfile>> {
        Ok(self
            .store
            .list()
            .await?
            .into_iter()
            .map(UserProfile::from)
            .collect())
    }

    /// Users among `emails` that exist; unknown emails are left out.
    pub async fn get_batch(&self, emails: &[String]) -> AppResult<Vec<UserProfile>> {
        let mut found = Vec::with_capacity(emails.len());
        for email in emails {
            if let Some(user) = self.find_by_email(email).await? {
                found.push(user.into());
            }
        }
        Ok(found)
    }

    pub async fn update(&self, user_id: i64, request: RegistrationRequest) -> AppResult<SuccessResponse> {
        request.validate()?;
        let existing = self.load(user_id).await?;
        if existing.email != request.email && self.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Duplicate("User already exists".to_string()));
        }

        let record = self.to_record(user_id, request)?;
        self.store
            .update(record)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found with id: {}", user_id)))?;

        tracing::info!(user_id, "User updated");
        Ok(SuccessResponse::ok("User updated successfully"))
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<UserProfile> {
        request.validate()?;
        let failed = || AppError::AuthenticationFailed("Invalid email or password".to_string());

        let user = self.find_by_email(&request.email).await?.ok_or_else(failed)?;
        let matches = verify(&request.password, &user.password).context("Failed to verify password")?;
        if !matches {
            tracing::warn!(email = %request.email, "Login failed");
            return Err(failed());
        }

        tracing::info!(user_id = user.user_id, "User logged in");
        Ok(user.into())
    }
}
