use std::sync::Arc;

use anyhow::Context;
use bcrypt::{hash, verify, DEFAULT_COST};
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middlewares::auth::JwtService;
use crate::models::{Credential, CredentialRequest, SuccessResponse, TokenRequest};
use crate::store::ResourceStore;

pub const USER_ROLE: &str = "user";

pub struct AuthService {
    store: Arc<dyn ResourceStore<Credential>>,
    jwt_service: Arc<JwtService>,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn ResourceStore<Credential>>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            store,
            jwt_service,
            hash_cost: DEFAULT_COST,
        }
    }

    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    async fn find(&self, email_id: &str) -> AppResult<Option<Credential>> {
        Ok(self
            .store
            .find_by("emailId", json!(email_id))
            .await?
            .into_iter()
            .next())
    }

    pub async fn register(&self, request: CredentialRequest) -> AppResult<SuccessResponse> {
        request.validate()?;
        if self.find(&request.email_id).await?.is_some() {
            return Err(AppError::Duplicate("User already exists".to_string()));
        }

        let password = hash(&request.password, self.hash_cost).context("Failed to hash password")?;
        let saved = self
            .store
            .insert(Credential {
                id: 0,
                name: request.name,
                email_id: request.email_id,
                password,
            })
            .await?;

        tracing::info!(credential_id = saved.id, "Credential registered");
        Ok(SuccessResponse::created("User added to the system").with_id(saved.id))
    }

    /// Bearer token for valid credentials.
    pub async fn token(&self, request: TokenRequest) -> AppResult<String> {
        request.validate()?;
        let failed = || AppError::AuthenticationFailed("Invalid access".to_string());

        let credential = self.find(&request.email_id).await?.ok_or_else(failed)?;
        if !verify(&request.password, &credential.password).context("Failed to verify password")? {
            tracing::warn!(email = %request.email_id, "Token request with wrong password");
            return Err(failed());
        }

        Ok(self.jwt_service.issue(&credential.email_id, USER_ROLE)?)
    }

    pub fn validate(&self, token: &str) -> AppResult<&'static str> {
        self.jwt_service.validate_token(token)?;
        Ok("Token is valid")
    }
}
