use std::sync::{Arc, RwLock};

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::remote::AuthPeer;

pub const SERVICE_ROLE: &str = "service";

/// Lifetime of the token a service presents to its peers.
pub const SERVICE_TOKEN_TTL_MINUTES: i64 = 30;

/// A cached service token is re-issued once it is this close to `exp`.
const SERVICE_TOKEN_REFRESH_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct JwtClaims {
    pub sub: String,  // email, or service name for service tokens
    pub role: String, // user, admin, service
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    ExpiredToken,
    #[error("Missing authorization token")]
    MissingToken,
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Failed to sign token")]
    Signing,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing => AppError::Internal(anyhow::anyhow!(err)),
            other => AppError::InvalidToken(other.to_string()),
        }
    }
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_minutes: i64,
}

impl JwtService {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_minutes,
        }
    }

    pub fn issue(&self, subject: &str, role: &str) -> Result<String, AuthError> {
        self.generate_token(&self.claims(subject, role))
    }

    fn claims(&self, subject: &str, role: &str) -> JwtClaims {
        let now = chrono::Utc::now().timestamp();
        JwtClaims {
            sub: subject.to_string(),
            role: role.to_string(),
            exp: (now + self.ttl_minutes * 60) as usize,
            iat: now as usize,
        }
    }

    pub fn generate_token(&self, claims: &JwtClaims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|_| AuthError::Signing)
    }

    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::InvalidToken,
            })
    }
}

/// Bearer token a service sends on its own calls to peers.
///
/// Its lifetime is [`SERVICE_TOKEN_TTL_MINUTES`] whatever the user token TTL
/// is, and [`ServiceToken::current`] re-issues it shortly before it expires,
/// so a long-running process keeps authenticating to its peers.
pub struct ServiceToken {
    jwt: JwtService,
    subject: String,
    cached: RwLock<Option<(String, i64)>>,
}

impl ServiceToken {
    pub fn new(secret: &str, subject: impl Into<String>) -> Self {
        Self {
            jwt: JwtService::new(secret, SERVICE_TOKEN_TTL_MINUTES),
            subject: subject.into(),
            cached: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        if let Ok(cached) = self.cached.read() {
            if let Some((token, exp)) = cached.as_ref() {
                if exp - now > SERVICE_TOKEN_REFRESH_SECS {
                    return Ok(token.clone());
                }
            }
        }

        let claims = self.jwt.claims(&self.subject, SERVICE_ROLE);
        let token = self.jwt.generate_token(&claims)?;
        tracing::debug!(subject = %self.subject, exp = claims.exp, "Issued service token");
        if let Ok(mut cached) = self.cached.write() {
            *cached = Some((token.clone(), claims.exp as i64));
        }
        Ok(token)
    }

    /// Replaces the cached token, e.g. with one that has already aged out.
    #[cfg(test)]
    pub(crate) fn with_cached(self, token: String, exp: i64) -> Self {
        if let Ok(mut cached) = self.cached.write() {
            *cached = Some((token, exp));
        }
        self
    }
}

/// How a service checks the bearer token of incoming requests.
pub enum TokenGate {
    Off,
    Local(Arc<JwtService>),
    Remote(Arc<dyn AuthPeer>),
}

impl TokenGate {
    pub async fn check(&self, token: Option<&str>) -> Result<(), AppError> {
        match self {
            TokenGate::Off => Ok(()),
            TokenGate::Local(jwt) => {
                let token = token.ok_or(AuthError::MissingToken)?;
                let claims = jwt.validate_token(token)?;
                tracing::debug!("Authenticated {} (role: {})", claims.sub, claims.role);
                Ok(())
            }
            TokenGate::Remote(auth) => {
                let token = token.ok_or(AuthError::MissingToken)?;
                auth.validate_token(token).await.map_err(|e| {
                    tracing::warn!(error = %e, "Auth service rejected token");
                    AppError::from(AuthError::InvalidToken)
                })
            }
        }
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Rejects requests without a token the gate accepts.
pub async fn auth_middleware(
    State(gate): State<Arc<TokenGate>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate.check(bearer(&headers)).await.inspect_err(|e| {
        tracing::warn!(path = %request.uri().path(), "Token check failed: {}", e);
    })?;
    Ok(next.run(request).await)
}
