use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::{RemoteError, ServiceResolver, DEFAULT_ERROR_MESSAGE};
use crate::metrics::REMOTE_CALLS_TOTAL;
use crate::middlewares::auth::ServiceToken;
use crate::middlewares::trace::{current_trace_id, TRACE_ID_HEADER};

/// Typed proxy for one peer service.
///
/// The peer is resolved on every call so address changes in the resolver are
/// picked up without rebuilding the client. Paths are given as segments and
/// each one is percent-encoded, so keys such as emails cannot leak into the
/// query or fragment. There is no retry and no timeout beyond what the
/// underlying `reqwest::Client` was built with.
#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    resolver: Arc<dyn ServiceResolver>,
    service: String,
    token: Option<Arc<ServiceToken>>,
}

impl RemoteClient {
    pub fn new(http: Client, resolver: Arc<dyn ServiceResolver>, service: impl Into<String>) -> Self {
        Self {
            http,
            resolver,
            service: service.into(),
            token: None,
        }
    }

    /// Sends the current service token as `Authorization: Bearer` on every call.
    pub fn with_service_token(mut self, token: Arc<ServiceToken>) -> Self {
        self.token = Some(token);
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, RemoteError> {
        self.call_json(Method::GET, path, &[]).await
    }

    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        self.call_json(Method::GET, path, query).await
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, RemoteError> {
        self.call_json(Method::DELETE, path, &[]).await
    }

    /// GET for endpoints that answer with a plain string body.
    pub async fn get_text(&self, path: &[&str], query: &[(&str, String)]) -> Result<String, RemoteError> {
        let bytes = self.call(Method::GET, path, query).await?;
        let text = String::from_utf8(bytes).map_err(|e| self.decode_error(e.to_string()))?;
        self.record("ok");
        Ok(text)
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let bytes = self.call(method, path, query).await?;
        let value = serde_json::from_slice(&bytes).map_err(|e| self.decode_error(e.to_string()))?;
        self.record("ok");
        Ok(value)
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn call(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<Vec<u8>, RemoteError> {
        let url = self.url(path).inspect_err(|e| self.record(e.outcome()))?;

        tracing::debug!(peer = %self.service, %method, %url, "Calling peer service");

        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.token {
            let bearer = token.current().map_err(|e| {
                let err = self.unavailable(format!("cannot issue service token: {}", e));
                self.record(err.outcome());
                err
            })?;
            request = request.bearer_auth(bearer);
        }
        if let Some(trace_id) = current_trace_id() {
            request = request.header(TRACE_ID_HEADER, trace_id);
        }

        let response = request.send().await.map_err(|e| {
            let err = self.unavailable(e.to_string());
            self.record(err.outcome());
            err
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            let err = self.unavailable(e.to_string());
            self.record(err.outcome());
            err
        })?;

        if status.is_success() {
            return Ok(body.to_vec());
        }

        let err = self.translate(status, &body);
        tracing::warn!(peer = %self.service, status = status.as_u16(), error = %err, "Peer call failed");
        self.record(err.outcome());
        Err(err)
    }

    /// 404 and 500 mean the peer looked and did not find what was asked for;
    /// any other failure status means the peer is not usable right now.
    fn translate(&self, status: StatusCode, body: &[u8]) -> RemoteError {
        if status == StatusCode::NOT_FOUND || status == StatusCode::INTERNAL_SERVER_ERROR {
            RemoteError::NotFound {
                service: self.service.clone(),
                message: extract_message(body),
            }
        } else {
            self.unavailable(format!("unexpected status {}", status))
        }
    }

    fn url(&self, path: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self
            .resolver
            .resolve(&self.service)
            .ok_or_else(|| self.unavailable("no address registered for this service".to_string()))?;
        url.path_segments_mut()
            .map_err(|_| self.unavailable("peer address cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    fn unavailable(&self, reason: String) -> RemoteError {
        RemoteError::Unavailable {
            service: self.service.clone(),
            reason,
        }
    }

    fn decode_error(&self, reason: String) -> RemoteError {
        let err = RemoteError::Decode {
            service: self.service.clone(),
            reason,
        };
        self.record(err.outcome());
        err
    }

    fn record(&self, outcome: &str) {
        REMOTE_CALLS_TOTAL
            .with_label_values(&[self.service.as_str(), outcome])
            .inc();
    }
}

/// Best-effort extraction of the `message` field of an error envelope.
pub(crate) fn extract_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message").map(|m| match m.as_str() {
                Some(s) => s.to_string(),
                None => m.to_string(),
            })
        })
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}
