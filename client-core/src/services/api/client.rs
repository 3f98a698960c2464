//! # Request Gateway
//!
//! The single chokepoint for outbound backend calls. Attaches the bearer
//! token (re-read from the session store on every call, so logout takes
//! effect on the next request), decodes the uniform response envelope, and
//! classifies failures: no response at all is a network error, a failure
//! envelope is an API error, and an authentication rejection clears the
//! session, flushes the cache, and tears down telemetry before surfacing a
//! re-authentication requirement to the caller.
//!
//! The gateway performs no retries and serves no fallback data; retry
//! policy, if any, belongs to the caller. Every call outcome, success or
//! failure, is forwarded exactly once to the feedback sink.

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::dto::envelope::Envelope;

use crate::cache::ResourceCache;
use crate::config::CoreConfig;
use crate::core::error::{CoreError, Result};
use crate::core::service::FeedbackSink;
use crate::services::telemetry::TelemetryChannel;
use crate::session::SessionStore;

/// Message shown when no response was received at all.
const CONNECTIVITY_MESSAGE: &str = "Network error";

/// File attachment for multipart endpoints (order photo).
#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

struct GatewayInner {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    cache: ResourceCache,
    telemetry: TelemetryChannel,
    feedback: Arc<dyn FeedbackSink>,
}

/// Cheap-to-clone gateway handle; clones share the connection pool.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

impl Gateway {
    pub fn new(
        config: &CoreConfig,
        session: Arc<SessionStore>,
        cache: ResourceCache,
        telemetry: TelemetryChannel,
        feedback: Arc<dyn FeedbackSink>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            inner: Arc::new(GatewayInner {
                http,
                base_url: config.api_base_url.clone(),
                session,
                cache,
                telemetry,
                feedback,
            }),
        }
    }

    /// GET expecting a result payload.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.request(Method::GET, path);
        require_result(self.dispatch(path, request).await?, path)
    }

    /// POST a JSON body, expecting a result payload.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(body);
        require_result(self.dispatch(path, request).await?, path)
    }

    /// Body-less POST expecting a result payload (e.g. mark-done).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.request(Method::POST, path);
        require_result(self.dispatch(path, request).await?, path)
    }

    /// Body-less POST where an absent result is a valid success.
    pub async fn post_unit(&self, path: &str) -> Result<()> {
        let request = self.request(Method::POST, path);
        self.dispatch::<Value>(path, request).await.map(|_| ())
    }

    /// DELETE; an absent result is a valid success.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self.request(Method::DELETE, path);
        self.dispatch::<Value>(path, request).await.map(|_| ())
    }

    /// Multipart POST with a JSON-encoded `request` part and an optional
    /// `file` part. Only the order-creation endpoint uses this shape.
    pub async fn post_multipart<B, T>(
        &self,
        path: &str,
        body: &B,
        file: Option<FilePart>,
    ) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let json = serde_json::to_string(body)
            .map_err(|e| CoreError::Validation(format!("encode request part: {e}")))?;
        let request_part = Part::text(json)
            .mime_str("application/json")
            .map_err(|e| CoreError::Validation(format!("request part: {e}")))?;
        let mut form = Form::new().part("request", request_part);
        if let Some(file) = file {
            let file_part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.mime)
                .map_err(|e| CoreError::Validation(format!("file part: {e}")))?;
            form = form.part("file", file_part);
        }
        let request = self.request(Method::POST, path).multipart(form);
        require_result(self.dispatch(path, request).await?, path)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.inner.base_url, path);
        let mut request = self.inner.http.request(method, url);
        // Re-read on every call; never cached locally.
        if let Some(token) = self.inner.session.token() {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(path, error = %e, "no response from backend");
                self.inner.feedback.error(CONNECTIVITY_MESSAGE);
                return Err(CoreError::Network(e.to_string()));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(path, error = %e, "response body unreadable");
                self.inner.feedback.error(CONNECTIVITY_MESSAGE);
                return Err(CoreError::Network(e.to_string()));
            }
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = rejection_message(&body);
            tracing::warn!(path, status = status.as_u16(), "authentication rejected");
            self.expire_session();
            self.inner.feedback.error(&message);
            return Err(CoreError::AuthExpired);
        }

        match decode_envelope::<T>(status, &body) {
            Ok(envelope) => {
                tracing::debug!(path, "call succeeded");
                self.inner.feedback.success(&envelope.message);
                Ok(envelope)
            }
            Err(CoreError::Api(message)) => {
                tracing::warn!(path, status = status.as_u16(), message = %message, "call failed");
                self.inner.feedback.error(&message);
                Err(CoreError::Api(message))
            }
            Err(other) => Err(other),
        }
    }

    /// Forced sign-out on authentication rejection: role-scoped resources
    /// must not survive the identity they were fetched under.
    fn expire_session(&self) {
        if let Err(e) = self.inner.session.clear_session() {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
        self.inner.cache.flush();
        self.inner.telemetry.shutdown();
    }
}

/// Decode a response body into an envelope and classify it. Pure, so the
/// network-vs-API-vs-parse split is defined (and tested) in one place.
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<Envelope<T>> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| CoreError::Api(format!("failed to parse response: {e}")))?;
    if !envelope.success || !status.is_success() {
        return Err(CoreError::Api(envelope.message));
    }
    Ok(envelope)
}

/// Best-effort server message for an auth rejection body.
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<Envelope<Value>>(body)
        .map(|envelope| envelope.message)
        .unwrap_or_else(|_| "Session expired".to_string())
}

fn require_result<T>(envelope: Envelope<T>, path: &str) -> Result<T> {
    envelope
        .result
        .ok_or_else(|| CoreError::Api(format!("response for {path} carried no result")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ========== Envelope Classification ==========

    #[test]
    fn test_decode_success_envelope() {
        let body = json!({
            "message": "Get orders successfully",
            "result": [{"id": "o1"}],
            "success": true
        })
        .to_string();

        let envelope: Envelope<Value> = decode_envelope(StatusCode::OK, &body).unwrap();
        assert_eq!(envelope.message, "Get orders successfully");
        assert_eq!(envelope.result, Some(json!([{"id": "o1"}])));
    }

    #[test]
    fn test_decode_success_without_result() {
        let body = json!({
            "message": "Delete depot successfully",
            "success": true
        })
        .to_string();

        let envelope: Envelope<Value> = decode_envelope(StatusCode::OK, &body).unwrap();
        assert_eq!(envelope.result, None);
    }

    #[test]
    fn test_failure_envelope_carries_server_message() {
        let body = json!({
            "message": "Order already completed",
            "result": null,
            "success": false
        })
        .to_string();

        let result = decode_envelope::<Value>(StatusCode::OK, &body);
        assert_eq!(
            result.unwrap_err(),
            CoreError::Api("Order already completed".to_string())
        );
    }

    #[test]
    fn test_error_status_with_success_body_is_still_an_error() {
        let body = json!({
            "message": "oops",
            "result": null,
            "success": true
        })
        .to_string();

        let result = decode_envelope::<Value>(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert_eq!(result.unwrap_err(), CoreError::Api("oops".to_string()));
    }

    #[test]
    fn test_unparseable_body_is_an_api_error() {
        let result = decode_envelope::<Value>(StatusCode::OK, "<html>bad gateway</html>");
        assert!(matches!(result.unwrap_err(), CoreError::Api(_)));
    }

    #[test]
    fn test_rejection_message_falls_back() {
        let with_envelope = json!({
            "message": "Token expired",
            "success": false
        })
        .to_string();
        assert_eq!(rejection_message(&with_envelope), "Token expired");
        assert_eq!(rejection_message("401 Unauthorized"), "Session expired");
    }

    #[test]
    fn test_require_result_rejects_missing_payload() {
        let envelope: Envelope<Value> = Envelope::success("ok", None);
        assert!(matches!(
            require_result(envelope, "/orders").unwrap_err(),
            CoreError::Api(_)
        ));
    }
}
