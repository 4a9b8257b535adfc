//! Request gateway: the one HTTP client every API call goes through.
//!
//! The gateway is bound to a single base URL and timeout. It attaches the
//! session's bearer token when there is one, sends the request, and hands
//! whatever happened to the [`ResponsePolicy`].

use std::sync::Arc;

use reqwest::Method;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use teamall_core::Envelope;
use tracing::instrument;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::policy::{Outcome, ResponsePolicy};

/// One outbound call, relative to the gateway's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<std::result::Result<Value, String>>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append every field of a JSON object as a query parameter. Nulls are
    /// skipped; strings are sent without quotes.
    #[must_use]
    pub fn query_object(mut self, params: &Value) -> Self {
        if let Some(map) = params.as_object() {
            for (key, value) in map {
                match value {
                    Value::Null => {}
                    Value::String(s) => self.query.push((key.clone(), s.clone())),
                    other => self.query.push((key.clone(), other.to_string())),
                }
            }
        }
        self
    }

    /// Send `body` as JSON. A body that cannot be serialized makes the
    /// request malformed.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_value(body).map_err(|e| e.to_string()));
        self
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// The storefront's HTTP egress.
#[derive(Clone)]
pub struct RequestGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    client: reqwest::Client,
    base_url: Url,
    policy: ResponsePolicy,
}

impl RequestGateway {
    /// Build the gateway for `config`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::RequestConfig` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, policy: ResponsePolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::RequestConfig(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(GatewayInner {
                client,
                base_url: config.base_url.clone(),
                policy,
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Send `request` and return the raw success envelope.
    ///
    /// # Errors
    ///
    /// Any non-success outcome, after the policy has carried out its side
    /// effects (notice, logout, redirect).
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: ApiRequest) -> Result<Envelope> {
        let outcome = self.dispatch(request).await;
        self.inner.policy.apply(outcome)
    }

    /// Send `request` and decode the envelope's `data` as `T`.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send), plus `ClientError::Decode` if `data` has the
    /// wrong shape.
    pub async fn send_as<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Envelope<T>> {
        Ok(self.send(request).await?.decode()?)
    }

    async fn dispatch(&self, request: ApiRequest) -> Outcome {
        let url = match self.endpoint(&request.path) {
            Ok(url) => url,
            Err(detail) => return Outcome::RequestMalformed { detail },
        };

        let mut builder = self.inner.client.request(request.method, url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        match request.body {
            Some(Ok(body)) => builder = builder.json(&body),
            Some(Err(detail)) => return Outcome::RequestMalformed { detail },
            None => {}
        }
        if let Some(token) = self.inner.policy.bearer_token() {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Outcome::from_send_error(&e),
        };

        let status = response.status();
        tracing::debug!(status = %status, "Response received");
        match response.text().await {
            Ok(body) => Outcome::from_response(status, &body),
            Err(e) => Outcome::from_send_error(&e),
        }
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, String> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}")).map_err(|e| format!("invalid endpoint {path}: {e}"))
    }
}
