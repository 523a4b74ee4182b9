//! Request descriptor for Finam REST endpoints.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Serialize;

use crate::application::ports::ApiError;
use crate::domain::enums::WireEnum;
use crate::domain::timestamp::format_timestamp;

/// One Finam REST call: method, path, query, optional JSON body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    route: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    requires_auth: bool,
}

impl ApiRequest {
    /// Create a request for a static path such as `/v1/assets`.
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            method,
            route: format!("/{}", segments.join("/")),
            segments,
            query: Vec::new(),
            body: None,
            requires_auth: true,
        }
    }

    /// GET request.
    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request.
    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    /// DELETE request.
    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a dynamic path segment. Escaped when the URL is built.
    #[must_use]
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self.route.push_str("/{}");
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Add a timestamp query parameter in RFC 3339 UTC.
    #[must_use]
    pub fn query_timestamp(self, key: &str, value: &DateTime<Utc>) -> Self {
        self.query(key, format_timestamp(value))
    }

    /// Add an enum query parameter by its wire name.
    #[must_use]
    pub fn query_enum<E: WireEnum>(self, key: &str, value: E) -> Self {
        self.query(key, value.name())
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::validation("request body", e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Send without a session token.
    #[must_use]
    pub fn unauthenticated(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Unescaped path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Query parameters in insertion order.
    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// JSON body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Whether a session token is attached.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// Display path, e.g. `/v1/accounts/A1`.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Path with dynamic segments replaced by `{}`, for metric labels.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// `METHOD /route` for metric labels.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{} {}", self.method, self.route)
    }

    /// `METHOD /path` for logs and error context.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.path())
    }
}
