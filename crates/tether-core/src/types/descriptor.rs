//! Per-call request descriptor.

use serde::Serialize;

use crate::error::{Error, InvalidInputError};

use super::Method;

/// Everything the pipeline needs to issue one logical call.
///
/// A descriptor is built per call and never persisted. All fields are fixed
/// once built, except the attempt counter, which the pipeline advances on
/// each backoff retry.
///
/// # Example
///
/// ```
/// use tether_core::{Method, RequestDescriptor};
///
/// let req = RequestDescriptor::post("/boards")
///     .body(serde_json::json!({ "title": "hello" }))
///     .header("X-Board", "free");
/// assert_eq!(req.method(), Method::Post);
/// assert!(req.requires_auth());
/// assert_eq!(req.attempt(), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    path: String,
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    requires_auth: bool,
    attempt: u32,
}

impl RequestDescriptor {
    /// Create a descriptor for an authenticated call with no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: Vec::new(),
            body: None,
            requires_auth: true,
            attempt: 0,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Add a caller-supplied header. A later header with the same name
    /// (case-insensitive) replaces an earlier one.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Set the JSON body.
    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize a value as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, Error> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Body {
            reason: e.to_string(),
        })?;
        Ok(self.body(value))
    }

    /// Mark the call as not requiring an access token.
    pub fn without_auth(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body_value(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// Number of backoff retries already spent on this call.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Advance the attempt counter before a backoff retry.
    pub fn record_retry(&mut self) {
        self.attempt += 1;
    }
}
