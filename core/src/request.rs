//! Request descriptors and the pure request builder.
//!
//! `ApiRequest` is what application code hands to the client. `build_request`
//! turns it into a wire-level `HttpRequest`: the URL is resolved against the
//! configured base, default headers are merged with the caller's, and the
//! body is encoded according to its tag.

use serde::Serialize;

use crate::error::ApiError;
use crate::http::{FormData, HttpMethod, HttpRequest, WireBody};

/// Body of an outgoing request. The caller picks the encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    None,
    Json(serde_json::Value),
    Form(FormData),
    Raw(Vec<u8>),
}

/// A request as application code describes it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
    pub requires_auth: bool,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::None,
            headers: Vec::new(),
            requires_auth: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attach a JSON body. Fails only if `value` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(value).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn form(mut self, form: FormData) -> Self {
        self.body = RequestBody::Form(form);
        self
    }

    pub fn raw(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = RequestBody::Raw(bytes.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Mark the request as needing the stored bearer token.
    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }
}

/// Join `base` and `path` with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_url(base: &str, path: &str) -> String {
    if path.starts_with("http") {
        path.to_string()
    } else {
        join_url(base, path)
    }
}

/// Build the wire request for `request`.
///
/// `token` is only consulted when the request requires auth; a missing token
/// is not an error, the request simply goes out without `Authorization`.
pub fn build_request(
    base_url: &str,
    request: &ApiRequest,
    token: Option<&str>,
) -> Result<HttpRequest, ApiError> {
    let mut headers = vec![("Accept".to_string(), "application/json".to_string())];

    for (name, value) in &request.headers {
        set_header(&mut headers, name, value);
    }

    // Content type and credentials are owned by the builder; callers cannot
    // override them.
    if matches!(request.body, RequestBody::Json(_)) {
        set_header(&mut headers, "Content-Type", "application/json");
    }

    if request.requires_auth {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            set_header(&mut headers, "Authorization", &format!("Bearer {token}"));
        }
    }

    let body = match &request.body {
        RequestBody::None => None,
        RequestBody::Json(value) => Some(WireBody::Text(
            serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))?,
        )),
        RequestBody::Form(form) => Some(WireBody::Form(form.clone())),
        RequestBody::Raw(bytes) => Some(WireBody::Bytes(bytes.clone())),
    };

    Ok(HttpRequest {
        method: request.method,
        url: resolve_url(base_url, &request.path),
        headers,
        body,
    })
}

/// Insert or replace a header, matching names case-insensitively.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
        Some(slot) => *slot = (name.to_string(), value.to_string()),
        None => headers.push((name.to_string(), value.to_string())),
    }
}
