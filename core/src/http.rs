//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The client
//! builds `HttpRequest` values and classifies `HttpResponse` values; a
//! `Transport` implementation is the only piece that touches the network.
//! Keeping the wire shapes as owned data makes request building and response
//! classification deterministic and easy to test.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File {
        filename: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

/// Multipart form payload. The transport picks the boundary and sets the
/// matching `Content-Type`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub fields: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FormValue::Text(value.into())));
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.fields.push((
            name.into(),
            FormValue::File {
                filename: filename.into(),
                content_type,
                bytes,
            },
        ));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Request body as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireBody {
    /// Already-serialized JSON text.
    Text(String),
    Form(FormData),
    Bytes(Vec<u8>),
}

impl WireBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WireBody::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `build_request`. A `Transport` executes it and hands back the
/// corresponding `HttpResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<WireBody>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Shorthand for a response carrying `application/json`.
    pub fn json(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(
            status,
            vec![("content-type".to_string(), "application/json".to_string())],
            body,
        )
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse::new(
            200,
            vec![("Content-Type".to_string(), "text/plain".to_string())],
            "ok",
        );
        assert_eq!(response.content_type(), Some("text/plain"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(response.header("accept"), None);
    }

    #[test]
    fn success_range_is_2xx_only() {
        assert!(HttpResponse::new(200, Vec::new(), "").is_success());
        assert!(HttpResponse::new(299, Vec::new(), "").is_success());
        assert!(!HttpResponse::new(199, Vec::new(), "").is_success());
        assert!(!HttpResponse::new(300, Vec::new(), "").is_success());
        assert!(!HttpResponse::new(0, Vec::new(), "").is_success());
    }

    #[test]
    fn method_names_are_uppercase() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
    }

    #[test]
    fn form_builder_keeps_field_order() {
        let form = FormData::new()
            .text("title", "Report")
            .file("file", "a.pdf", Some("application/pdf".to_string()), vec![1, 2]);
        assert_eq!(form.fields.len(), 2);
        assert_eq!(form.fields[0].0, "title");
        assert!(matches!(form.fields[1].1, FormValue::File { .. }));
    }
}
