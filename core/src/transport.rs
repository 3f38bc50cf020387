//! The network seam.
//!
//! `Transport` executes one `HttpRequest` and returns whatever the server
//! answered, whatever the status. Only failures that produce no response at
//! all are errors here; status interpretation belongs to the classifier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use tracing::debug;

use crate::error::TransportError;
use crate::http::{FormData, FormValue, HttpMethod, HttpRequest, HttpResponse, WireBody};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("portal-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Per-request timeout. Unset means the client's own policy applies.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn to_multipart(form: FormData) -> Result<Form, TransportError> {
        let mut multipart = Form::new();
        for (name, value) in form.fields {
            multipart = match value {
                FormValue::Text(text) => multipart.text(name, text),
                FormValue::File {
                    filename,
                    content_type,
                    bytes,
                } => {
                    let mut part = Part::bytes(bytes).file_name(filename);
                    if let Some(content_type) = content_type {
                        part = part
                            .mime_str(&content_type)
                            .map_err(|e| TransportError::Other(e.to_string()))?;
                    }
                    multipart.part(name, part)
                }
            };
        }
        Ok(multipart)
    }

    fn map_error(error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout;
        }
        if error.is_connect() {
            return TransportError::Connection(error.to_string());
        }
        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {}", request.url)))?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            None => builder,
            Some(WireBody::Text(text)) => builder.body(text),
            Some(WireBody::Bytes(bytes)) => builder.body(bytes),
            Some(WireBody::Form(form)) => builder.multipart(Self::to_multipart(form)?),
        };

        let response = builder.send().await.map_err(Self::map_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?
            .to_vec();

        debug!(status, bytes = body.len(), "response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
