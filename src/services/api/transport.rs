use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};

use super::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
}

impl Verb {
    pub fn is_mutating(self) -> bool {
        matches!(self, Verb::Post)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
        }
    }
}

/// A fully prepared request, ready to hit the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub verb: Verb,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// The seam between the sync client and the network.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: HttpRequest)
    -> impl Future<Output = Result<HttpResponse, SyncError>> + Send;
}

/// Same-origin HTTP transport backed by reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let base_url = Url::parse(base_url).map_err(|e| SyncError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(timeout)
            // Session cookie carries the login; the csrf header alone is not enough.
            .cookie_store(true)
            .build()?;

        Ok(Self { client, base_url })
    }

    fn resolve(&self, path: &str) -> Result<Url, SyncError> {
        self.base_url.join(path).map_err(|e| SyncError::InvalidUrl {
            url: path.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, SyncError> {
        let url = self.resolve(&request.path)?;

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SyncError::Unavailable(format!("bad header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| SyncError::Unavailable(format!("bad header value: {}", e)))?;
            headers.insert(name, value);
        }

        let builder = match request.verb {
            Verb::Get => self.client.get(url),
            Verb::Post => self.client.post(url),
        };
        let builder = builder.headers(headers);
        let builder = match request.body {
            Some(body) => builder.body(body),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}
