//! JSON request dispatch
//!
//! One envelope in, one decoded result out. The dispatcher knows nothing
//! about which operation it serves: callers pass the URL, the body and the
//! session token, and get back either the typed `data` of the service's
//! `{code, message, data}` envelope or the error that stopped the call.
//! No call is ever retried.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use ol_core::{Error, Result};

/// Business code the service uses for success
pub const SUCCESS_CODE: i64 = 200;

/// Business code treated as "target already exists"
const CONFLICT_CODE: i64 = 409;

/// A single request to send
///
/// Built once per call and never reused.
#[derive(Debug, Clone)]
pub struct RequestEnvelope<B = ()> {
    method: Method,
    url: String,
    body: Option<B>,
    headers: Vec<(String, String)>,
}

impl RequestEnvelope {
    /// A request without a body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: Vec::new(),
        }
    }
}

impl<B: Serialize> RequestEnvelope<B> {
    /// A POST with a JSON body
    pub fn post(url: impl Into<String>, body: B) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            body: Some(body),
            headers: Vec::new(),
        }
    }

    /// Add a header; it replaces any default header of the same name
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// The service's response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope<T = serde_json::Value> {
    pub code: i64,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub data: T,
}

impl<T> ResponseEnvelope<T> {
    /// Map a non-success business code to an error, or yield `data`
    pub fn into_result(self) -> Result<T> {
        match self.code {
            SUCCESS_CODE => Ok(self.data),
            CONFLICT_CODE => Err(Error::Conflict(self.message)),
            code => Err(Error::Api {
                code,
                message: self.message,
            }),
        }
    }
}

/// Decode a response body into the envelope's typed `data`.
///
/// The envelope is decoded loosely first so that a failure reply with a
/// `null` payload still surfaces its business code and message.
pub(crate) fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: ResponseEnvelope = serde_json::from_str(body).map_err(|e| Error::Decode {
        body: body.to_string(),
        reason: e.to_string(),
    })?;

    let data = envelope.into_result()?;
    serde_json::from_value(data).map_err(|e| Error::Decode {
        body: body.to_string(),
        reason: e.to_string(),
    })
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::Request(format!("invalid header value: {e}")))
}

/// Sends request envelopes over a shared HTTP client
#[derive(Debug, Clone)]
pub struct Dispatcher {
    http: Client,
}

impl Dispatcher {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Underlying HTTP client
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Send `envelope` once and decode the envelope's `data` as `T`.
    ///
    /// `token` is sent verbatim in `Authorization` when present. Use
    /// `serde::de::IgnoredAny` as `T` when the payload does not matter.
    pub async fn dispatch<B, T>(&self, envelope: &RequestEnvelope<B>, token: Option<&str>) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = envelope
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| Error::Serialize(e.to_string()))?;

        let url = Url::parse(&envelope.url)
            .map_err(|e| Error::Request(format!("invalid URL '{}': {e}", envelope.url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            headers.insert(AUTHORIZATION, header_value(token)?);
        }
        for (name, value) in &envelope.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Request(format!("invalid header name '{name}': {e}")))?;
            headers.insert(name, header_value(value)?);
        }

        let mut builder = self
            .http
            .request(envelope.method.clone(), url)
            .headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let request = builder.build().map_err(|e| Error::Request(e.to_string()))?;

        tracing::debug!(method = %request.method(), url = %request.url(), "Sending request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("failed to read response body: {e}")))?;

        tracing::debug!(status = status.as_u16(), url = %envelope.url, "Received response");

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        decode_envelope(&text)
    }
}
