//! Executing `HttpRequest`s.
//!
//! `Transport` is the single I/O seam: controllers and `ResourceApi` are
//! generic over it, tests can script it, and `UreqTransport` talks to a real
//! server. Crate code goes through [`send`] so every round-trip is logged
//! the same way.

use std::fmt;
use std::io::Read;

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    /// Perform one round-trip. Non-2xx statuses are returned as data; only
    /// failures to obtain a response are errors.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Execute one request, logging it and any failure status.
pub(crate) fn send<T: Transport + ?Sized>(
    transport: &T,
    request: &HttpRequest,
) -> Result<HttpResponse, ApiError> {
    debug!(method = %request.method, url = %request.url, "sending request");
    match transport.execute(request) {
        Ok(response) => {
            if !response.is_success() {
                warn!(
                    method = %request.method,
                    url = %request.url,
                    status = response.status,
                    "request failed"
                );
            }
            Ok(response)
        }
        Err(e) => {
            warn!(method = %request.method, url = %request.url, error = %e, "transport error");
            Err(e)
        }
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// Status-as-error is disabled so 4xx/5xx responses reach the client's
/// parse methods. No timeouts beyond ureq's defaults, no retries.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.as_str();
        let body = request.body.as_deref();

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Delete => {
                let mut builder = self.agent.delete(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Patch => {
                let mut builder = if request.method == HttpMethod::Post {
                    self.agent.post(url)
                } else {
                    self.agent.patch(url)
                };
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let mut bytes = Vec::new();
        response
            .body_mut()
            .as_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body: bytes,
        })
    }
}
