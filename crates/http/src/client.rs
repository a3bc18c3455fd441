//! Blocking persist client.
//!
//! One call per edit: send the form payload with the configured verb, map
//! the status, parse the body. No retries; a failed edit stays editable and
//! the user retries by committing again.

use std::time::Duration;

use celledit_engine::TransportError;
use celledit_protocol::{EditResponse, HttpMethod, PersistRequest};

/// Persist client (blocking, no Tokio runtime required).
#[derive(Clone)]
pub struct EditClient {
    http: reqwest::blocking::Client,
}

impl EditClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("celledit/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { http })
    }

    /// Send one edit and wait for the server's answer.
    pub fn persist(&self, request: &PersistRequest) -> Result<EditResponse, TransportError> {
        let fields = request.payload.fields();
        let builder = match request.method {
            // GET has no body; the payload goes in the query string
            HttpMethod::Get => self.http.get(&request.endpoint).query(fields),
            HttpMethod::Post => self.http.post(&request.endpoint).form(fields),
            HttpMethod::Put => self.http.put(&request.endpoint).form(fields),
            HttpMethod::Patch => self.http.patch(&request.endpoint).form(fields),
            HttpMethod::Delete => self.http.delete(&request.endpoint).form(fields),
        };

        let response = builder.send().map_err(map_send_error)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::Http(status, body));
        }

        let body = response.text().map_err(map_send_error)?;
        parse_response(&body)
    }
}

impl std::fmt::Debug for EditClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditClient").finish_non_exhaustive()
    }
}

/// Parse a success body. An empty body, or JSON that is not an object,
/// carries no field errors and counts as a plain success.
pub fn parse_response(body: &str) -> Result<EditResponse, TransportError> {
    if body.trim().is_empty() {
        return Ok(EditResponse::ok());
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| TransportError::Parse(e.to_string()))?;
    if !value.is_object() {
        log::debug!("Non-object edit response treated as success");
        return Ok(EditResponse::ok());
    }
    serde_json::from_value(value).map_err(|e| TransportError::Parse(e.to_string()))
}

fn map_send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}
