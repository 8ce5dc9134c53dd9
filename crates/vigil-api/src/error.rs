use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("{param} is reserved for internal pagination of {resource}")]
    ReservedParam { resource: String, param: String },

    #[error("unexpected response for {path}: {detail}")]
    UnexpectedResponse { path: String, detail: String },

    #[error("invalid URL {url}: {detail}")]
    InvalidUrl { url: String, detail: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A remote call that failed for good: transport error after retries or a
/// non-2xx status that is not tolerated.
#[derive(Debug, Error)]
pub struct RequestError {
    pub method: String,
    /// Path including query string, e.g. `/api/v1/slo?limit=1000&offset=0`.
    pub path: String,
    /// Pretty-printed request body, if any was sent.
    pub request: Option<String>,
    /// `None` when no response was received.
    pub status: Option<u16>,
    /// Response body, or the transport error when there was no response.
    pub response: String,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.status {
            Some(status) => writeln!(f, "Error {status} during {} {}", self.method, self.path)?,
            None => writeln!(f, "Error during {} {}", self.method, self.path)?,
        }
        if let Some(request) = &self.request {
            write!(f, "request:\n{request}\nresponse:\n")?;
        }
        f.write_str(&self.response)
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
