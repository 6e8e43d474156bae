//! Error types for ESI client operations

use bytes::Bytes;
use serde::Deserialize;
use smol_str::SmolStr;

use crate::types::Id;

/// Client error type wrapping all possible error conditions
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ClientError {
    /// HTTP transport error
    #[error("HTTP transport error: {0}")]
    Transport(
        #[from]
        #[diagnostic_source]
        TransportError,
    ),

    /// Request serialization failed
    #[error("{0}")]
    Encode(
        #[from]
        #[diagnostic_source]
        EncodeError,
    ),

    /// Response deserialization failed
    #[error("{0}")]
    Decode(
        #[from]
        #[diagnostic_source]
        DecodeError,
    ),

    /// HTTP error response
    #[error("{0}")]
    Http(
        #[from]
        #[diagnostic_source]
        HttpError,
    ),

    /// A requested id had no matching element
    #[error("{0}")]
    NotFound(
        #[from]
        #[diagnostic_source]
        NotFound,
    ),
}

/// Result type for client operations
pub type EsiResult<T> = std::result::Result<T, ClientError>;

/// Raised when a requested id has no corresponding element in a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error, miette::Diagnostic)]
#[error("no element found for id {id}")]
#[diagnostic(
    code(esi::not_found),
    help("the id may not exist, or the source it was looked up in does not contain it")
)]
pub struct NotFound {
    /// The id that could not be matched
    pub id: Id,
}

impl NotFound {
    /// Create a new not-found error for `id`
    pub const fn new(id: Id) -> Self {
        Self { id }
    }
}

/// Transport-level errors that occur during HTTP communication
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TransportError {
    /// Failed to establish connection to server
    #[error("Connection error: {0}")]
    Connect(String),

    /// Request timed out
    #[error("Request timeout")]
    Timeout,

    /// Request construction failed (malformed URI, headers, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other transport error
    #[error("Transport error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() || e.is_request() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Other(Box::new(e))
        }
    }
}

/// Error type for encoding ESI requests
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EncodeError {
    /// Failed to serialize query parameters
    #[error("Failed to serialize query: {0}")]
    Query(
        #[from]
        #[source]
        serde_html_form::ser::Error,
    ),
    /// Failed to serialize JSON body
    #[error("Failed to serialize JSON: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
    /// Route path could not be joined onto the base URL
    #[error("Invalid URL: {0}")]
    Url(
        #[from]
        #[source]
        url::ParseError,
    ),
    /// A `{placeholder}` in the route path had no value
    #[error("Route {route} is missing path parameter `{name}`")]
    #[diagnostic(
        code(esi::missing_path_param),
        help("add the parameter with `RequestParams::path`")
    )]
    MissingPathParam {
        /// Route identifier
        route: &'static str,
        /// Placeholder name
        name: SmolStr,
    },
    /// Route path template is malformed
    #[error("Route {route} has an unterminated path placeholder")]
    #[diagnostic(code(esi::bad_route_template))]
    Template {
        /// Route identifier
        route: &'static str,
    },
}

/// Response deserialization errors
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DecodeError {
    /// JSON deserialization failed
    #[error("Failed to deserialize JSON: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
    /// A response header was present but unparseable
    #[error("Invalid `{name}` header: {value:?}")]
    #[diagnostic(code(esi::invalid_header))]
    Header {
        /// Header name
        name: &'static str,
        /// Raw header value
        value: String,
    },
}

/// HTTP error response (non-2xx status codes)
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub struct HttpError {
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response body if available
    pub body: Option<Bytes>,
}

#[derive(Deserialize)]
struct EsiErrorBody<'a> {
    #[serde(borrow)]
    error: std::borrow::Cow<'a, str>,
}

impl HttpError {
    /// The `error` message from an ESI error body, if the body has one
    pub fn message(&self) -> Option<String> {
        let body = self.body.as_ref()?;
        serde_json::from_slice::<EsiErrorBody<'_>>(body)
            .ok()
            .map(|b| b.error.into_owned())
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(message) = self.message() {
            write!(f, ": {}", message)?;
        } else if let Some(body) = &self.body {
            if let Ok(s) = std::str::from_utf8(body) {
                write!(f, ":\n{}", s)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_id() {
        let err = ClientError::from(NotFound::new(42));
        assert!(matches!(err, ClientError::NotFound(NotFound { id: 42 })));
        assert_eq!(err.to_string(), "no element found for id 42");
    }

    #[test]
    fn http_error_prefers_esi_message() {
        let err = HttpError {
            status: http::StatusCode::NOT_FOUND,
            body: Some(Bytes::from_static(br#"{"error":"Alliance not found"}"#)),
        };
        assert_eq!(err.message().as_deref(), Some("Alliance not found"));
        assert_eq!(err.to_string(), "HTTP 404 Not Found: Alliance not found");
    }

    #[test]
    fn http_error_falls_back_to_raw_body() {
        let err = HttpError {
            status: http::StatusCode::BAD_GATEWAY,
            body: Some(Bytes::from_static(b"upstream down")),
        };
        assert_eq!(err.message(), None);
        assert_eq!(err.to_string(), "HTTP 502 Bad Gateway:\nupstream down");
    }
}
