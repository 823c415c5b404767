//! Client error types.

use std::fmt;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The request path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP exchange itself failed (connect, TLS, redirect loop, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A REST body or stream payload was not the JSON we expected.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Server answered with a non-2xx status.
    #[error("{0}")]
    Api(Box<ErrorResponse>),

    /// SSE framing or transport failure while streaming.
    #[error("Stream error: {0}")]
    Stream(String),

    /// OAuth exchange/refresh failed, or no usable token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Token cache I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status for API errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(resp) => Some(resp.status),
            Error::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_)) || self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Build a decode error for a required field that was absent.
    pub(crate) fn missing_field(field: &'static str) -> Self {
        Error::Decode(<serde_json::Error as serde::de::Error>::missing_field(field))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A non-2xx API response.
///
/// Keeps the raw body bytes; `message` and `errors` are only filled in when
/// the body happens to be the usual `{"message": ..., "errors": ...}` shape.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub url: Url,
    pub headers: HeaderMap,
    pub data: Vec<u8>,
    pub message: Option<String>,
    pub errors: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    errors: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, url: Url, headers: HeaderMap, data: Vec<u8>) -> Self {
        let (message, errors) = match serde_json::from_slice::<ErrorBody>(&data) {
            Ok(body) => (body.message, body.errors),
            Err(_) => (None, None),
        };

        Self {
            status,
            url,
            headers,
            data,
            message,
            errors,
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} for {}", self.status.as_u16(), self.url)?;
        match &self.message {
            Some(message) => write!(f, ": {}", message),
            None if !self.data.is_empty() => {
                write!(f, ": {}", String::from_utf8_lossy(&self.data).trim())
            }
            None => Ok(()),
        }
    }
}

impl From<ErrorResponse> for Error {
    fn from(resp: ErrorResponse) -> Self {
        Error::Api(Box::new(resp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://api.flowdock.com/flows").unwrap()
    }

    #[test]
    fn test_error_response_parses_message() {
        let body = br#"{"message":"m", "errors": [{"resource": "r", "field": "f", "code": "c"}]}"#;
        let resp = ErrorResponse::new(
            StatusCode::BAD_REQUEST,
            url(),
            HeaderMap::new(),
            body.to_vec(),
        );

        assert_eq!(resp.message.as_deref(), Some("m"));
        assert!(resp.errors.as_ref().unwrap().is_array());
        assert_eq!(resp.data, body.to_vec());
        assert_eq!(
            resp.to_string(),
            "HTTP 400 for https://api.flowdock.com/flows: m"
        );
    }

    #[test]
    fn test_error_response_unparseable_body() {
        let resp = ErrorResponse::new(
            StatusCode::BAD_REQUEST,
            url(),
            HeaderMap::new(),
            b"Bad Request\n".to_vec(),
        );

        assert!(resp.message.is_none());
        assert!(resp.to_string().ends_with(": Bad Request"));
    }

    #[test]
    fn test_error_response_no_body() {
        let resp = ErrorResponse::new(StatusCode::BAD_REQUEST, url(), HeaderMap::new(), vec![]);
        let err = Error::from(resp);

        assert!(!err.to_string().is_empty());
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_error_classification() {
        let not_found: Error =
            ErrorResponse::new(StatusCode::NOT_FOUND, url(), HeaderMap::new(), vec![]).into();
        assert!(not_found.is_not_found());
        assert!(!not_found.is_auth_error());

        let unauthorized: Error =
            ErrorResponse::new(StatusCode::UNAUTHORIZED, url(), HeaderMap::new(), vec![]).into();
        assert!(unauthorized.is_auth_error());

        assert!(Error::Auth("no token".into()).is_auth_error());
        assert!(matches!(Error::missing_field("event"), Error::Decode(_)));
    }
}
