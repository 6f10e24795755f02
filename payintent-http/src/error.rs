//! Error types for the HTTP collaborators.

use payintent::error::LookupError;
use reqwest::StatusCode;

/// Errors that can occur while talking to the platform APIs.
#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    /// A request URL could not be built.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Request being made, e.g. `GET /token-price`.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// The request failed before a response arrived (including timeouts).
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Request being made, e.g. `GET /token-price`.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// A `200` body was not the expected JSON.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Request being made, e.g. `GET /token-price`.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The API answered with a status the caller does not handle.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Request being made, e.g. `GET /token-price`.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// The body of an error response could not be read.
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        /// Request being made, e.g. `GET /token-price`.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The response decoded but does not carry a usable value.
    #[error("Invalid response: {context}: {message}")]
    InvalidBody {
        /// Request being made, e.g. `GET /token-price`.
        context: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

impl ApiClientError {
    /// Converts into the collaborator-level [`LookupError`], tagged with `service`.
    #[must_use]
    pub fn into_lookup_error(self, service: &'static str) -> LookupError {
        match &self {
            Self::Http { source, .. } if source.is_timeout() => LookupError::Timeout { service },
            Self::JsonDeserialization { .. } | Self::InvalidBody { .. } => {
                LookupError::invalid_response(service, self.to_string())
            }
            _ => LookupError::transport(service, self.to_string()),
        }
    }
}
