//! Shared HTTP plumbing for the platform APIs.
//!
//! [`ApiClient`] holds a base URL, a `reqwest` client, optional headers
//! (including the `api-key` header) and an optional per-request timeout.
//! The directory and price collaborators are thin wrappers around it.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use url::Url;

use crate::error::ApiClientError;

/// Header carrying the platform API key.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("api-key");

/// A configured client for one API base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    /// Base URL, always ending in `/` (e.g. `https://api.example/`).
    base_url: Url,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Custom headers sent with each request
    headers: HeaderMap,
    /// Optional request timeout
    timeout: Option<Duration>,
}

impl ApiClient {
    /// Constructs a client from a base URL.
    ///
    /// Relative paths are joined onto `base_url`, so it should end in `/`.
    /// Converting from a string normalizes that.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            client: Client::new(),
            headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Returns the base URL used by this client.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns any custom headers configured on the client.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Attaches custom headers to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sends `api_key` in the [`API_KEY_HEADER`] header of every request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHeaderValue`] if the key is not a valid header value.
    pub fn with_api_key(mut self, api_key: &str) -> Result<Self, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(api_key)?;
        value.set_sensitive(true);
        self.headers.insert(API_KEY_HEADER, value);
        Ok(self)
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Joins `path` onto the base URL, then appends each of `segments`
    /// percent-encoded as its own path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::UrlParse`] if the URL cannot be built.
    pub fn endpoint(
        &self,
        context: &'static str,
        path: &str,
        segments: &[&str],
    ) -> Result<Url, ApiClientError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|source| ApiClientError::UrlParse { context, source })?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| ApiClientError::UrlParse {
                    context,
                    source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
                })?
                .pop_if_empty()
                .extend(segments);
        }
        Ok(url)
    }

    /// Builds a `GET` request with headers and timeout applied.
    #[must_use]
    pub fn get(&self, url: Url) -> RequestBuilder {
        self.prepare(self.client.get(url))
    }

    /// Builds a `HEAD` request with headers and timeout applied.
    #[must_use]
    pub fn head(&self, url: Url) -> RequestBuilder {
        self.prepare(self.client.head(url))
    }

    fn prepare(&self, mut req: RequestBuilder) -> RequestBuilder {
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        req
    }

    /// Sends `req`, mapping transport failures.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Http`] if the request could not be sent.
    pub async fn send(
        req: RequestBuilder,
        context: &'static str,
    ) -> Result<Response, ApiClientError> {
        req.send()
            .await
            .map_err(|source| ApiClientError::Http { context, source })
    }

    /// Decodes a `200 OK` JSON body, or turns any other status into
    /// [`ApiClientError::HttpStatus`].
    ///
    /// # Errors
    ///
    /// See [`ApiClientError`].
    pub async fn json<R>(response: Response, context: &'static str) -> Result<R, ApiClientError>
    where
        R: serde::de::DeserializeOwned,
    {
        if response.status() == StatusCode::OK {
            response
                .json::<R>()
                .await
                .map_err(|source| ApiClientError::JsonDeserialization { context, source })
        } else {
            Err(Self::unexpected_status(response, context).await)
        }
    }

    /// Builds [`ApiClientError::HttpStatus`] from a response, reading its body.
    pub async fn unexpected_status(response: Response, context: &'static str) -> ApiClientError {
        let status = response.status();
        match response.text().await {
            Ok(body) => ApiClientError::HttpStatus {
                context,
                status,
                body,
            },
            Err(source) => ApiClientError::ResponseBodyRead { context, source },
        }
    }
}

/// Parses a base URL, normalizing it to a single trailing slash.
impl TryFrom<&str> for ApiClient {
    type Error = ApiClientError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut normalized = value.trim_end_matches('/').to_string();
        normalized.push('/');
        let url = Url::parse(&normalized).map_err(|e| ApiClientError::UrlParse {
            context: "Failed to parse base url",
            source: e,
        })?;
        Ok(Self::new(url))
    }
}

/// Converts a String URL into an `ApiClient`.
impl TryFrom<String> for ApiClient {
    type Error = ApiClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let client = ApiClient::try_from("https://api.example.com/v1//").unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/v1/");
        let client = ApiClient::try_from("https://api.example.com").unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/");
        assert!(ApiClient::try_from("not a url").is_err());
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = ApiClient::try_from("https://api.example.com/v1").unwrap();
        let url = client
            .endpoint("test", "users/username/", &["a b/c"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/users/username/a%20b%2Fc"
        );
        let url = client.endpoint("test", "token-price", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/token-price");
    }

    #[test]
    fn test_api_key_header() {
        let client = ApiClient::try_from("https://api.example.com")
            .unwrap()
            .with_api_key("secret")
            .unwrap()
            .with_timeout(Duration::from_secs(3));
        assert_eq!(client.headers().get(API_KEY_HEADER).unwrap(), "secret");
        assert_eq!(client.timeout(), Some(Duration::from_secs(3)));
        assert!(
            ApiClient::try_from("https://api.example.com")
                .unwrap()
                .with_api_key("bad\nkey")
                .is_err()
        );
    }
}
