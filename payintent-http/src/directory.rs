//! [`UsernameDirectory`] over the platform users API.
//!
//! - `GET {base}/users/username/{username}` returns the user's accounts
//! - `HEAD {base}/users/username/{username}` is the cheap existence check
//!
//! `404` is "no such user" on both; any other non-success status is a
//! transport failure.

use async_trait::async_trait;
use payintent::error::LookupError;
use payintent::resolve::{Lookup, UserAccounts, UsernameDirectory};
use reqwest::StatusCode;
#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::client::ApiClient;
use crate::error::ApiClientError;

const SERVICE: &str = "users";
const USERS_PATH: &str = "users/username/";

/// Username directory backed by the platform users API.
#[derive(Clone, Debug)]
pub struct HttpUsernameDirectory {
    client: ApiClient,
}

impl HttpUsernameDirectory {
    /// Creates a directory over `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Returns the underlying API client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Fetches a user's accounts; `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError`] on transport failures and unexpected statuses.
    pub async fn fetch_accounts(
        &self,
        username: &str,
    ) -> Result<Option<UserAccounts>, ApiClientError> {
        const CONTEXT: &str = "GET /users/username";
        let url = self.client.endpoint(CONTEXT, USERS_PATH, &[username])?;
        let response = ApiClient::send(self.client.get(url), CONTEXT).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        ApiClient::json(response, CONTEXT).await.map(Some)
    }

    /// Checks whether a user exists without fetching the profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError`] on transport failures and statuses other
    /// than `200`/`404`.
    pub async fn head_username(&self, username: &str) -> Result<bool, ApiClientError> {
        const CONTEXT: &str = "HEAD /users/username";
        let url = self.client.endpoint(CONTEXT, USERS_PATH, &[username])?;
        let response = ApiClient::send(self.client.head(url), CONTEXT).await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(ApiClient::unexpected_status(response, CONTEXT).await),
        }
    }
}

#[async_trait]
impl UsernameDirectory for HttpUsernameDirectory {
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "payintent_http.user_accounts", skip(self), err)
    )]
    async fn user_accounts(&self, username: &str) -> Result<Lookup<UserAccounts>, LookupError> {
        self.fetch_accounts(username)
            .await
            .map(Lookup::from)
            .map_err(|e| e.into_lookup_error(SERVICE))
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "payintent_http.user_exists", skip(self), err)
    )]
    async fn exists(&self, username: &str) -> Result<bool, LookupError> {
        self.head_username(username)
            .await
            .map_err(|e| e.into_lookup_error(SERVICE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payintent::resolve::UserAccount;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn directory(server: &MockServer) -> HttpUsernameDirectory {
        HttpUsernameDirectory::new(ApiClient::try_from(server.uri()).unwrap())
    }

    #[tokio::test]
    async fn test_user_accounts_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/username/kusharc"))
            .and(header("api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "username": "kusharc",
                "accounts": [
                    {"type": "iban", "identifier": "DE89370400440532013000"},
                    {"type": "peanut-wallet", "identifier": "0x1234567890123456789012345678901234567890"},
                ],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let directory = HttpUsernameDirectory::new(
            ApiClient::try_from(server.uri())
                .unwrap()
                .with_api_key("secret")
                .unwrap(),
        );
        let Lookup::Found(accounts) = directory.user_accounts("kusharc").await.unwrap() else {
            panic!("expected accounts");
        };
        assert_eq!(accounts.accounts.len(), 2);
        assert_eq!(
            accounts.accounts[1],
            UserAccount {
                account_type: "peanut-wallet".into(),
                identifier: "0x1234567890123456789012345678901234567890".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_user_accounts_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/username/nobody"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = directory(&server).user_accounts("nobody").await.unwrap();
        assert_eq!(result, Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_user_accounts_server_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = directory(&server).user_accounts("alice").await.unwrap_err();
        assert!(matches!(err, LookupError::Transport { service: "users", .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_user_accounts_bad_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = directory(&server).user_accounts("alice").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_user_accounts_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accounts": []}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let directory = HttpUsernameDirectory::new(
            ApiClient::try_from(server.uri())
                .unwrap()
                .with_timeout(Duration::from_millis(50)),
        );
        let err = directory.user_accounts("alice").await.unwrap_err();
        assert_eq!(err, LookupError::Timeout { service: "users" });
    }

    #[tokio::test]
    async fn test_exists_uses_head() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/users/username/alice"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/users/username/bob"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/users/username/carol"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let directory = directory(&server);
        assert!(directory.exists("alice").await.unwrap());
        assert!(!directory.exists("bob").await.unwrap());
        assert!(directory.exists("carol").await.is_err());
        assert!(!payintent::resolve::verify_username_exists(&directory, "carol").await);
    }
}
