//! [`PriceSource`] over the platform token-price API.

use alloy_primitives::Address;
use async_trait::async_trait;
use payintent::chain::ChainId;
use payintent::error::LookupError;
use payintent::quote::PriceSource;
use serde::Deserialize;
#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::client::ApiClient;
use crate::error::ApiClientError;

const SERVICE: &str = "prices";
const CONTEXT: &str = "GET /token-price";

#[derive(Debug, Deserialize)]
struct TokenPriceResponse {
    price: Option<serde_json::Value>,
}

/// USD prices from `GET {base}/token-price?tokenAddress=..&chainId=..`.
///
/// The API answers `{ "price": ... }` with the price as either a JSON string
/// or a JSON number; both are returned as a decimal string.
#[derive(Clone, Debug)]
pub struct HttpPriceSource {
    client: ApiClient,
}

impl HttpPriceSource {
    /// Creates a price source over `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetches the USD price of one whole `token` on `chain_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError`] on transport failures, unexpected statuses
    /// or a body without a usable price.
    pub async fn fetch_price(
        &self,
        token: Address,
        chain_id: ChainId,
    ) -> Result<String, ApiClientError> {
        let mut url = self.client.endpoint(CONTEXT, "token-price", &[])?;
        url.query_pairs_mut()
            .append_pair("tokenAddress", &format!("{token:#x}"))
            .append_pair("chainId", &chain_id.to_string());

        let response = ApiClient::send(self.client.get(url), CONTEXT).await?;
        let body: TokenPriceResponse = ApiClient::json(response, CONTEXT).await?;
        match body.price {
            Some(serde_json::Value::String(price)) if !price.trim().is_empty() => {
                Ok(price.trim().to_owned())
            }
            Some(serde_json::Value::Number(price)) => Ok(price.to_string()),
            other => Err(ApiClientError::InvalidBody {
                context: CONTEXT,
                message: format!("unusable price {other:?}"),
            }),
        }
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "payintent_http.token_price", skip(self), err)
    )]
    async fn unit_price_usd(
        &self,
        token: Address,
        chain_id: ChainId,
    ) -> Result<String, LookupError> {
        self.fetch_price(token, chain_id)
            .await
            .map_err(|e| e.into_lookup_error(SERVICE))
    }
}
