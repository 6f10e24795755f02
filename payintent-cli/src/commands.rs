//! Command execution.
//!
//! Every command builds the collaborators it needs from [`CliConfig`],
//! runs one core operation and returns its result as JSON.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use payintent::error::LookupError;
use payintent::intent::parse_payment_path;
use payintent::quote::{QuoteCalculator, QuoteInput, TokenRef};
use payintent::resolve::{
    Lookup, RecipientResolver, UserAccounts, UsernameDirectory, verify_username_exists,
};
use payintent::route::IntentRouter;
use payintent_evm::{EnsResolver, evm_network_registry};
use serde::Serialize;
use serde_json::Value;

use crate::cli::{Command, QuoteArgs};
use crate::config::CliConfig;
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteOutput {
    decision: payintent::route::RouteDecision,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UsernameOutput<'a> {
    username: &'a str,
    exists: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteOutput {
    from_token: TokenRef,
    to_token: TokenRef,
    to_amount: String,
    slippage_percentage: rust_decimal::Decimal,
    from_amount: String,
}

/// Answers every lookup with a transport error naming the missing setting.
///
/// Lets `resolve` handle addresses and names when no users API is configured.
#[derive(Debug, Clone, Copy)]
struct UnconfiguredDirectory;

impl UnconfiguredDirectory {
    fn error() -> LookupError {
        LookupError::transport("users", "api.users_base_url is not configured")
    }
}

#[async_trait]
impl UsernameDirectory for UnconfiguredDirectory {
    async fn user_accounts(&self, _username: &str) -> Result<Lookup<UserAccounts>, LookupError> {
        Err(Self::error())
    }

    async fn exists(&self, _username: &str) -> Result<bool, LookupError> {
        Err(Self::error())
    }
}

/// Runs `command` against `config`.
///
/// # Errors
///
/// Returns [`CliError`] if a collaborator cannot be built from the config or
/// the core operation fails.
pub async fn execute(command: Command, config: &CliConfig) -> Result<Value, CliError> {
    match command {
        Command::Route { segments, query } => route(&segments, query, config),
        Command::Parse { segments } => parse(&segments, config),
        Command::Resolve {
            identifier,
            withdrawal,
        } => resolve(&identifier, withdrawal, config).await,
        Command::CheckUsername { username } => check_username(&username, config).await,
        Command::Quote(args) => quote(args, config).await,
    }
}

fn route(
    segments: &[String],
    query: Vec<(String, String)>,
    config: &CliConfig,
) -> Result<Value, CliError> {
    let query: HashMap<String, String> = query.into_iter().collect();
    let decision = IntentRouter::from_config(&config.intent).route(segments, &query);
    tracing::debug!(%decision, "routed");
    Ok(serde_json::to_value(RouteOutput { decision })?)
}

fn parse(segments: &[String], config: &CliConfig) -> Result<Value, CliError> {
    let path = parse_payment_path(segments, &evm_network_registry(), &config.intent)?;
    Ok(serde_json::to_value(path)?)
}

async fn resolve(identifier: &str, withdrawal: bool, config: &CliConfig) -> Result<Value, CliError> {
    let names = EnsResolver::new(Arc::new(config.rpc_cache()?));
    let directory: Arc<dyn UsernameDirectory> = match config.users_directory() {
        Ok(directory) => Arc::new(directory),
        Err(CliError::MissingSetting(setting)) => {
            tracing::debug!(setting, "users API not configured");
            Arc::new(UnconfiguredDirectory)
        }
        Err(e) => return Err(e),
    };
    let resolver = RecipientResolver::from_config(names, directory, &config.intent);

    let resolved = if withdrawal {
        resolver.resolve_for_withdrawal(identifier).await?
    } else {
        resolver.resolve(identifier).await?
    };
    Ok(serde_json::to_value(resolved)?)
}

async fn check_username(username: &str, config: &CliConfig) -> Result<Value, CliError> {
    let directory = config.users_directory()?;
    let exists = verify_username_exists(&directory, username).await;
    Ok(serde_json::to_value(UsernameOutput { username, exists })?)
}

async fn quote(args: QuoteArgs, config: &CliConfig) -> Result<Value, CliError> {
    let registry = evm_network_registry();
    let input = QuoteInput {
        from_token: TokenRef {
            chain_id: registry.resolve_chain(&args.from_chain)?,
            address: args.from_token,
            decimals: args.from_decimals,
        },
        to_token: TokenRef {
            chain_id: registry.resolve_chain(&args.to_chain)?,
            address: args.to_token,
            decimals: args.to_decimals,
        },
        to_amount: args.amount,
        slippage_percentage: args
            .slippage
            .unwrap_or(config.intent.default_slippage_percentage),
    };

    let calculator = QuoteCalculator::from_config(config.price_source()?, &config.intent);
    let from_amount = calculator.try_compute_source_amount(&input).await?;
    Ok(serde_json::to_value(QuoteOutput {
        from_token: input.from_token,
        to_token: input.to_token,
        to_amount: input.to_amount,
        slippage_percentage: input.slippage_percentage,
        from_amount,
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use alloy_primitives::{Address, address};
    use payintent::error::ResolveError;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WALLET: &str = "0x1234567890123456789012345678901234567890";
    const USDC_ARB: Address = address!("af88d065e77c8cC2239327C5EDb3A432268e5831");

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn with_api(server: &MockServer) -> CliConfig {
        CliConfig {
            api: ApiConfig {
                users_base_url: Some(server.uri()),
                prices_base_url: Some(server.uri()),
                ..ApiConfig::default()
            },
            ..CliConfig::default()
        }
    }

    #[tokio::test]
    async fn test_route_command() {
        let config = CliConfig::default();
        let output = execute(
            Command::Route {
                segments: strings(&["alice"]),
                query: vec![("chargeId".into(), "ch_1".into())],
            },
            &config,
        )
        .await
        .unwrap();
        assert_eq!(output, json!({ "decision": "SEMANTIC_REQUEST" }));

        let output = execute(
            Command::Route {
                segments: strings(&["alice"]),
                query: vec![],
            },
            &config,
        )
        .await
        .unwrap();
        assert_eq!(output, json!({ "decision": "PUBLIC_PROFILE" }));
    }

    #[tokio::test]
    async fn test_parse_command() {
        let output = execute(
            Command::Parse {
                segments: strings(&["vitalik.eth@base", "10usdc"]),
            },
            &CliConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(output["recipient"], "vitalik.eth");
        assert_eq!(output["recipientType"], "ENS_NAME");
        assert_eq!(output["chain"], "8453");
        assert_eq!(output["amount"], "10");
        assert_eq!(output["token"], "usdc");

        let err = execute(
            Command::Parse {
                segments: strings(&["alice@nowhere"]),
            },
            &CliConfig::default(),
        )
        .await;
        assert!(matches!(err, Err(CliError::Intent(_))));
    }

    #[tokio::test]
    async fn test_resolve_address_needs_no_collaborators() {
        let output = execute(
            Command::Resolve {
                identifier: "0x1234567890123456789012345678901234567890".into(),
                withdrawal: false,
            },
            &CliConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(output["recipientType"], "ADDRESS");
        assert_eq!(output["resolvedAddress"], WALLET);
    }

    #[tokio::test]
    async fn test_resolve_username_without_users_api_is_transient() {
        let err = execute(
            Command::Resolve {
                identifier: "alice".into(),
                withdrawal: false,
            },
            &CliConfig::default(),
        )
        .await
        .unwrap_err();
        let CliError::Resolve(err) = err else {
            panic!("expected resolve error");
        };
        assert!(matches!(err, ResolveError::Transient { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_resolve_username_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/username/alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accounts": [{ "type": "peanut-wallet", "identifier": WALLET }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = execute(
            Command::Resolve {
                identifier: "alice".into(),
                withdrawal: false,
            },
            &with_api(&server),
        )
        .await
        .unwrap();
        assert_eq!(output["recipientType"], "USERNAME");
        assert_eq!(output["resolvedAddress"], WALLET);
    }

    #[tokio::test]
    async fn test_check_username() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/users/username/alice"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/users/username/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let config = with_api(&server);
        let found = execute(
            Command::CheckUsername {
                username: "alice".into(),
            },
            &config,
        )
        .await
        .unwrap();
        assert_eq!(found, json!({ "username": "alice", "exists": true }));

        let missing = execute(
            Command::CheckUsername {
                username: "ghost".into(),
            },
            &config,
        )
        .await
        .unwrap();
        assert_eq!(missing["exists"], false);

        assert!(matches!(
            execute(
                Command::CheckUsername {
                    username: "alice".into()
                },
                &CliConfig::default()
            )
            .await,
            Err(CliError::MissingSetting("api.users_base_url"))
        ));
    }

    #[tokio::test]
    async fn test_quote_command() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/token-price"))
            .and(query_param("chainId", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "price": "2000" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/token-price"))
            .and(query_param("chainId", "42161"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "price": 1 })))
            .mount(&server)
            .await;

        let args = QuoteArgs {
            from_chain: "mainnet".into(),
            from_token: Address::ZERO,
            from_decimals: 18,
            to_chain: "arbitrum".into(),
            to_token: USDC_ARB,
            to_decimals: 6,
            amount: "100".into(),
            slippage: None,
        };
        let output = execute(Command::Quote(args.clone()), &with_api(&server))
            .await
            .unwrap();
        assert_eq!(output["fromAmount"], "0.05025");
        assert_eq!(output["toToken"]["chainId"], "42161");

        let err = execute(
            Command::Quote(QuoteArgs {
                from_chain: "atlantis".into(),
                ..args
            }),
            &with_api(&server),
        )
        .await;
        assert!(matches!(err, Err(CliError::Chain(_))));
    }
}
