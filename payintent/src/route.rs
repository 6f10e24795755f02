//! Flow routing for shared payment paths.
//!
//! A single synchronous decision step maps raw path segments plus query
//! parameters to exactly one [`RouteDecision`]. Rules are evaluated in order
//! and the first match wins:
//!
//! 1. non-empty `id` query parameter: [`RouteDecision::PotContribution`]
//! 2. no path segments: [`RouteDecision::None`]
//! 3. non-empty `chargeId` query parameter: [`RouteDecision::SemanticRequest`]
//! 4. first segment's base identifier is an address or name: [`RouteDecision::SemanticRequest`]
//! 5. several segments, or a `@chain` qualifier: [`RouteDecision::SemanticRequest`]
//! 6. anything else: [`RouteDecision::PublicProfile`]
//!
//! [`RouteDecision::DirectSend`] is never produced here; it is entered from
//! the public profile flow on explicit user action.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};

use crate::config::IntentConfig;
use crate::recipient::{RecipientClassifier, RecipientKind};

/// Query parameter naming a shared pot.
pub const POT_ID_PARAM: &str = "id";

/// Query parameter naming an existing charge.
pub const CHARGE_ID_PARAM: &str = "chargeId";

/// Downstream flow that should handle an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteDecision {
    /// Contribute to a shared pot.
    PotContribution,
    /// Pay or create a request described by the path.
    SemanticRequest,
    /// Send directly to a resolved address.
    DirectSend,
    /// Show a user's public profile.
    PublicProfile,
    /// Nothing to route.
    None,
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PotContribution => "POT_CONTRIBUTION",
            Self::SemanticRequest => "SEMANTIC_REQUEST",
            Self::DirectSend => "DIRECT_SEND",
            Self::PublicProfile => "PUBLIC_PROFILE",
            Self::None => "NONE",
        })
    }
}

/// Path segments and query parameters of a shared link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIntentInput {
    /// Percent-decoded path segments.
    pub segments: Vec<String>,
    /// Query parameters.
    pub query: HashMap<String, String>,
}

impl RawIntentInput {
    /// Creates an input from segments and query pairs.
    #[must_use]
    pub fn new<S, Q, K, V>(segments: S, query: Q) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        Q: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query: query
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Routes raw intents using a [`RecipientClassifier`].
#[derive(Debug, Clone, Default)]
pub struct IntentRouter {
    classifier: RecipientClassifier,
}

impl IntentRouter {
    /// Creates a router around `classifier`.
    #[must_use]
    pub const fn new(classifier: RecipientClassifier) -> Self {
        Self { classifier }
    }

    /// Creates a router from an [`IntentConfig`].
    #[must_use]
    pub fn from_config(config: &IntentConfig) -> Self {
        Self::new(RecipientClassifier::from_config(config))
    }

    /// Picks the flow for `input`. Never fails.
    #[must_use]
    pub fn route_input(&self, input: &RawIntentInput) -> RouteDecision {
        self.route(&input.segments, &input.query)
    }

    /// Picks the flow for `segments` and `query`. Never fails.
    #[must_use]
    pub fn route<S: AsRef<str>, H: BuildHasher>(
        &self,
        segments: &[S],
        query: &HashMap<String, String, H>,
    ) -> RouteDecision {
        let has_param = |name: &str| query.get(name).is_some_and(|v| !v.is_empty());

        if has_param(POT_ID_PARAM) {
            return RouteDecision::PotContribution;
        }
        let Some(first) = segments.first().map(AsRef::as_ref) else {
            return RouteDecision::None;
        };
        if has_param(CHARGE_ID_PARAM) {
            return RouteDecision::SemanticRequest;
        }

        let (base, qualifier) = match first.split_once('@') {
            Some((base, _)) => (base, true),
            None => (first, false),
        };
        if matches!(
            self.classifier.classify(base),
            RecipientKind::Address | RecipientKind::EnsName
        ) {
            return RouteDecision::SemanticRequest;
        }
        if segments.len() > 1 || qualifier {
            return RouteDecision::SemanticRequest;
        }
        RouteDecision::PublicProfile
    }
}

/// Routes with the default classifier.
#[must_use]
pub fn route<S: AsRef<str>, H: BuildHasher>(
    segments: &[S],
    query: &HashMap<String, String, H>,
) -> RouteDecision {
    IntentRouter::default().route(segments, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    const NO_SEGMENTS: [&str; 0] = [];

    #[test]
    fn test_empty_path_is_none() {
        assert_eq!(route(&NO_SEGMENTS, &query(&[])), RouteDecision::None);
    }

    #[test]
    fn test_pot_id_wins() {
        assert_eq!(
            route(&["alice"], &query(&[("id", "r1")])),
            RouteDecision::PotContribution
        );
        assert_eq!(
            route(&NO_SEGMENTS, &query(&[("id", "r1")])),
            RouteDecision::PotContribution
        );
        assert_eq!(
            route(&["alice", "10usdc"], &query(&[("id", "r1"), ("chargeId", "c1")])),
            RouteDecision::PotContribution
        );
    }

    #[test]
    fn test_empty_params_are_absent() {
        assert_eq!(
            route(&["alice"], &query(&[("id", ""), ("chargeId", "")])),
            RouteDecision::PublicProfile
        );
    }

    #[test]
    fn test_charge_id_is_semantic_request() {
        assert_eq!(
            route(&["alice"], &query(&[("chargeId", "c1")])),
            RouteDecision::SemanticRequest
        );
        assert_eq!(
            route(&NO_SEGMENTS, &query(&[("chargeId", "c1")])),
            RouteDecision::None
        );
    }

    #[test]
    fn test_address_and_name_are_semantic_request() {
        let address = format!("0x{}", "a".repeat(40));
        assert_eq!(route(&[address.as_str()], &query(&[])), RouteDecision::SemanticRequest);
        assert_eq!(route(&["vitalik.eth"], &query(&[])), RouteDecision::SemanticRequest);
        assert_eq!(
            route(&[format!("{address}@base")], &query(&[])),
            RouteDecision::SemanticRequest
        );
    }

    #[test]
    fn test_username_routes() {
        assert_eq!(route(&["alice"], &query(&[])), RouteDecision::PublicProfile);
        assert_eq!(
            route(&["alice", "10usdc"], &query(&[])),
            RouteDecision::SemanticRequest
        );
        assert_eq!(
            route(&["alice@polygon"], &query(&[])),
            RouteDecision::SemanticRequest
        );
    }

    #[test]
    fn test_custom_suffix_router() {
        let router = IntentRouter::new(RecipientClassifier::new([".base.eth"]));
        let input = RawIntentInput::new(["jesse.base.eth"], std::iter::empty::<(&str, &str)>());
        assert_eq!(router.route_input(&input), RouteDecision::SemanticRequest);
        let input = RawIntentInput::new(["vitalik.eth"], std::iter::empty::<(&str, &str)>());
        assert_eq!(router.route_input(&input), RouteDecision::PublicProfile);
    }

    #[test]
    fn test_decision_serde() {
        assert_eq!(
            serde_json::to_string(&RouteDecision::PotContribution).unwrap(),
            "\"POT_CONTRIBUTION\""
        );
        assert_eq!(RouteDecision::PublicProfile.to_string(), "PUBLIC_PROFILE");
    }
}
