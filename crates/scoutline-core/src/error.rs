// Error types for the scoring core.
//
// Scoring itself never fails: absent and malformed inputs flow through as
// `None`. These errors cover construction-time checks and collaborator
// lookups only.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("unknown age tier label: {0:?}")]
    UnknownTier(String),

    #[error("metric key `{key}` is not declared by the {tier} profile")]
    UnknownMetric { tier: String, key: String },

    #[error("{tier} {category}: `{test}` does not name a declared test")]
    UnresolvedTest {
        tier: String,
        category: String,
        test: String,
    },

    #[error("{tier} {category}: test `{test}` is declared more than once")]
    DuplicateTest {
        tier: String,
        category: String,
        test: String,
    },

    #[error("{0} has no full-evaluation position profile")]
    NoFullEvaluation(String),
}

/// A category-result lookup against the persistence collaborator failed.
///
/// The aggregator never propagates this: the affected category is treated
/// as absent.
#[derive(Debug, Error)]
#[error("lookup of `{template}` for player {player_id} failed: {message}")]
pub struct LookupError {
    pub player_id: String,
    pub template: String,
    pub message: String,
}

impl LookupError {
    pub fn new(player_id: &str, template: &str, message: impl Into<String>) -> Self {
        LookupError {
            player_id: player_id.to_string(),
            template: template.to_string(),
            message: message.into(),
        }
    }
}
