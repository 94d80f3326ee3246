//! Error handling for the application

use serde::Serialize;
use thiserror::Error;

/// Stable, machine-checkable error classification surfaced alongside every
/// human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Upstream,
    Duplicate,
    Persistence,
}

/// Swap service errors
#[derive(Error, Debug)]
pub enum SwapError {
    #[error("missing required parameter: {0}")]
    MissingField(&'static str),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("cannot swap a token for itself: {0}")]
    SamePair(String),

    #[error("token '{token}' is a Terra 2.0 token and cannot be swapped on Terra Classic, use 'uluna' instead")]
    UnsupportedToken { token: String, supported: Vec<String> },

    #[error("pair not found: no liquidity pool serves '{from_asset}' and '{to_asset}' in either order")]
    PairNotFound {
        from_asset: String,
        to_asset: String,
        attempted: Vec<[String; 2]>,
    },

    #[error("invalid swap record field '{field}': {reason}")]
    InvalidRecord { field: &'static str, reason: String },

    #[error("upstream query failed: {0}")]
    Upstream(String),

    #[error("a swap record already exists for txhash '{0}'")]
    Duplicate(String),

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl SwapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SwapError::MissingField(_)
            | SwapError::InvalidAmount(_)
            | SwapError::SamePair(_)
            | SwapError::UnsupportedToken { .. }
            | SwapError::InvalidRecord { .. } => ErrorKind::Validation,
            SwapError::PairNotFound { .. } => ErrorKind::NotFound,
            SwapError::Upstream(_) => ErrorKind::Upstream,
            SwapError::Duplicate(_) => ErrorKind::Duplicate,
            SwapError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// Transient failures are eligible for retry; everything else is
    /// deterministic and retrying would only repeat the same outcome.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::Upstream | ErrorKind::Persistence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification_follows_kind() {
        assert!(SwapError::Upstream("timeout".into()).is_transient());
        assert!(SwapError::Persistence("pool exhausted".into()).is_transient());
        assert!(!SwapError::MissingField("sender").is_transient());
        assert!(!SwapError::Duplicate("ABC".into()).is_transient());
        assert!(!SwapError::PairNotFound {
            from_asset: "uluna".into(),
            to_asset: "uusd".into(),
            attempted: vec![],
        }
        .is_transient());
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(
            SwapError::UnsupportedToken {
                token: "uluna2".into(),
                supported: vec![]
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(SwapError::Duplicate("ABC".into()).kind(), ErrorKind::Duplicate);
    }
}
