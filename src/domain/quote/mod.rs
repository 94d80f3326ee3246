//! Quoting

pub mod quote_engine;

use crate::shared::types::{Amount, Pair};

/// Immutable snapshot of a simulated swap outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub pair: Pair,
    pub offered: Amount,
    pub returned: Amount,
}

pub use quote_engine::QuoteEngine;
