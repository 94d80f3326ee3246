//! Chain-query collaborator interface

use async_trait::async_trait;

use crate::shared::errors::SwapError;
use crate::shared::types::{Amount, AssetRef};

mod lcd_client;
mod wire;

pub use lcd_client::LcdChainClient;

/// Pair registration returned by the factory contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairInfo {
    pub contract_addr: String,
    pub liquidity_token: Option<String>,
}

/// Result of a read-only swap simulation against a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationOutcome {
    pub return_amount: u128,
    pub spread_amount: u128,
    pub commission_amount: u128,
}

/// Read-only access to the upstream chain, injected into every component
/// that needs it so tests can substitute doubles and multiple network
/// configurations can coexist.
///
/// `query_pair` distinguishes "no pair registered for this ordering"
/// (`Ok(None)`) from transport failures (`Err`); the pair locator depends
/// on that distinction for its reversed-order fallback.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainQuerier: Send + Sync {
    async fn query_pair(
        &self,
        first: &AssetRef,
        second: &AssetRef,
    ) -> Result<Option<PairInfo>, SwapError>;

    async fn simulate_swap(
        &self,
        pool_address: &str,
        offer: &AssetRef,
        amount: &Amount,
    ) -> Result<SimulationOutcome, SwapError>;
}
