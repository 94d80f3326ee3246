//! Read-only swap quoting

use std::sync::Arc;

use tracing::debug;

use crate::domain::asset::{TokenRegistry, DEFAULT_CHAIN_DECIMALS};
use crate::domain::pair::PairLocator;
use crate::domain::quote::Quote;
use crate::infrastructure::chain::ChainQuerier;
use crate::shared::errors::SwapError;
use crate::shared::types::{Amount, Pair};

/// Obtains an expected output amount by simulating a swap against the
/// resolved pool, without mutating chain state.
///
/// The quote is gross: the full offered amount is simulated, commission is
/// not netted out here. The returned amount stays at the ask asset's
/// on-chain scale; display conversion is the caller's concern.
pub struct QuoteEngine {
    locator: PairLocator,
    chain: Arc<dyn ChainQuerier>,
    registry: Arc<TokenRegistry>,
}

impl QuoteEngine {
    pub fn new(
        locator: PairLocator,
        chain: Arc<dyn ChainQuerier>,
        registry: Arc<TokenRegistry>,
    ) -> Self {
        Self {
            locator,
            chain,
            registry,
        }
    }

    pub async fn quote(&self, pair: &Pair, offered: &Amount) -> Result<Quote, SwapError> {
        if offered.is_zero() {
            return Err(SwapError::InvalidAmount(
                "quote amount must be greater than zero".into(),
            ));
        }

        let resolution = self.locator.resolve(&pair.offer, &pair.ask).await?;
        let outcome = self
            .chain
            .simulate_swap(&resolution.pool_address, &pair.offer, offered)
            .await?;
        debug!(
            pool = %resolution.pool_address,
            offered = offered.raw,
            returned = outcome.return_amount,
            "simulation complete"
        );

        let returned_decimals = self
            .registry
            .decimals_for(pair.ask.identifier())
            .unwrap_or(DEFAULT_CHAIN_DECIMALS);
        let returned = Amount::new(outcome.return_amount, returned_decimals)?;

        Ok(Quote {
            pair: pair.clone(),
            offered: offered.clone(),
            returned,
        })
    }
}
