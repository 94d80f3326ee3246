//! Liquidity pair resolution against the factory registry

use std::sync::Arc;

use tracing::debug;

use crate::infrastructure::chain::ChainQuerier;
use crate::shared::errors::SwapError;
use crate::shared::types::AssetRef;

/// Which pool serves a pair, and in which asset ordering the factory has it
/// registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolResolution {
    pub pool_address: String,
    pub asset_order: [AssetRef; 2],
}

/// Resolves an unordered asset pair to its pool address.
///
/// The factory may have registered the pair in either asset ordering, so an
/// absent forward lookup is retried reversed before the pair is declared
/// missing. "Not registered" is an expected outcome here, not an exception;
/// transport failures from the querier propagate untouched.
pub struct PairLocator {
    chain: Arc<dyn ChainQuerier>,
}

impl PairLocator {
    pub fn new(chain: Arc<dyn ChainQuerier>) -> Self {
        Self { chain }
    }

    pub async fn resolve(
        &self,
        offer: &AssetRef,
        ask: &AssetRef,
    ) -> Result<PoolResolution, SwapError> {
        if let Some(pair) = self.chain.query_pair(offer, ask).await? {
            debug!(pool = %pair.contract_addr, "pair resolved in forward order");
            return Ok(PoolResolution {
                pool_address: pair.contract_addr,
                asset_order: [offer.clone(), ask.clone()],
            });
        }

        if let Some(pair) = self.chain.query_pair(ask, offer).await? {
            debug!(pool = %pair.contract_addr, "pair resolved in reversed order");
            return Ok(PoolResolution {
                pool_address: pair.contract_addr,
                asset_order: [ask.clone(), offer.clone()],
            });
        }

        Err(SwapError::PairNotFound {
            from_asset: offer.identifier().to_string(),
            to_asset: ask.identifier().to_string(),
            attempted: vec![
                [
                    offer.identifier().to_string(),
                    ask.identifier().to_string(),
                ],
                [
                    ask.identifier().to_string(),
                    offer.identifier().to_string(),
                ],
            ],
        })
    }
}
