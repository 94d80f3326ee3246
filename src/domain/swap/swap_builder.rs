//! Unsigned swap transaction construction

use std::sync::Arc;

use tracing::debug;

use crate::domain::asset::TokenRegistry;
use crate::domain::fee::{compute_fee, FeeBreakdown, FeeSettings};
use crate::domain::pair::PairLocator;
use crate::domain::swap::messages::{
    Asset, AssetInfo, ChainMsg, Coin, MsgExecuteContract, MsgSend, PairExecuteMsg,
};
use crate::shared::errors::SwapError;
use crate::shared::types::{Amount, Pair};

/// The unsigned transaction contents handed back to the caller for signing
/// and broadcast. The builder holds no reference to it after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSwap {
    pub messages: Vec<ChainMsg>,
    pub net_swap_amount: Amount,
    pub fee: FeeBreakdown,
    pub memo: String,
}

/// Builds the ordered message list for a swap: the pool execution first,
/// then the commission transfer. Commission is carved out of the offered
/// amount before it reaches the pool, never added on top.
pub struct SwapBuilder {
    locator: PairLocator,
    registry: Arc<TokenRegistry>,
    fees: FeeSettings,
}

impl SwapBuilder {
    pub fn new(locator: PairLocator, registry: Arc<TokenRegistry>, fees: FeeSettings) -> Self {
        Self {
            locator,
            registry,
            fees,
        }
    }

    pub async fn prepare(
        &self,
        sender: &str,
        pair: &Pair,
        amount: &Amount,
    ) -> Result<PreparedSwap, SwapError> {
        let sender = sender.trim();
        if sender.is_empty() {
            return Err(SwapError::MissingField("sender"));
        }
        if amount.is_zero() {
            return Err(SwapError::InvalidAmount(
                "swap amount must be greater than zero".into(),
            ));
        }

        let network_fee = self.fees.network_fee_amount(amount.decimals)?;
        let fee = compute_fee(amount, self.fees.commission_rate_bps, &network_fee)?;
        let net_swap_amount = amount.checked_sub(&fee.commission)?;

        let resolution = self.locator.resolve(&pair.offer, &pair.ask).await?;
        debug!(
            pool = %resolution.pool_address,
            net = net_swap_amount.raw,
            commission = fee.commission.raw,
            "preparing swap messages"
        );

        // Native assets move via attached funds; contract assets rely on
        // the pool pulling from an allowance, so no coins ride along.
        let attached_coins = if pair.offer.is_native() {
            vec![Coin {
                denom: pair.offer.identifier().to_string(),
                amount: net_swap_amount.raw.to_string(),
            }]
        } else {
            Vec::new()
        };

        let swap_msg = ChainMsg::ExecuteContract(MsgExecuteContract {
            sender: sender.to_string(),
            contract: resolution.pool_address.clone(),
            execute_msg: PairExecuteMsg::Swap {
                offer_asset: Asset {
                    info: AssetInfo::from(&pair.offer),
                    amount: net_swap_amount.raw.to_string(),
                },
            },
            coins: attached_coins,
        });

        let commission_msg = ChainMsg::Send(MsgSend {
            from_address: sender.to_string(),
            to_address: self.fees.commission_address.clone(),
            amount: vec![Coin {
                denom: pair.offer.identifier().to_string(),
                amount: fee.commission.raw.to_string(),
            }],
        });

        let memo = self.memo_for(pair);

        // Broadcast treats the list as an atomic ordered sequence: the swap
        // executes before the commission transfer.
        Ok(PreparedSwap {
            messages: vec![swap_msg, commission_msg],
            net_swap_amount,
            fee,
            memo,
        })
    }

    fn memo_for(&self, pair: &Pair) -> String {
        let from = self
            .registry
            .symbol_for(pair.offer.identifier())
            .unwrap_or_else(|| pair.offer.identifier());
        let to = self
            .registry
            .symbol_for(pair.ask.identifier())
            .unwrap_or_else(|| pair.ask.identifier());
        format!("{} | {from} to {to} Swap", self.fees.provider)
    }
}
