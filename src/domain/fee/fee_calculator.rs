//! Commission and network fee math

use serde::Deserialize;

use crate::shared::errors::SwapError;
use crate::shared::types::Amount;

/// One hundred percent, in basis points.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Decimal scale the configured fixed network fee is expressed at.
const NETWORK_FEE_DECIMALS: u8 = 6;

/// Fee components for a swap of a given amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub commission: Amount,
    pub network_fee: Amount,
    pub total: Amount,
    pub commission_rate_bps: u32,
}

impl FeeBreakdown {
    /// Commission rate as the fraction callers see in API payloads.
    pub fn rate_fraction(&self) -> f64 {
        f64::from(self.commission_rate_bps) / BPS_DENOMINATOR as f64
    }
}

/// Service fee configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeSettings {
    /// Commission rate in basis points (85 = 0.85%).
    #[serde(default = "default_commission_rate_bps")]
    pub commission_rate_bps: u32,
    /// Address the commission transfer pays out to.
    #[serde(default = "default_commission_address")]
    pub commission_address: String,
    /// Fixed network fee in 6-decimal micro units (1000 = 0.001).
    #[serde(default = "default_network_fee_micro")]
    pub network_fee_micro: u64,
    /// Provider tag stamped on records and transaction memos.
    #[serde(default = "default_provider")]
    pub provider: String,
}

fn default_commission_rate_bps() -> u32 {
    85
}

fn default_commission_address() -> String {
    "terra1exnef0wrmf864tczt7m7ykvc70juh8p5er9rdj".to_string()
}

fn default_network_fee_micro() -> u64 {
    1_000
}

fn default_provider() -> String {
    "yourwallet".to_string()
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            commission_rate_bps: default_commission_rate_bps(),
            commission_address: default_commission_address(),
            network_fee_micro: default_network_fee_micro(),
            provider: default_provider(),
        }
    }
}

impl FeeSettings {
    /// The fixed network fee re-expressed at a token's decimal scale.
    pub fn network_fee_amount(&self, decimals: u8) -> Result<Amount, SwapError> {
        Amount::new(u128::from(self.network_fee_micro), NETWORK_FEE_DECIMALS)?.rescale(decimals)
    }
}

/// Computes the fee breakdown for an amount.
///
/// Commission truncates: `floor(raw * bps / 10_000)`, never rounding up.
/// A zero amount yields a zero commission, not an error.
pub fn compute_fee(
    amount: &Amount,
    commission_rate_bps: u32,
    network_fee: &Amount,
) -> Result<FeeBreakdown, SwapError> {
    if u128::from(commission_rate_bps) > BPS_DENOMINATOR {
        return Err(SwapError::InvalidAmount(format!(
            "commission rate {commission_rate_bps} bps exceeds 100%"
        )));
    }
    let commission_raw = amount
        .raw
        .checked_mul(u128::from(commission_rate_bps))
        .ok_or_else(|| SwapError::InvalidAmount("commission computation overflows".into()))?
        / BPS_DENOMINATOR;
    let commission = Amount::new(commission_raw, amount.decimals)?;
    let network_fee = network_fee.rescale(amount.decimals)?;
    let total = commission.checked_add(&network_fee)?;
    Ok(FeeBreakdown {
        commission,
        network_fee,
        total,
        commission_rate_bps,
    })
}
