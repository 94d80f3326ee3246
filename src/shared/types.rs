//! Common types used across the application

use serde::{Deserialize, Serialize};

use crate::shared::errors::SwapError;

/// Largest decimal count any supported token declares (18-decimal wei-style
/// bridge assets).
pub const MAX_DECIMALS: u8 = 18;

/// Reference to an on-chain asset, fixed at the system boundary.
///
/// Native assets are tracked at the chain level and move by attaching funds
/// to a message; contract assets live in a CW20-style contract and move via
/// contract calls. Classification happens once, in the asset resolver, and
/// the rest of the core only ever looks at this tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetRef {
    Native { denom: String },
    Contract { address: String },
}

impl AssetRef {
    pub fn native(denom: impl Into<String>) -> Self {
        AssetRef::Native { denom: denom.into() }
    }

    pub fn contract(address: impl Into<String>) -> Self {
        AssetRef::Contract { address: address.into() }
    }

    /// The denom or contract address, whichever this reference carries.
    pub fn identifier(&self) -> &str {
        match self {
            AssetRef::Native { denom } => denom,
            AssetRef::Contract { address } => address,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, AssetRef::Native { .. })
    }
}

/// Token quantity as an integer scaled by the token's declared decimals.
///
/// Two amounts only combine when their decimals match; conversion is an
/// explicit `rescale`. All fee and swap math happens on `raw`, so no
/// floating point ever touches a quantity that ends up in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub raw: u128,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: u128, decimals: u8) -> Result<Self, SwapError> {
        if decimals > MAX_DECIMALS {
            return Err(SwapError::InvalidAmount(format!(
                "decimals {decimals} exceeds the maximum of {MAX_DECIMALS}"
            )));
        }
        Ok(Self { raw, decimals })
    }

    pub fn zero(decimals: u8) -> Result<Self, SwapError> {
        Self::new(0, decimals)
    }

    /// Parses a decimal string expressed in the token's smallest unit.
    pub fn parse(input: &str, decimals: u8) -> Result<Self, SwapError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SwapError::MissingField("amount"));
        }
        let raw: u128 = trimmed.parse().map_err(|_| {
            SwapError::InvalidAmount(format!(
                "'{trimmed}' is not a whole number in the token's smallest unit"
            ))
        })?;
        Self::new(raw, decimals)
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    pub fn checked_add(&self, other: &Amount) -> Result<Amount, SwapError> {
        self.require_same_scale(other)?;
        let raw = self
            .raw
            .checked_add(other.raw)
            .ok_or_else(|| SwapError::InvalidAmount("amount addition overflows".into()))?;
        Amount::new(raw, self.decimals)
    }

    pub fn checked_sub(&self, other: &Amount) -> Result<Amount, SwapError> {
        self.require_same_scale(other)?;
        let raw = self.raw.checked_sub(other.raw).ok_or_else(|| {
            SwapError::InvalidAmount(format!(
                "cannot subtract {} from {}: result would be negative",
                other.raw, self.raw
            ))
        })?;
        Amount::new(raw, self.decimals)
    }

    /// Re-expresses this amount at a different decimal count. Scaling up is
    /// exact; scaling down truncates toward zero.
    pub fn rescale(&self, decimals: u8) -> Result<Amount, SwapError> {
        if decimals > MAX_DECIMALS {
            return Err(SwapError::InvalidAmount(format!(
                "decimals {decimals} exceeds the maximum of {MAX_DECIMALS}"
            )));
        }
        if decimals == self.decimals {
            return Ok(self.clone());
        }
        if decimals > self.decimals {
            let factor = 10u128.pow(u32::from(decimals - self.decimals));
            let raw = self
                .raw
                .checked_mul(factor)
                .ok_or_else(|| SwapError::InvalidAmount("amount rescale overflows".into()))?;
            Amount::new(raw, decimals)
        } else {
            let factor = 10u128.pow(u32::from(self.decimals - decimals));
            Amount::new(self.raw / factor, decimals)
        }
    }

    /// Formats the amount in display units with exactly `places` fractional
    /// digits, using integer math only.
    pub fn format_fixed(&self, places: usize) -> String {
        let scale = 10u128.pow(u32::from(self.decimals));
        let whole = self.raw / scale;
        let frac = self.raw % scale;
        if places == 0 {
            return whole.to_string();
        }
        let mut frac_digits = format!("{frac:0width$}", width = self.decimals as usize);
        if frac_digits.len() > places {
            frac_digits.truncate(places);
        } else {
            while frac_digits.len() < places {
                frac_digits.push('0');
            }
        }
        format!("{whole}.{frac_digits}")
    }

    fn require_same_scale(&self, other: &Amount) -> Result<(), SwapError> {
        if self.decimals != other.decimals {
            return Err(SwapError::InvalidAmount(format!(
                "decimal mismatch: {} vs {}",
                self.decimals, other.decimals
            )));
        }
        Ok(())
    }
}

/// A trading pair of two distinct assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub offer: AssetRef,
    pub ask: AssetRef,
}

impl Pair {
    pub fn new(offer: AssetRef, ask: AssetRef) -> Result<Self, SwapError> {
        if offer == ask {
            return Err(SwapError::SamePair(offer.identifier().to_string()));
        }
        Ok(Self { offer, ask })
    }
}
