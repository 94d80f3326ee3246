//! LCD wire formats for factory and pair contract queries

use serde::{Deserialize, Serialize};

use crate::domain::swap::messages::{Asset, AssetInfo};
use crate::shared::errors::SwapError;

/// Query payload sent to the pair factory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FactoryQueryMsg {
    Pair { asset_infos: [AssetInfo; 2] },
}

/// Query payload sent to a pair contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PairQueryMsg {
    Simulation { offer_asset: Asset },
}

/// The legacy LCD wraps successful store queries as `{ height, result }`.
#[derive(Debug, Deserialize)]
pub(crate) struct LcdResponse<T> {
    pub result: T,
}

/// Error payload the LCD returns for contract-level failures.
#[derive(Debug, Deserialize)]
pub(crate) struct LcdErrorBody {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PairResponse {
    pub contract_addr: String,
    #[serde(default)]
    pub liquidity_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SimulationResponse {
    pub return_amount: String,
    #[serde(default)]
    pub spread_amount: Option<String>,
    #[serde(default)]
    pub commission_amount: Option<String>,
}

pub(crate) fn parse_chain_amount(field: &str, value: &str) -> Result<u128, SwapError> {
    value
        .parse()
        .map_err(|_| SwapError::Upstream(format!("malformed {field} in simulation response: '{value}'")))
}
