//! LCD REST client for Terra Classic

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ChainCfg;
use crate::domain::swap::messages::{Asset, AssetInfo};
use crate::infrastructure::chain::wire::{
    parse_chain_amount, FactoryQueryMsg, LcdErrorBody, LcdResponse, PairQueryMsg, PairResponse,
    SimulationResponse,
};
use crate::infrastructure::chain::{ChainQuerier, PairInfo, SimulationOutcome};
use crate::shared::errors::SwapError;
use crate::shared::types::{Amount, AssetRef};

/// Outcome of a smart-contract store query: either a decoded result or a
/// contract-level error reported by the LCD (e.g. an unregistered pair).
enum StoreQueryOutcome<T> {
    Found(T),
    ContractError(String),
}

/// Chain querier backed by a Terra Classic LCD endpoint.
///
/// Every request carries the configured timeout; transport failures map to
/// the transient upstream error kind, contract-level errors stay
/// distinguishable so callers can treat "pair not registered" as an
/// expected outcome.
pub struct LcdChainClient {
    http: reqwest::Client,
    lcd_url: String,
    factory_address: String,
}

impl LcdChainClient {
    pub fn new(cfg: &ChainCfg) -> Result<Self, SwapError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|err| SwapError::Upstream(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            lcd_url: cfg.lcd_url.trim_end_matches('/').to_string(),
            factory_address: cfg.factory_address.clone(),
        })
    }

    async fn contract_store_query<Q, R>(
        &self,
        contract: &str,
        query: &Q,
    ) -> Result<StoreQueryOutcome<R>, SwapError>
    where
        Q: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}/wasm/contracts/{contract}/store", self.lcd_url);
        let query_msg = serde_json::to_string(query)
            .map_err(|err| SwapError::Upstream(format!("failed to encode contract query: {err}")))?;
        debug!(%contract, query = %query_msg, "contract store query");

        let response = self
            .http
            .get(&url)
            .query(&[("query_msg", query_msg.as_str())])
            .send()
            .await
            .map_err(|err| SwapError::Upstream(format!("LCD request to {contract} failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| SwapError::Upstream(format!("LCD response from {contract} unreadable: {err}")))?;

        if status.is_success() {
            let decoded: LcdResponse<R> = serde_json::from_str(&body).map_err(|err| {
                SwapError::Upstream(format!("malformed LCD response from {contract}: {err}"))
            })?;
            return Ok(StoreQueryOutcome::Found(decoded.result));
        }

        // Contract-level rejections come back as structured error bodies;
        // anything else is a transport problem.
        match serde_json::from_str::<LcdErrorBody>(&body) {
            Ok(rejection) => Ok(StoreQueryOutcome::ContractError(rejection.error)),
            Err(_) => Err(SwapError::Upstream(format!(
                "LCD returned {status} for {contract}"
            ))),
        }
    }
}

#[async_trait]
impl ChainQuerier for LcdChainClient {
    async fn query_pair(
        &self,
        first: &AssetRef,
        second: &AssetRef,
    ) -> Result<Option<PairInfo>, SwapError> {
        let query = FactoryQueryMsg::Pair {
            asset_infos: [AssetInfo::from(first), AssetInfo::from(second)],
        };
        match self
            .contract_store_query::<_, PairResponse>(&self.factory_address, &query)
            .await?
        {
            StoreQueryOutcome::Found(pair) => Ok(Some(PairInfo {
                contract_addr: pair.contract_addr,
                liquidity_token: pair.liquidity_token,
            })),
            StoreQueryOutcome::ContractError(reason) => {
                debug!(
                    first = first.identifier(),
                    second = second.identifier(),
                    %reason,
                    "factory has no pair for this ordering"
                );
                Ok(None)
            }
        }
    }

    async fn simulate_swap(
        &self,
        pool_address: &str,
        offer: &AssetRef,
        amount: &Amount,
    ) -> Result<SimulationOutcome, SwapError> {
        let query = PairQueryMsg::Simulation {
            offer_asset: Asset {
                info: AssetInfo::from(offer),
                amount: amount.raw.to_string(),
            },
        };
        match self
            .contract_store_query::<_, SimulationResponse>(pool_address, &query)
            .await?
        {
            StoreQueryOutcome::Found(simulation) => Ok(SimulationOutcome {
                return_amount: parse_chain_amount("return_amount", &simulation.return_amount)?,
                spread_amount: simulation
                    .spread_amount
                    .as_deref()
                    .map(|value| parse_chain_amount("spread_amount", value))
                    .transpose()?
                    .unwrap_or(0),
                commission_amount: simulation
                    .commission_amount
                    .as_deref()
                    .map(|value| parse_chain_amount("commission_amount", value))
                    .transpose()?
                    .unwrap_or(0),
            }),
            StoreQueryOutcome::ContractError(reason) => Err(SwapError::Upstream(format!(
                "simulation against {pool_address} rejected: {reason}"
            ))),
        }
    }
}
