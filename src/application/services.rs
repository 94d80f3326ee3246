//! Application services - the operation contracts the transport layer calls

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::retry::{ExecutionOutcome, IdempotentExecutor, RetryPolicy};
use crate::domain::asset::{AssetResolver, TokenRegistry, DEFAULT_CHAIN_DECIMALS};
use crate::domain::fee::{compute_fee, FeeSettings};
use crate::domain::pair::PairLocator;
use crate::domain::quote::QuoteEngine;
use crate::domain::swap::swap_builder::PreparedSwap;
use crate::domain::swap::{ChainMsg, SwapBuilder};
use crate::infrastructure::chain::ChainQuerier;
use crate::ledger::{
    percentage_change, PercentageChange, SwapFilter, SwapRecord, SwapStore, TimeFrame, TimeWindow,
    TokenUsage,
};
use crate::shared::errors::{ErrorKind, SwapError};
use crate::shared::types::{Amount, Pair};

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub from_token: String,
    pub to_token: String,
    /// Amount in the from-token's smallest unit.
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub from_token: String,
    pub to_token: String,
    pub amount: String,
    pub return_amount: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareSwapRequest {
    pub sender: String,
    pub from_token: String,
    pub to_token: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareSwapResponse {
    pub msgs: Vec<ChainMsg>,
    pub memo: String,
    pub success: bool,
}

impl From<PreparedSwap> for PrepareSwapResponse {
    fn from(prepared: PreparedSwap) -> Self {
        Self {
            msgs: prepared.messages,
            memo: prepared.memo,
            success: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSwapResponse {
    pub message: String,
    pub record: SwapRecord,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSwapsRequest {
    pub wallet_address: Option<String>,
    pub time_frame: Option<TimeFrame>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSwapsResponse {
    pub records: Vec<SwapRecord>,
    pub total_count: u64,
    pub percentage_change_total_value: PercentageChange,
    pub percentage_change_total_fee: PercentageChange,
    pub most_used_token: Option<TokenUsage>,
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRequest {
    /// Amount in the from-token's smallest unit.
    pub amount: String,
    pub from_token: String,
}

/// Fee quote with every numeric field pre-formatted to six decimal places,
/// so no consumer reformats floats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeResponse {
    pub commission: String,
    pub network_fee: String,
    pub total_fee: String,
    pub commission_rate: f64,
    pub amount: String,
}

/// Structured failure payload: a stable kind plus whatever context the
/// error carries, so callers can diagnose without re-deriving state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_tokens: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txhash: Option<String>,
}

/// Swap orchestration facade.
///
/// Each call is an independent unit of work; the only shared state lives
/// inside the injected collaborators (the chain client's connection pool
/// and the store's connection pool), both externally synchronized.
pub struct SwapService {
    registry: Arc<TokenRegistry>,
    resolver: AssetResolver,
    quote_engine: QuoteEngine,
    builder: SwapBuilder,
    store: Arc<dyn SwapStore>,
    executor: IdempotentExecutor,
    fees: FeeSettings,
}

impl SwapService {
    pub fn new(
        chain: Arc<dyn ChainQuerier>,
        store: Arc<dyn SwapStore>,
        fees: FeeSettings,
        retry: RetryPolicy,
    ) -> Self {
        let registry = Arc::new(TokenRegistry::terra_classic());
        Self::with_registry(chain, store, registry, fees, retry)
    }

    pub fn with_registry(
        chain: Arc<dyn ChainQuerier>,
        store: Arc<dyn SwapStore>,
        registry: Arc<TokenRegistry>,
        fees: FeeSettings,
        retry: RetryPolicy,
    ) -> Self {
        let resolver = AssetResolver::new(Arc::clone(&registry));
        let quote_engine = QuoteEngine::new(
            PairLocator::new(Arc::clone(&chain)),
            Arc::clone(&chain),
            Arc::clone(&registry),
        );
        let builder = SwapBuilder::new(
            PairLocator::new(Arc::clone(&chain)),
            Arc::clone(&registry),
            fees.clone(),
        );
        let executor = IdempotentExecutor::new(Arc::clone(&store), retry);
        Self {
            registry,
            resolver,
            quote_engine,
            builder,
            store,
            executor,
            fees,
        }
    }

    /// Price quote for a pair: resolves the pool and simulates the full
    /// offered amount (gross; commission is only netted out at prepare
    /// time).
    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, SwapError> {
        let from = require(&request.from_token, "fromToken")?;
        let to = require(&request.to_token, "toToken")?;

        // excluded tokens short-circuit here, before any network call
        let offer = self.resolver.classify(from)?;
        let ask = self.resolver.classify(to)?;
        let pair = Pair::new(offer, ask)?;

        let offered = self.parse_amount(&request.amount, pair.offer.identifier())?;
        let quote = self.quote_engine.quote(&pair, &offered).await?;
        info!(
            from = pair.offer.identifier(),
            to = pair.ask.identifier(),
            offered = offered.raw,
            returned = quote.returned.raw,
            "quote served"
        );

        Ok(QuoteResponse {
            from_token: pair.offer.identifier().to_string(),
            to_token: pair.ask.identifier().to_string(),
            amount: offered.raw.to_string(),
            return_amount: quote.returned.raw.to_string(),
        })
    }

    /// Builds the unsigned swap + commission message pair for the external
    /// signer.
    pub async fn prepare_swap(
        &self,
        request: &PrepareSwapRequest,
    ) -> Result<PreparedSwap, SwapError> {
        let sender = require(&request.sender, "sender")?;
        let from = require(&request.from_token, "fromToken")?;
        let to = require(&request.to_token, "toToken")?;

        let offer = self.resolver.classify(from)?;
        let ask = self.resolver.classify(to)?;
        let pair = Pair::new(offer, ask)?;

        let amount = self.parse_amount(&request.amount, pair.offer.identifier())?;
        if amount.is_zero() {
            return Err(SwapError::InvalidAmount(
                "swap amount must be greater than zero".into(),
            ));
        }

        let prepared = self.builder.prepare(sender, &pair, &amount).await?;
        info!(
            sender,
            from = pair.offer.identifier(),
            to = pair.ask.identifier(),
            net = prepared.net_swap_amount.raw,
            commission = prepared.fee.commission.raw,
            "swap prepared"
        );
        Ok(prepared)
    }

    /// Stores a settled swap. Insertion retries transient store failures;
    /// a txhash that is already recorded surfaces as the duplicate kind
    /// without touching the stored record.
    pub async fn record_swap(&self, record: SwapRecord) -> Result<RecordSwapResponse, SwapError> {
        record.validate()?;

        let store = Arc::clone(&self.store);
        let outcome = self
            .executor
            .execute(Some(&record.txhash), |_attempt| {
                let store = Arc::clone(&store);
                let record = record.clone();
                async move { store.insert(&record).await }
            })
            .await?;

        match outcome {
            ExecutionOutcome::AlreadyRecorded(existing) => {
                Err(SwapError::Duplicate(existing.txhash))
            }
            ExecutionOutcome::Executed(()) => {
                info!(txhash = %record.txhash, wallet = %record.wallet_address, "swap recorded");
                Ok(RecordSwapResponse {
                    message: "Swap created successfully".to_string(),
                    record,
                })
            }
        }
    }

    /// Paginated record listing plus the dashboard analytics: trailing
    /// 30-day totals compared against the prior 30 days, and the most used
    /// from-token. The wallet filter scopes the window aggregates too; the
    /// time-frame filter only scopes the listing and the usage counts.
    pub async fn list_swaps(
        &self,
        request: &ListSwapsRequest,
    ) -> Result<ListSwapsResponse, SwapError> {
        let page = request.page.max(1);
        let page_size = if request.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            request.page_size
        };

        let now = Utc::now();
        let filter = SwapFilter {
            wallet_address: request.wallet_address.clone(),
            since: request.time_frame.map(|frame| frame.start_from(now)),
        };
        let wallet_filter = SwapFilter {
            wallet_address: request.wallet_address.clone(),
            since: None,
        };
        let current_window = TimeWindow {
            start: now - Duration::days(30),
            end: None,
        };
        let previous_window = TimeWindow {
            start: now - Duration::days(60),
            end: Some(now - Duration::days(30)),
        };

        let ((records, total_count), current, previous, counts) = futures::try_join!(
            self.store.list(&filter, page, page_size),
            self.store.window_totals(&wallet_filter, &current_window),
            self.store.window_totals(&wallet_filter, &previous_window),
            self.store.counts_by_from_symbol(&filter),
        )?;

        Ok(ListSwapsResponse {
            records,
            total_count,
            percentage_change_total_value: percentage_change(
                current.total_value,
                previous.total_value,
            ),
            percentage_change_total_fee: percentage_change(current.total_fee, previous.total_fee),
            most_used_token: counts.into_iter().next(),
            success: true,
        })
    }

    /// Commission and network fee for an amount, formatted for display.
    pub fn calculate_fee(&self, request: &FeeRequest) -> Result<FeeResponse, SwapError> {
        let from = require(&request.from_token, "fromToken")?;
        let asset = self.resolver.classify(from)?;
        let amount = self.parse_amount(&request.amount, asset.identifier())?;
        if amount.is_zero() {
            return Err(SwapError::InvalidAmount(
                "fee amount must be greater than zero".into(),
            ));
        }

        let network_fee = self.fees.network_fee_amount(amount.decimals)?;
        let fee = compute_fee(&amount, self.fees.commission_rate_bps, &network_fee)?;

        Ok(FeeResponse {
            commission: fee.commission.format_fixed(6),
            network_fee: fee.network_fee.format_fixed(6),
            total_fee: fee.total.format_fixed(6),
            commission_rate: fee.rate_fraction(),
            amount: amount.format_fixed(6),
        })
    }

    /// Failure payload for an error, including the supported-token list
    /// where the contract promises it.
    pub fn error_response(&self, err: &SwapError) -> ErrorResponse {
        let mut response = ErrorResponse {
            error: err.to_string(),
            kind: err.kind(),
            success: false,
            token: None,
            from_token: None,
            to_token: None,
            supported_tokens: None,
            txhash: None,
        };
        match err {
            SwapError::UnsupportedToken { token, supported } => {
                response.token = Some(token.clone());
                response.supported_tokens = Some(supported.clone());
            }
            SwapError::PairNotFound {
                from_asset,
                to_asset,
                ..
            } => {
                response.from_token = Some(from_asset.clone());
                response.to_token = Some(to_asset.clone());
                response.supported_tokens = Some(self.registry.supported_identifiers());
            }
            SwapError::Duplicate(txhash) => {
                response.txhash = Some(txhash.clone());
            }
            _ => {}
        }
        response
    }

    fn parse_amount(&self, input: &str, identifier: &str) -> Result<Amount, SwapError> {
        let decimals = self
            .registry
            .decimals_for(identifier)
            .unwrap_or(DEFAULT_CHAIN_DECIMALS);
        Amount::parse(input, decimals)
    }
}

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, SwapError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SwapError::MissingField(field));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::chain::{MockChainQuerier, PairInfo, SimulationOutcome};
    use crate::ledger::sqlite::SqliteSwapStore;
    use crate::ledger::{MockSwapStore, Network, SwapStatus, SwapType, WindowTotals};
    use chrono::DateTime;

    fn service(chain: MockChainQuerier, store: Arc<dyn SwapStore>) -> SwapService {
        SwapService::new(
            Arc::new(chain),
            store,
            FeeSettings::default(),
            RetryPolicy {
                max_attempts: 2,
                base_delay: std::time::Duration::from_millis(1),
            },
        )
    }

    fn record(txhash: &str) -> SwapRecord {
        SwapRecord {
            wallet_address: "terra1wallet".into(),
            network: Network::TerraClassic,
            status: SwapStatus::Completed,
            txhash: txhash.into(),
            timestamp: DateTime::from_timestamp(1_722_470_400, 0).unwrap(),
            swap_type: SwapType::Swap,
            fee: 0.0085,
            fee_rate: 0.0085,
            fee_currency: "LUNC".into(),
            network_fee: 0.001,
            network_fee_currency: "LUNC".into(),
            currency: "LUNC".into(),
            from_token: "uluna".into(),
            from_token_amount: 1.0,
            from_token_decimals: 6,
            from_token_symbol: "LUNC".into(),
            from_token_price: 0.00008,
            to_token: "uusd".into(),
            to_token_amount: 0.0125,
            to_token_decimals: 6,
            to_token_symbol: "USTC".into(),
            to_token_price: 0.015,
            contract_address: "terra1pool".into(),
            provider: "yourwallet".into(),
            slippage: 0.01,
        }
    }

    #[tokio::test]
    async fn excluded_token_quote_fails_without_any_network_call() {
        let mut chain = MockChainQuerier::new();
        chain.expect_query_pair().times(0);
        chain.expect_simulate_swap().times(0);

        let service = service(chain, Arc::new(MockSwapStore::new()));
        let result = service
            .get_quote(&QuoteRequest {
                from_token: "uluna2".into(),
                to_token: "uusd".into(),
                amount: "1000".into(),
            })
            .await;

        match result {
            Err(err @ SwapError::UnsupportedToken { .. }) => {
                let body = service.error_response(&err);
                assert_eq!(body.kind, ErrorKind::Validation);
                assert_eq!(body.token.as_deref(), Some("uluna2"));
                assert!(body
                    .supported_tokens
                    .unwrap()
                    .contains(&"uluna".to_string()));
            }
            other => panic!("expected UnsupportedToken, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn quote_returns_the_simulated_amount() {
        let mut chain = MockChainQuerier::new();
        chain.expect_query_pair().returning(|_, _| {
            Ok(Some(PairInfo {
                contract_addr: "terra1pool".into(),
                liquidity_token: None,
            }))
        });
        chain.expect_simulate_swap().returning(|_, _, amount| {
            Ok(SimulationOutcome {
                return_amount: amount.raw / 2,
                spread_amount: 0,
                commission_amount: 0,
            })
        });

        let service = service(chain, Arc::new(MockSwapStore::new()));
        let response = service
            .get_quote(&QuoteRequest {
                from_token: "uluna".into(),
                to_token: "uusd".into(),
                amount: "1000".into(),
            })
            .await
            .unwrap();

        assert_eq!(
            response,
            QuoteResponse {
                from_token: "uluna".into(),
                to_token: "uusd".into(),
                amount: "1000".into(),
                return_amount: "500".into(),
            }
        );
    }

    #[tokio::test]
    async fn same_token_pair_is_rejected() {
        let mut chain = MockChainQuerier::new();
        chain.expect_query_pair().times(0);

        let service = service(chain, Arc::new(MockSwapStore::new()));
        let result = service
            .get_quote(&QuoteRequest {
                from_token: "uluna".into(),
                to_token: "uluna".into(),
                amount: "1000".into(),
            })
            .await;
        assert!(matches!(result, Err(SwapError::SamePair(_))));
    }

    #[tokio::test]
    async fn prepare_swap_reference_scenario() {
        let mut chain = MockChainQuerier::new();
        chain.expect_query_pair().returning(|_, _| {
            Ok(Some(PairInfo {
                contract_addr: "terra1pool".into(),
                liquidity_token: None,
            }))
        });

        let service = service(chain, Arc::new(MockSwapStore::new()));
        let prepared = service
            .prepare_swap(&PrepareSwapRequest {
                sender: "addr1".into(),
                from_token: "uluna".into(),
                to_token: "uusd".into(),
                amount: "1000000".into(),
            })
            .await
            .unwrap();

        assert_eq!(prepared.fee.commission.raw, 8_500);
        assert_eq!(prepared.net_swap_amount.raw, 991_500);
        assert_eq!(prepared.messages.len(), 2);
        assert!(matches!(prepared.messages[0], ChainMsg::ExecuteContract(_)));
        assert!(matches!(prepared.messages[1], ChainMsg::Send(_)));

        let response = PrepareSwapResponse::from(prepared);
        assert!(response.success);
        assert_eq!(response.msgs.len(), 2);
    }

    #[tokio::test]
    async fn record_swap_round_trips_through_the_store() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let store = Arc::new(SqliteSwapStore::new(&temp.path().display().to_string()).unwrap());

        let service = service(MockChainQuerier::new(), store.clone());
        let response = service.record_swap(record("HASH-1")).await.unwrap();
        assert_eq!(response.message, "Swap created successfully");

        let (records, total) = store
            .list(
                &SwapFilter {
                    wallet_address: Some("terra1wallet".into()),
                    since: None,
                },
                1,
                10,
            )
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(records[0], response.record);
    }

    #[tokio::test]
    async fn duplicate_record_surfaces_the_duplicate_kind() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let store = Arc::new(SqliteSwapStore::new(&temp.path().display().to_string()).unwrap());

        let service = service(MockChainQuerier::new(), store);
        service.record_swap(record("HASH-DUP")).await.unwrap();

        let mut second = record("HASH-DUP");
        second.wallet_address = "terra1other".into();
        match service.record_swap(second).await {
            Err(err @ SwapError::Duplicate(_)) => {
                let body = service.error_response(&err);
                assert_eq!(body.kind, ErrorKind::Duplicate);
                assert_eq!(body.txhash.as_deref(), Some("HASH-DUP"));
            }
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_record_is_rejected_before_the_store_sees_it() {
        let mut store = MockSwapStore::new();
        store.expect_insert().times(0);
        store.expect_find_by_txhash().times(0);

        let service = service(MockChainQuerier::new(), Arc::new(store));
        let mut bad = record("HASH-1");
        bad.to_token = bad.from_token.clone();
        assert!(matches!(
            service.record_swap(bad).await,
            Err(SwapError::InvalidRecord { .. })
        ));
    }

    #[tokio::test]
    async fn list_swaps_compares_trailing_windows() {
        let mut store = MockSwapStore::new();
        store
            .expect_list()
            .returning(|_, _, _| Ok((vec![], 0)));
        store.expect_window_totals().returning(|_, window| {
            // current window has no end bound, previous does
            if window.end.is_none() {
                Ok(WindowTotals {
                    total_value: 150.0,
                    total_fee: 10.0,
                })
            } else {
                Ok(WindowTotals {
                    total_value: 100.0,
                    total_fee: 0.0,
                })
            }
        });
        store.expect_counts_by_from_symbol().returning(|_| {
            Ok(vec![
                TokenUsage {
                    symbol: "LUNC".into(),
                    count: 4,
                },
                TokenUsage {
                    symbol: "USTC".into(),
                    count: 1,
                },
            ])
        });

        let service = service(MockChainQuerier::new(), Arc::new(store));
        let response = service
            .list_swaps(&ListSwapsRequest {
                wallet_address: Some("terra1wallet".into()),
                time_frame: None,
                page: 0,
                page_size: 0,
            })
            .await
            .unwrap();

        assert_eq!(response.percentage_change_total_value.change, 50.0);
        assert!(response.percentage_change_total_value.is_positive);
        // previous fee total was zero and current is positive: +100%
        assert_eq!(response.percentage_change_total_fee.change, 100.0);
        assert!(response.percentage_change_total_fee.is_positive);
        assert_eq!(response.most_used_token.unwrap().symbol, "LUNC");
        assert!(response.success);
    }

    #[test]
    fn calculate_fee_formats_six_decimal_strings() {
        let service = service(MockChainQuerier::new(), Arc::new(MockSwapStore::new()));
        let response = service
            .calculate_fee(&FeeRequest {
                amount: "1000000".into(),
                from_token: "uluna".into(),
            })
            .unwrap();

        assert_eq!(
            response,
            FeeResponse {
                commission: "0.008500".into(),
                network_fee: "0.001000".into(),
                total_fee: "0.009500".into(),
                commission_rate: 0.0085,
                amount: "1.000000".into(),
            }
        );
    }

    #[test]
    fn calculate_fee_rejects_zero_and_garbage_amounts() {
        let service = service(MockChainQuerier::new(), Arc::new(MockSwapStore::new()));
        assert!(matches!(
            service.calculate_fee(&FeeRequest {
                amount: "0".into(),
                from_token: "uluna".into(),
            }),
            Err(SwapError::InvalidAmount(_))
        ));
        assert!(matches!(
            service.calculate_fee(&FeeRequest {
                amount: "abc".into(),
                from_token: "uluna".into(),
            }),
            Err(SwapError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn pair_not_found_payload_names_both_assets() {
        let mut chain = MockChainQuerier::new();
        chain.expect_query_pair().times(2).returning(|_, _| Ok(None));

        let service = service(chain, Arc::new(MockSwapStore::new()));
        let err = service
            .get_quote(&QuoteRequest {
                from_token: "uluna".into(),
                to_token: "uusd".into(),
                amount: "1000".into(),
            })
            .await
            .unwrap_err();

        let body = service.error_response(&err);
        assert_eq!(body.kind, ErrorKind::NotFound);
        assert_eq!(body.from_token.as_deref(), Some("uluna"));
        assert_eq!(body.to_token.as_deref(), Some("uusd"));
        assert!(body.supported_tokens.is_some());
    }
}
