//! Swap ledger - persistent settlement records and analytics

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::errors::SwapError;

pub mod sqlite;

/// Default record retention horizon: 90 days.
pub const DEFAULT_RETENTION_SECS: i64 = 7_776_000;

/// Network a swap settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    #[serde(rename = "terra-classic")]
    TerraClassic,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::TerraClassic => "terra-classic",
        }
    }
}

impl FromStr for Network {
    type Err = SwapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "terra-classic" => Ok(Network::TerraClassic),
            other => Err(SwapError::InvalidRecord {
                field: "network",
                reason: format!("unknown network '{other}'"),
            }),
        }
    }
}

/// Outcome state of a recorded swap. `pending` may move to exactly one of
/// the terminal states; records may also be created directly terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Completed,
    Failed,
}

impl SwapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Completed => "completed",
            SwapStatus::Failed => "failed",
        }
    }
}

impl FromStr for SwapStatus {
    type Err = SwapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(SwapStatus::Pending),
            "completed" => Ok(SwapStatus::Completed),
            "failed" => Ok(SwapStatus::Failed),
            other => Err(SwapError::InvalidRecord {
                field: "status",
                reason: format!("unknown status '{other}'"),
            }),
        }
    }
}

/// Record category; only swaps today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapType {
    Swap,
}

impl SwapType {
    pub fn as_str(&self) -> &'static str {
        "swap"
    }
}

impl FromStr for SwapType {
    type Err = SwapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "swap" => Ok(SwapType::Swap),
            other => Err(SwapError::InvalidRecord {
                field: "type",
                reason: format!("unknown type '{other}'"),
            }),
        }
    }
}

fn default_provider() -> String {
    "yourwallet".to_string()
}

fn default_slippage() -> f64 {
    0.01
}

/// A settled (or attempted) swap, created exactly once per broadcast
/// attempt. Amounts and prices here are display-unit values for analytics;
/// message construction works on raw integers and never reads these back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRecord {
    pub wallet_address: String,
    pub network: Network,
    pub status: SwapStatus,
    pub txhash: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub swap_type: SwapType,

    pub fee: f64,
    pub fee_rate: f64,
    pub fee_currency: String,
    pub network_fee: f64,
    pub network_fee_currency: String,
    pub currency: String,

    pub from_token: String,
    pub from_token_amount: f64,
    pub from_token_decimals: u8,
    pub from_token_symbol: String,
    pub from_token_price: f64,

    pub to_token: String,
    pub to_token_amount: f64,
    pub to_token_decimals: u8,
    pub to_token_symbol: String,
    pub to_token_price: f64,

    pub contract_address: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_slippage")]
    pub slippage: f64,
}

impl SwapRecord {
    pub fn validate(&self) -> Result<(), SwapError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> SwapError {
            SwapError::InvalidRecord {
                field,
                reason: reason.into(),
            }
        }

        if self.wallet_address.trim().is_empty() {
            return Err(invalid("walletAddress", "must not be empty"));
        }
        if self.txhash.trim().is_empty() {
            return Err(invalid("txhash", "must not be empty"));
        }
        if self.from_token == self.to_token {
            return Err(invalid("toToken", "fromToken and toToken must differ"));
        }
        if self.from_token_amount <= 0.0 {
            return Err(invalid("fromTokenAmount", "must be positive"));
        }
        if self.to_token_amount <= 0.0 {
            return Err(invalid("toTokenAmount", "must be positive"));
        }
        if self.from_token_price <= 0.0 {
            return Err(invalid("fromTokenPrice", "must be positive"));
        }
        if self.to_token_price <= 0.0 {
            return Err(invalid("toTokenPrice", "must be positive"));
        }
        if self.fee < 0.0 || self.network_fee < 0.0 {
            return Err(invalid("fee", "fee components must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.fee_rate) {
            return Err(invalid("feeRate", "must be a fraction between 0 and 1"));
        }
        if !(0.0..=1.0).contains(&self.slippage) {
            return Err(invalid("slippage", "must be a fraction between 0 and 1"));
        }
        Ok(())
    }
}

/// Time-frame filter accepted by the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFrame {
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl TimeFrame {
    pub fn start_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeFrame::SevenDays => now - Duration::days(7),
            TimeFrame::ThirtyDays => now - Duration::days(30),
            TimeFrame::ThreeMonths => now
                .checked_sub_months(Months::new(3))
                .unwrap_or(now - Duration::days(90)),
            TimeFrame::OneYear => now
                .checked_sub_months(Months::new(12))
                .unwrap_or(now - Duration::days(365)),
        }
    }
}

impl FromStr for TimeFrame {
    type Err = SwapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "7d" => Ok(TimeFrame::SevenDays),
            "30d" => Ok(TimeFrame::ThirtyDays),
            "3m" => Ok(TimeFrame::ThreeMonths),
            "1y" => Ok(TimeFrame::OneYear),
            other => Err(SwapError::InvalidRecord {
                field: "timeFrame",
                reason: format!("unknown time frame '{other}', expected 7d, 30d, 3m or 1y"),
            }),
        }
    }
}

/// Record filter shared by list and aggregate queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwapFilter {
    pub wallet_address: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

/// Half-open time window `[start, end)`; an absent end means "until now".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

/// Summed value and fee over a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WindowTotals {
    pub total_value: f64,
    pub total_fee: f64,
}

/// Occurrence count of a from-token symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub symbol: String,
    pub count: u64,
}

/// Windowed aggregate used by dashboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapAggregate {
    pub total_value: f64,
    pub total_fee: f64,
    pub most_used_from_symbol: Option<TokenUsage>,
    pub counts_by_from_symbol: Vec<TokenUsage>,
}

/// Persistent store for swap records.
///
/// Insert-only: txhash uniqueness is enforced atomically by the store's own
/// constraint (safe across service instances), never by in-process locking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapStore: Send + Sync {
    /// Inserts a record; fails with the duplicate kind when the txhash is
    /// already present, leaving the existing record untouched.
    async fn insert(&self, record: &SwapRecord) -> Result<(), SwapError>;

    async fn find_by_txhash(&self, txhash: &str) -> Result<Option<SwapRecord>, SwapError>;

    /// Filtered page of records sorted by timestamp descending, plus the
    /// total matching count. Pages are 1-based.
    async fn list(
        &self,
        filter: &SwapFilter,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<SwapRecord>, u64), SwapError>;

    /// Sums from-token amounts and fees over a window.
    async fn window_totals(
        &self,
        filter: &SwapFilter,
        window: &TimeWindow,
    ) -> Result<WindowTotals, SwapError>;

    /// Per-symbol occurrence counts, ordered count-descending with symbol
    /// as the deterministic tie-break.
    async fn counts_by_from_symbol(
        &self,
        filter: &SwapFilter,
    ) -> Result<Vec<TokenUsage>, SwapError>;

    /// Deletes records older than the cutoff; returns how many went.
    async fn purge_expired(&self, older_than: DateTime<Utc>) -> Result<u64, SwapError>;
}

/// Assembles the dashboard aggregate: windowed sums plus the most used
/// from-token within the filter.
pub async fn aggregate(
    store: &dyn SwapStore,
    filter: &SwapFilter,
    window: &TimeWindow,
) -> Result<SwapAggregate, SwapError> {
    let (totals, counts) = futures::try_join!(
        store.window_totals(filter, window),
        store.counts_by_from_symbol(filter),
    )?;
    Ok(SwapAggregate {
        total_value: totals.total_value,
        total_fee: totals.total_fee,
        most_used_from_symbol: counts.first().cloned(),
        counts_by_from_symbol: counts,
    })
}

/// Relative change between two window totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentageChange {
    pub change: f64,
    pub is_positive: bool,
}

/// Percentage change of `current` against `previous`, as displayed on the
/// dashboard: magnitude rounded to one decimal, direction carried
/// separately. A zero previous window is defined policy, not an error:
/// any growth from zero reads as +100%, zero-to-zero as +0%.
pub fn percentage_change(current: f64, previous: f64) -> PercentageChange {
    if previous == 0.0 {
        return PercentageChange {
            change: if current > 0.0 { 100.0 } else { 0.0 },
            is_positive: true,
        };
    }
    let raw = ((current - previous) / previous) * 100.0;
    PercentageChange {
        change: (raw.abs() * 10.0).round() / 10.0,
        is_positive: raw >= 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(txhash: &str) -> SwapRecord {
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

    #[test]
    fn percentage_change_reference_cases() {
        assert_eq!(
            percentage_change(150.0, 100.0),
            PercentageChange {
                change: 50.0,
                is_positive: true
            }
        );
        assert_eq!(
            percentage_change(50.0, 100.0),
            PercentageChange {
                change: 50.0,
                is_positive: false
            }
        );
        assert_eq!(
            percentage_change(10.0, 0.0),
            PercentageChange {
                change: 100.0,
                is_positive: true
            }
        );
        assert_eq!(
            percentage_change(0.0, 0.0),
            PercentageChange {
                change: 0.0,
                is_positive: true
            }
        );
    }

    #[test]
    fn percentage_change_rounds_magnitude_to_one_decimal() {
        let change = percentage_change(100.456, 100.0);
        assert_eq!(change.change, 0.5);
        assert!(change.is_positive);
    }

    #[test]
    fn time_frames_parse_and_compute_starts() {
        let now = DateTime::from_timestamp(1_722_470_400, 0).unwrap();
        assert_eq!("7d".parse::<TimeFrame>().unwrap(), TimeFrame::SevenDays);
        assert_eq!(
            TimeFrame::SevenDays.start_from(now),
            now - Duration::days(7)
        );
        assert_eq!(
            TimeFrame::ThirtyDays.start_from(now),
            now - Duration::days(30)
        );
        assert!("2w".parse::<TimeFrame>().is_err());
    }

    #[tokio::test]
    async fn aggregate_combines_totals_and_usage() {
        let mut store = MockSwapStore::new();
        store.expect_window_totals().returning(|_, _| {
            Ok(WindowTotals {
                total_value: 42.5,
                total_fee: 0.4,
            })
        });
        store.expect_counts_by_from_symbol().returning(|_| {
            Ok(vec![
                TokenUsage {
                    symbol: "LUNC".into(),
                    count: 3,
                },
                TokenUsage {
                    symbol: "USTC".into(),
                    count: 1,
                },
            ])
        });

        let window = TimeWindow {
            start: DateTime::from_timestamp(1_722_470_400, 0).unwrap(),
            end: None,
        };
        let stats = aggregate(&store, &SwapFilter::default(), &window)
            .await
            .unwrap();
        assert_eq!(stats.total_value, 42.5);
        assert_eq!(stats.total_fee, 0.4);
        assert_eq!(stats.most_used_from_symbol.unwrap().symbol, "LUNC");
        assert_eq!(stats.counts_by_from_symbol.len(), 2);
    }

    #[test]
    fn record_validation_catches_bad_fields() {
        assert!(sample_record("ABC123").validate().is_ok());

        let mut record = sample_record("ABC123");
        record.txhash = " ".into();
        assert!(record.validate().is_err());

        let mut record = sample_record("ABC123");
        record.to_token = record.from_token.clone();
        assert!(record.validate().is_err());

        let mut record = sample_record("ABC123");
        record.from_token_amount = 0.0;
        assert!(record.validate().is_err());

        let mut record = sample_record("ABC123");
        record.fee_rate = 1.5;
        assert!(record.validate().is_err());

        let mut record = sample_record("ABC123");
        record.slippage = -0.2;
        assert!(record.validate().is_err());
    }

    #[test]
    fn record_round_trips_through_the_wire_shape() {
        let record = sample_record("ABC123");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["walletAddress"], "terra1wallet");
        assert_eq!(json["network"], "terra-classic");
        assert_eq!(json["type"], "swap");
        assert_eq!(json["fromTokenSymbol"], "LUNC");
        let back: SwapRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn enums_round_trip_through_strings() {
        assert_eq!(
            "completed".parse::<SwapStatus>().unwrap(),
            SwapStatus::Completed
        );
        assert_eq!(SwapStatus::Pending.as_str(), "pending");
        assert!("settled".parse::<SwapStatus>().is_err());
        assert_eq!(
            "terra-classic".parse::<Network>().unwrap(),
            Network::TerraClassic
        );
        assert!("terra-2".parse::<Network>().is_err());
        assert_eq!("swap".parse::<SwapType>().unwrap(), SwapType::Swap);
    }
}
