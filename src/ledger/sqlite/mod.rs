//! SQLite-backed swap store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::Sqlite;
use tracing::debug;

mod models;
mod schema;

use crate::ledger::{
    SwapFilter, SwapRecord, SwapStore, TimeWindow, TokenUsage, WindowTotals,
};
use crate::shared::errors::SwapError;

use self::models::SwapRow;
use self::schema::swaps as tbl;

/// Swap ledger on SQLite behind an r2d2 pool.
///
/// The `txhash` primary key is the idempotency guarantee: concurrent
/// inserts of the same hash resolve to exactly one winner inside the
/// database, with the loser surfacing the duplicate error kind.
pub struct SqliteSwapStore {
    pool: Pool<ConnectionManager<SqliteConnection>>,
    busy_timeout_ms: i64,
    db_path: String,
}

impl SqliteSwapStore {
    pub fn new(path: &str) -> Result<Self, SwapError> {
        Self::new_with_busy_timeout(path, 5_000)
    }

    pub fn new_with_busy_timeout(path: &str, busy_timeout_ms: i64) -> Result<Self, SwapError> {
        let manager = ConnectionManager::<SqliteConnection>::new(path);
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .map_err(|err| SwapError::Persistence(format!("open sqlite pool at {path}: {err}")))?;
        let mut conn = pool
            .get()
            .map_err(|err| SwapError::Persistence(format!("open sqlite connection at {path}: {err}")))?;
        initialize_schema(&mut conn)
            .map_err(|err| SwapError::Persistence(format!("initialize sqlite schema at {path}: {err}")))?;
        apply_pragmas(&mut conn, busy_timeout_ms)
            .map_err(|err| SwapError::Persistence(format!("apply sqlite pragmas at {path}: {err}")))?;
        Ok(Self {
            pool,
            busy_timeout_ms,
            db_path: path.to_string(),
        })
    }

    fn get_conn(
        &self,
    ) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, SwapError> {
        let mut conn = self.pool.get().map_err(|err| {
            SwapError::Persistence(format!("open sqlite connection at {}: {err}", self.db_path))
        })?;
        apply_pragmas(&mut conn, self.busy_timeout_ms).map_err(|err| {
            SwapError::Persistence(format!("apply sqlite pragmas at {}: {err}", self.db_path))
        })?;
        Ok(conn)
    }

    fn to_row(record: &SwapRecord) -> SwapRow {
        SwapRow {
            txhash: record.txhash.clone(),
            wallet_address: record.wallet_address.clone(),
            network: record.network.as_str().to_string(),
            status: record.status.as_str().to_string(),
            timestamp: record.timestamp.timestamp_millis(),
            swap_type: record.swap_type.as_str().to_string(),
            fee: record.fee,
            fee_rate: record.fee_rate,
            fee_currency: record.fee_currency.clone(),
            network_fee: record.network_fee,
            network_fee_currency: record.network_fee_currency.clone(),
            currency: record.currency.clone(),
            from_token: record.from_token.clone(),
            from_token_amount: record.from_token_amount,
            from_token_decimals: i32::from(record.from_token_decimals),
            from_token_symbol: record.from_token_symbol.clone(),
            from_token_price: record.from_token_price,
            to_token: record.to_token.clone(),
            to_token_amount: record.to_token_amount,
            to_token_decimals: i32::from(record.to_token_decimals),
            to_token_symbol: record.to_token_symbol.clone(),
            to_token_price: record.to_token_price,
            contract_address: record.contract_address.clone(),
            provider: record.provider.clone(),
            slippage: record.slippage,
            created_at: Utc::now().timestamp_millis(),
        }
    }

    fn from_row(row: SwapRow) -> Result<SwapRecord, SwapError> {
        let corrupt = |field: &str, detail: String| {
            SwapError::Persistence(format!("corrupt stored swap field {field}: {detail}"))
        };
        Ok(SwapRecord {
            wallet_address: row.wallet_address,
            network: row
                .network
                .parse()
                .map_err(|err| corrupt("network", format!("{err}")))?,
            status: row
                .status
                .parse()
                .map_err(|err| corrupt("status", format!("{err}")))?,
            txhash: row.txhash,
            timestamp: DateTime::from_timestamp_millis(row.timestamp)
                .ok_or_else(|| corrupt("timestamp", row.timestamp.to_string()))?,
            swap_type: row
                .swap_type
                .parse()
                .map_err(|err| corrupt("type", format!("{err}")))?,
            fee: row.fee,
            fee_rate: row.fee_rate,
            fee_currency: row.fee_currency,
            network_fee: row.network_fee,
            network_fee_currency: row.network_fee_currency,
            currency: row.currency,
            from_token: row.from_token,
            from_token_amount: row.from_token_amount,
            from_token_decimals: u8::try_from(row.from_token_decimals)
                .map_err(|_| corrupt("from_token_decimals", row.from_token_decimals.to_string()))?,
            from_token_symbol: row.from_token_symbol,
            from_token_price: row.from_token_price,
            to_token: row.to_token,
            to_token_amount: row.to_token_amount,
            to_token_decimals: u8::try_from(row.to_token_decimals)
                .map_err(|_| corrupt("to_token_decimals", row.to_token_decimals.to_string()))?,
            to_token_symbol: row.to_token_symbol,
            to_token_price: row.to_token_price,
            contract_address: row.contract_address,
            provider: row.provider,
            slippage: row.slippage,
        })
    }
}

#[async_trait]
impl SwapStore for SqliteSwapStore {
    async fn insert(&self, record: &SwapRecord) -> Result<(), SwapError> {
        let mut conn = self.get_conn()?;
        let row = Self::to_row(record);
        diesel::insert_into(tbl::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    SwapError::Duplicate(record.txhash.clone())
                }
                other => SwapError::Persistence(format!("insert swap record: {other}")),
            })?;
        debug!(txhash = %record.txhash, "swap record stored");
        Ok(())
    }

    async fn find_by_txhash(&self, txhash: &str) -> Result<Option<SwapRecord>, SwapError> {
        let mut conn = self.get_conn()?;
        let row = tbl::table
            .find(txhash.to_string())
            .first::<SwapRow>(&mut conn)
            .optional()
            .map_err(|err| SwapError::Persistence(format!("find swap record: {err}")))?;
        row.map(Self::from_row).transpose()
    }

    async fn list(
        &self,
        filter: &SwapFilter,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<SwapRecord>, u64), SwapError> {
        let mut conn = self.get_conn()?;

        let mut count_query = tbl::table.select(count_star()).into_boxed::<Sqlite>();
        let mut page_query = tbl::table.into_boxed::<Sqlite>();
        if let Some(wallet) = &filter.wallet_address {
            count_query = count_query.filter(tbl::wallet_address.eq(wallet.clone()));
            page_query = page_query.filter(tbl::wallet_address.eq(wallet.clone()));
        }
        if let Some(since) = filter.since {
            let since = since.timestamp_millis();
            count_query = count_query.filter(tbl::timestamp.ge(since));
            page_query = page_query.filter(tbl::timestamp.ge(since));
        }

        let total: i64 = count_query
            .first(&mut conn)
            .map_err(|err| SwapError::Persistence(format!("count swap records: {err}")))?;

        let page = page.max(1);
        let skip = i64::from(page - 1) * i64::from(page_size);
        let rows = page_query
            .order(tbl::timestamp.desc())
            .offset(skip)
            .limit(i64::from(page_size))
            .load::<SwapRow>(&mut conn)
            .map_err(|err| SwapError::Persistence(format!("load swap records: {err}")))?;

        let records = rows
            .into_iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, total as u64))
    }

    async fn window_totals(
        &self,
        filter: &SwapFilter,
        window: &TimeWindow,
    ) -> Result<WindowTotals, SwapError> {
        let mut conn = self.get_conn()?;

        let mut query = tbl::table
            .select((sum(tbl::from_token_amount), sum(tbl::fee)))
            .into_boxed::<Sqlite>();
        if let Some(wallet) = &filter.wallet_address {
            query = query.filter(tbl::wallet_address.eq(wallet.clone()));
        }
        if let Some(since) = filter.since {
            query = query.filter(tbl::timestamp.ge(since.timestamp_millis()));
        }
        query = query.filter(tbl::timestamp.ge(window.start.timestamp_millis()));
        if let Some(end) = window.end {
            query = query.filter(tbl::timestamp.lt(end.timestamp_millis()));
        }

        let (total_value, total_fee): (Option<f64>, Option<f64>) = query
            .first(&mut conn)
            .map_err(|err| SwapError::Persistence(format!("sum swap window: {err}")))?;
        Ok(WindowTotals {
            total_value: total_value.unwrap_or(0.0),
            total_fee: total_fee.unwrap_or(0.0),
        })
    }

    async fn counts_by_from_symbol(
        &self,
        filter: &SwapFilter,
    ) -> Result<Vec<TokenUsage>, SwapError> {
        let mut conn = self.get_conn()?;

        let mut query = tbl::table
            .select(tbl::from_token_symbol)
            .into_boxed::<Sqlite>();
        if let Some(wallet) = &filter.wallet_address {
            query = query.filter(tbl::wallet_address.eq(wallet.clone()));
        }
        if let Some(since) = filter.since {
            query = query.filter(tbl::timestamp.ge(since.timestamp_millis()));
        }

        let symbols = query
            .load::<String>(&mut conn)
            .map_err(|err| SwapError::Persistence(format!("load from-token symbols: {err}")))?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for symbol in symbols {
            *counts.entry(symbol).or_insert(0) += 1;
        }
        let mut usage: Vec<TokenUsage> = counts
            .into_iter()
            .map(|(symbol, count)| TokenUsage { symbol, count })
            .collect();
        // alphabetical tie-break keeps the statistic stable across backends
        usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.symbol.cmp(&b.symbol)));
        Ok(usage)
    }

    async fn purge_expired(&self, older_than: DateTime<Utc>) -> Result<u64, SwapError> {
        let mut conn = self.get_conn()?;
        let removed =
            diesel::delete(tbl::table.filter(tbl::timestamp.lt(older_than.timestamp_millis())))
                .execute(&mut conn)
                .map_err(|err| SwapError::Persistence(format!("purge expired records: {err}")))?;
        debug!(removed, "expired swap records purged");
        Ok(removed as u64)
    }
}

fn initialize_schema(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(
        r#"
        CREATE TABLE IF NOT EXISTS swaps (
            txhash TEXT NOT NULL,
            wallet_address TEXT NOT NULL,
            network TEXT NOT NULL,
            status TEXT NOT NULL,
            timestamp BIGINT NOT NULL,
            swap_type TEXT NOT NULL,
            fee DOUBLE NOT NULL,
            fee_rate DOUBLE NOT NULL,
            fee_currency TEXT NOT NULL,
            network_fee DOUBLE NOT NULL,
            network_fee_currency TEXT NOT NULL,
            currency TEXT NOT NULL,
            from_token TEXT NOT NULL,
            from_token_amount DOUBLE NOT NULL,
            from_token_decimals INTEGER NOT NULL,
            from_token_symbol TEXT NOT NULL,
            from_token_price DOUBLE NOT NULL,
            to_token TEXT NOT NULL,
            to_token_amount DOUBLE NOT NULL,
            to_token_decimals INTEGER NOT NULL,
            to_token_symbol TEXT NOT NULL,
            to_token_price DOUBLE NOT NULL,
            contract_address TEXT NOT NULL,
            provider TEXT NOT NULL,
            slippage DOUBLE NOT NULL,
            created_at BIGINT NOT NULL,
            PRIMARY KEY (txhash)
        );
        CREATE INDEX IF NOT EXISTS idx_swaps_wallet_ts ON swaps(wallet_address, timestamp DESC);
        CREATE INDEX IF NOT EXISTS idx_swaps_status_ts ON swaps(status, timestamp DESC);
        CREATE INDEX IF NOT EXISTS idx_swaps_symbols ON swaps(from_token_symbol, to_token_symbol);
        CREATE INDEX IF NOT EXISTS idx_swaps_ts ON swaps(timestamp);
    "#,
    )
}

fn apply_pragmas(conn: &mut SqliteConnection, busy_timeout_ms: i64) -> QueryResult<()> {
    conn.batch_execute(&format!(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
        PRAGMA busy_timeout={busy_timeout_ms};
    "#
    ))
}
