use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};

use classic_swap::application::services::{
    FeeRequest, ListSwapsRequest, PrepareSwapRequest, PrepareSwapResponse, QuoteRequest,
};
use classic_swap::config::Config;
use classic_swap::infrastructure::chain::ChainQuerier;
use classic_swap::ledger::{aggregate, SwapFilter, SwapRecord, SwapStore, TimeFrame, TimeWindow};
use classic_swap::shared::errors::SwapError;
use classic_swap::{LcdChainClient, SqliteSwapStore, SwapService};

#[derive(Parser, Debug)]
#[command(version, about = "Swap preparation and settlement recording CLI for Terra Classic")]
struct Args {
    /// Path to config file (optional)
    #[arg(long)]
    config: Option<String>,

    /// LCD endpoint URL (overrides config)
    #[arg(long)]
    lcd_url: Option<String>,

    /// SQLite database path (overrides config)
    #[arg(long)]
    db_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get a price quote for a token pair
    Quote {
        #[arg(long)]
        from_token: String,
        #[arg(long)]
        to_token: String,
        /// Amount in the from-token's smallest unit
        #[arg(long)]
        amount: String,
    },
    /// Build the unsigned swap + commission messages for signing
    Prepare {
        #[arg(long)]
        sender: String,
        #[arg(long)]
        from_token: String,
        #[arg(long)]
        to_token: String,
        /// Amount in the from-token's smallest unit
        #[arg(long)]
        amount: String,
    },
    /// Calculate commission and network fees for an amount
    Fee {
        /// Amount in the from-token's smallest unit
        #[arg(long)]
        amount: String,
        #[arg(long)]
        from_token: String,
    },
    /// Record a settled swap from a JSON payload file
    Record {
        /// Path to a SwapRecord JSON document
        #[arg(long)]
        file: String,
    },
    /// List recorded swaps with dashboard analytics
    List {
        /// Filter by wallet address
        #[arg(long)]
        address: Option<String>,
        /// Time frame filter: 7d, 30d, 3m or 1y
        #[arg(long)]
        time_frame: Option<String>,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "10")]
        page_size: u32,
    },
    /// Windowed swap totals and token usage for dashboards
    Stats {
        /// Filter by wallet address
        #[arg(long)]
        address: Option<String>,
        /// Time frame scoping the usage counts: 7d, 30d, 3m or 1y
        #[arg(long)]
        time_frame: Option<String>,
    },
    /// Delete records older than the retention horizon
    Purge,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::default()
    };
    if let Some(lcd_url) = args.lcd_url {
        config.chain.lcd_url = lcd_url;
    }
    if let Some(db_path) = args.db_path {
        config.store.db_path = db_path;
    }

    let chain: Arc<dyn ChainQuerier> = Arc::new(
        LcdChainClient::new(&config.chain).context("build LCD chain client")?,
    );
    let store = Arc::new(
        SqliteSwapStore::new(&config.store.db_path).context("open swap store")?,
    );
    let service = SwapService::new(
        chain,
        store.clone(),
        config.fees.clone(),
        config.retry.policy(),
    );

    match args.command {
        Command::Quote {
            from_token,
            to_token,
            amount,
        } => {
            let request = QuoteRequest {
                from_token,
                to_token,
                amount,
            };
            match service.get_quote(&request).await {
                Ok(response) => print_json(&response)?,
                Err(err) => fail(&service, &err)?,
            }
        }
        Command::Prepare {
            sender,
            from_token,
            to_token,
            amount,
        } => {
            let request = PrepareSwapRequest {
                sender,
                from_token,
                to_token,
                amount,
            };
            match service.prepare_swap(&request).await {
                Ok(prepared) => print_json(&PrepareSwapResponse::from(prepared))?,
                Err(err) => fail(&service, &err)?,
            }
        }
        Command::Fee { amount, from_token } => {
            let request = FeeRequest { amount, from_token };
            match service.calculate_fee(&request) {
                Ok(response) => print_json(&response)?,
                Err(err) => fail(&service, &err)?,
            }
        }
        Command::Record { file } => {
            let payload = std::fs::read_to_string(&file)
                .with_context(|| format!("read swap record from {file}"))?;
            let record: SwapRecord =
                serde_json::from_str(&payload).context("parse swap record payload")?;
            match service.record_swap(record).await {
                Ok(response) => print_json(&response)?,
                Err(err) => fail(&service, &err)?,
            }
        }
        Command::List {
            address,
            time_frame,
            page,
            page_size,
        } => {
            let time_frame = time_frame
                .map(|frame| frame.parse::<TimeFrame>())
                .transpose()
                .map_err(|err| anyhow::anyhow!("{err}"))?;
            let request = ListSwapsRequest {
                wallet_address: address,
                time_frame,
                page,
                page_size,
            };
            match service.list_swaps(&request).await {
                Ok(response) => print_json(&response)?,
                Err(err) => fail(&service, &err)?,
            }
        }
        Command::Stats {
            address,
            time_frame,
        } => {
            let time_frame = time_frame
                .map(|frame| frame.parse::<TimeFrame>())
                .transpose()
                .map_err(|err| anyhow::anyhow!("{err}"))?;
            let now = Utc::now();
            let filter = SwapFilter {
                wallet_address: address,
                since: time_frame.map(|frame| frame.start_from(now)),
            };
            let window = TimeWindow {
                start: now - Duration::days(30),
                end: None,
            };
            match aggregate(store.as_ref(), &filter, &window).await {
                Ok(stats) => print_json(&stats)?,
                Err(err) => fail(&service, &err)?,
            }
        }
        Command::Purge => {
            let cutoff = Utc::now() - Duration::seconds(config.store.retention_secs);
            let removed = store.purge_expired(cutoff).await.map_err(|err| anyhow::anyhow!("{err}"))?;
            println!("removed {removed} expired swap records");
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fail(service: &SwapService, err: &SwapError) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&service.error_response(err))?
    );
    std::process::exit(1)
}
