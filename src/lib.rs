//! Classic-swap - Terra Classic swap preparation and settlement recording
//! Built with Domain-Driven Design principles

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ledger;
pub mod shared;

// Re-export main types for convenience
pub use application::services::SwapService;
pub use domain::pair::PairLocator;
pub use domain::quote::QuoteEngine;
pub use domain::swap::SwapBuilder;
pub use infrastructure::chain::LcdChainClient;
pub use ledger::sqlite::SqliteSwapStore;
