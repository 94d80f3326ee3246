//! Fee calculation

pub mod fee_calculator;

pub use fee_calculator::{compute_fee, FeeBreakdown, FeeSettings};
