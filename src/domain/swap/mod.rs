//! Swap transaction building

pub mod messages;
pub mod swap_builder;

pub use messages::ChainMsg;
pub use swap_builder::{PreparedSwap, SwapBuilder};
