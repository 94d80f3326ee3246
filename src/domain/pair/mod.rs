//! Pair location

pub mod pair_locator;

pub use pair_locator::{PairLocator, PoolResolution};
