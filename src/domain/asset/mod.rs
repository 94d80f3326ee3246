//! Asset classification and the supported-token registry

pub mod registry;
pub mod resolver;

pub use registry::{TokenInfo, TokenKind, TokenRegistry, DEFAULT_CHAIN_DECIMALS};
pub use resolver::{AssetResolver, EXCLUDED_WRONG_NETWORK_DENOM};
