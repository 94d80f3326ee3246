//! Asset reference resolution at the system boundary

use std::sync::Arc;

use crate::domain::asset::registry::TokenRegistry;
use crate::shared::errors::SwapError;
use crate::shared::types::AssetRef;

/// Terra 2.0 Luna. Syntactically a valid denom, but it belongs to a
/// different chain; a transaction built with it would be well-formed JSON
/// and meaningless on-chain, so it is rejected before any network call.
pub const EXCLUDED_WRONG_NETWORK_DENOM: &str = "uluna2";

/// Deprecated alias some clients still send for the Luna Classic denom.
const LEGACY_LUNA_ALIAS: &str = "ulunc";

const CONTRACT_ADDRESS_PREFIX: &str = "terra1";

/// Classifies raw token identifiers into [`AssetRef`]s.
///
/// Registry lookup wins; the `u`-prefix native-denom convention survives
/// only as a fallback for identifiers the registry does not know.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    registry: Arc<TokenRegistry>,
}

impl AssetResolver {
    pub fn new(registry: Arc<TokenRegistry>) -> Self {
        Self { registry }
    }

    /// Maps deprecated aliases onto their canonical denom.
    pub fn normalize(identifier: &str) -> &str {
        if identifier == LEGACY_LUNA_ALIAS {
            "uluna"
        } else {
            identifier
        }
    }

    pub fn classify(&self, identifier: &str) -> Result<AssetRef, SwapError> {
        let identifier = Self::normalize(identifier.trim());
        if identifier.is_empty() {
            return Err(SwapError::MissingField("token"));
        }
        if identifier == EXCLUDED_WRONG_NETWORK_DENOM {
            return Err(SwapError::UnsupportedToken {
                token: identifier.to_string(),
                supported: self.registry.supported_identifiers(),
            });
        }
        if let Some(token) = self.registry.by_identifier(identifier) {
            return Ok(AssetRef::native(&token.denom));
        }
        if identifier.starts_with(CONTRACT_ADDRESS_PREFIX) {
            return Ok(AssetRef::contract(identifier));
        }
        if identifier.starts_with('u') {
            return Ok(AssetRef::native(identifier));
        }
        Ok(AssetRef::contract(identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> AssetResolver {
        AssetResolver::new(Arc::new(TokenRegistry::terra_classic()))
    }

    #[test]
    fn registry_denoms_classify_as_native() {
        let resolver = resolver();
        assert_eq!(resolver.classify("uluna").unwrap(), AssetRef::native("uluna"));
        // bridge denoms do not start with 'u' but are still chain-level
        assert_eq!(
            resolver.classify("wbtc-satoshi").unwrap(),
            AssetRef::native("wbtc-satoshi")
        );
    }

    #[test]
    fn terra_addresses_classify_as_contracts() {
        let resolver = resolver();
        let address = "terra1abcdefabcdefabcdefabcdefabcdefabcdef00";
        assert_eq!(resolver.classify(address).unwrap(), AssetRef::contract(address));
    }

    #[test]
    fn unknown_micro_denoms_fall_back_to_native() {
        let resolver = resolver();
        assert_eq!(resolver.classify("ukrw").unwrap(), AssetRef::native("ukrw"));
    }

    #[test]
    fn wrong_network_token_is_rejected_with_supported_list() {
        let resolver = resolver();
        match resolver.classify("uluna2") {
            Err(SwapError::UnsupportedToken { token, supported }) => {
                assert_eq!(token, "uluna2");
                assert!(supported.contains(&"uluna".to_string()));
            }
            other => panic!("expected UnsupportedToken, got {other:?}"),
        }
    }

    #[test]
    fn legacy_alias_normalizes_to_canonical_denom() {
        let resolver = resolver();
        assert_eq!(resolver.classify("ulunc").unwrap(), AssetRef::native("uluna"));
    }

    #[test]
    fn empty_identifier_is_a_missing_field() {
        let resolver = resolver();
        assert!(matches!(
            resolver.classify("   "),
            Err(SwapError::MissingField("token"))
        ));
    }
}
