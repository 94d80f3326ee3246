//! Token registry for Terra Classic mainnet

/// Decimal scale used by the chain's `u`-prefixed micro denoms.
pub const DEFAULT_CHAIN_DECIMALS: u8 = 6;

/// How a supported token reaches the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Minted on Terra Classic itself.
    Native,
    /// Bridged in via Axelar; still a chain-level denom.
    Bridge,
}

/// Token information
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
    pub denom: String,
    pub decimals: u8,
    pub kind: TokenKind,
}

/// Registry of the tokens the service supports, keyed by on-chain denom.
///
/// Built once at startup and handed to the components that need it; asset
/// classification consults this table instead of re-deriving token shape
/// from identifier strings at every use site.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<TokenInfo>,
}

impl TokenRegistry {
    pub fn new(tokens: Vec<TokenInfo>) -> Self {
        Self { tokens }
    }

    /// The Terra Classic mainnet token set.
    pub fn terra_classic() -> Self {
        let token = |symbol: &str, name: &str, denom: &str, decimals: u8, kind: TokenKind| TokenInfo {
            symbol: symbol.to_string(),
            name: name.to_string(),
            denom: denom.to_string(),
            decimals,
            kind,
        };
        Self::new(vec![
            token("LUNC", "Luna Classic", "uluna", 6, TokenKind::Native),
            token("USTC", "TerraUSD Classic", "uusd", 6, TokenKind::Native),
            token("axlUSDC", "Axelar USDC", "uusdc", 6, TokenKind::Bridge),
            token("axlUSDT", "Axelar USDT", "uusdt", 6, TokenKind::Bridge),
            token("AXL", "Axelar", "uaxl", 6, TokenKind::Bridge),
            token("axlWBTC", "Axelar WBTC", "wbtc-satoshi", 8, TokenKind::Bridge),
            token("axlWETH", "Axelar WETH", "weth-wei", 18, TokenKind::Bridge),
            token("axlDAI", "Axelar DAI", "dai-wei", 18, TokenKind::Bridge),
            token("axlLINK", "Axelar LINK", "link-wei", 18, TokenKind::Bridge),
            token("axlUNI", "Axelar UNI", "uni-wei", 18, TokenKind::Bridge),
            token("axlMATIC", "Axelar MATIC", "wmatic-wei", 18, TokenKind::Bridge),
            token("BUSD", "Binance USD", "busd-wei", 18, TokenKind::Bridge),
        ])
    }

    pub fn by_identifier(&self, identifier: &str) -> Option<&TokenInfo> {
        self.tokens.iter().find(|token| token.denom == identifier)
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&TokenInfo> {
        self.tokens.iter().find(|token| token.symbol == symbol)
    }

    pub fn is_supported(&self, identifier: &str) -> bool {
        self.by_identifier(identifier).is_some()
    }

    /// Declared decimals for a known denom.
    pub fn decimals_for(&self, identifier: &str) -> Option<u8> {
        self.by_identifier(identifier).map(|token| token.decimals)
    }

    /// Display symbol for a known denom.
    pub fn symbol_for<'a>(&'a self, identifier: &str) -> Option<&'a str> {
        self.by_identifier(identifier).map(|token| token.symbol.as_str())
    }

    /// Identifier list attached to unsupported-token and pair-not-found
    /// error payloads.
    pub fn supported_identifiers(&self) -> Vec<String> {
        self.tokens.iter().map(|token| token.denom.clone()).collect()
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::terra_classic()
    }
}
