use crate::error::ProvisionError;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A token entry of the `[tokens]` section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Token {
    address: Address,
}

impl Token {
    pub fn new(address: Address) -> Token {
        Token { address }
    }

    pub fn get_address(&self) -> Address {
        self.address
    }
}

/// Tokens by symbol. Market definitions refer to tokens through these symbols.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenRegistry {
    tokens: BTreeMap<String, Token>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, symbol: &str, token: Token) -> Self {
        self.tokens.insert(symbol.to_string(), token);
        self
    }

    pub fn get(&self, symbol: &str) -> Option<&Token> {
        self.tokens.get(symbol)
    }

    pub fn address_of(&self, symbol: &str) -> Result<Address, ProvisionError> {
        self.get(symbol).map(Token::get_address).ok_or_else(|| ProvisionError::UnknownToken(symbol.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = TokenRegistry::new().with_token("WETH", Token::new(Address::repeat_byte(0xee)));
        assert_eq!(registry.address_of("WETH").unwrap(), Address::repeat_byte(0xee));
        assert!(matches!(registry.address_of("WBTC"), Err(ProvisionError::UnknownToken(symbol)) if symbol == "WBTC"));
    }

    #[test]
    fn test_registry_from_toml() {
        let registry: TokenRegistry = toml::from_str(
            r#"
            [USDC]
            address = "0x0000000000000000000000000000000000000006"
            "#,
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("USDC").unwrap().get_address(), Address::with_last_byte(6));
    }
}
