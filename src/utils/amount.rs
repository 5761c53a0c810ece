use crate::error::ProvisionError;
use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Decimals of the protocol's fixed point factors.
pub const FLOAT_PRECISION: u32 = 30;

/// `value * 10^decimals`
pub fn expand_decimals(value: U256, decimals: u32) -> Result<U256, ProvisionError> {
    pow10(decimals)
        .and_then(|exp| value.checked_mul(exp))
        .ok_or_else(|| ProvisionError::InvalidValue(format!("{value}e{decimals} overflows uint256")))
}

fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(exp))
}

/// Parses `1234`, `1_000`, `0xff`, `5e29` or `0.5e30` into a uint256.
pub fn parse_amount(raw: &str) -> Result<U256, ProvisionError> {
    let invalid = || ProvisionError::InvalidValue(raw.to_string());
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return Err(invalid());
    }

    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        return U256::from_str_radix(hex, 16).map_err(|_| invalid());
    }

    let Some((mantissa, exponent)) = cleaned.split_once(['e', 'E']) else {
        return U256::from_str_radix(&cleaned, 10).map_err(|_| invalid());
    };

    let exponent: u32 = exponent.parse().map_err(|_| invalid())?;
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let frac_digits = u32::try_from(frac_part.len()).map_err(|_| invalid())?;
    if frac_digits > exponent {
        // would leave a fractional remainder
        return Err(invalid());
    }

    let digits = format!("{int_part}{frac_part}");
    let base = U256::from_str_radix(&digits, 10).map_err(|_| invalid())?;
    expand_decimals(base, exponent - frac_digits)
}

/// A uint256 configuration value that can be written in TOML as an integer or a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Amount(pub U256);

impl Amount {
    pub fn value(&self) -> U256 {
        self.0
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for Amount {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_amount(s).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAmount {
            Int(u64),
            Text(String),
        }

        match RawAmount::deserialize(deserializer)? {
            RawAmount::Int(value) => Ok(Amount::from(value)),
            RawAmount::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_hex() {
        assert_eq!(parse_amount("1_000").unwrap(), U256::from(1000));
        assert_eq!(parse_amount("0xff").unwrap(), U256::from(255));
        assert_eq!(parse_amount(" 42 ").unwrap(), U256::from(42));
    }

    #[test]
    fn test_parse_scientific() {
        assert_eq!(parse_amount("5e29").unwrap(), expand_decimals(U256::from(5), 29).unwrap());
        assert_eq!(parse_amount("0.5e30").unwrap(), expand_decimals(U256::from(5), 29).unwrap());
        assert_eq!(parse_amount("1.25E2").unwrap(), U256::from(125));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("1.234e2").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("1e100").is_err());
    }

    #[test]
    fn test_expand_decimals() {
        assert_eq!(expand_decimals(U256::from(1), FLOAT_PRECISION).unwrap(), U256::from(10).pow(U256::from(30)));
        assert!(expand_decimals(U256::MAX, 1).is_err());
    }

    #[test]
    fn test_deserialize_amount() {
        #[derive(Deserialize)]
        struct Holder {
            a: Amount,
            b: Amount,
        }
        let holder: Holder = toml::from_str("a = 7\nb = \"1e3\"").unwrap();
        assert_eq!(holder.a.value(), U256::from(7));
        assert_eq!(holder.b.value(), U256::from(1000));
    }
}
