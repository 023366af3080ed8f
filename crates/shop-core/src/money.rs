//! # Money
//!
//! Currency handling. All amounts in the shop are stored as integers in the
//! currency's smallest unit (kobo, cents, ...).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    USD,
    NGN,
    EUR,
    GBP,
    JPY,
    CAD,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::NGN => "ngn",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
            Currency::CAD => "cad",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, most others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Format an amount in smallest units for display (e.g. "NGN 1500.00")
    pub fn display(&self, amount: i64) -> String {
        match self.decimal_places() {
            0 => format!("{} {}", self, amount),
            places => {
                let divisor = 10_i64.pow(places as u32);
                format!(
                    "{} {}.{:0width$}",
                    self,
                    amount / divisor,
                    (amount % divisor).abs(),
                    width = places as usize
                )
            }
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "usd" => Ok(Currency::USD),
            "ngn" => Ok(Currency::NGN),
            "eur" => Ok(Currency::EUR),
            "gbp" => Ok(Currency::GBP),
            "jpy" => Ok(Currency::JPY),
            "cad" => Ok(Currency::CAD),
            other => Err(format!("Unsupported currency: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Currency::NGN.display(150_050), "NGN 1500.50");
        assert_eq!(Currency::USD.display(905), "USD 9.05");
        assert_eq!(Currency::JPY.display(1200), "JPY 1200");
    }

    #[test]
    fn test_parse() {
        assert_eq!("NGN".parse::<Currency>().unwrap(), Currency::NGN);
        assert!("xyz".parse::<Currency>().is_err());
    }
}
