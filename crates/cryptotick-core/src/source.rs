use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical provider identifiers used in metadata and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Hourly OHLCV history (`min-api.cryptocompare.com`).
    Cryptocompare,
    /// Market rankings and global capitalisation (`api.coingecko.com`).
    Coingecko,
    /// On-chain metric exports downloaded from blockchain.com charts.
    Blockchain,
}

impl ProviderId {
    pub const ALL: [Self; 3] = [Self::Cryptocompare, Self::Coingecko, Self::Blockchain];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cryptocompare => "cryptocompare",
            Self::Coingecko => "coingecko",
            Self::Blockchain => "blockchain",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cryptocompare" => Ok(Self::Cryptocompare),
            "coingecko" => Ok(Self::Coingecko),
            "blockchain" => Ok(Self::Blockchain),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_case_insensitively() {
        assert_eq!(
            ProviderId::from_str(" CoinGecko ").expect("must parse"),
            ProviderId::Coingecko
        );
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = ProviderId::from_str("yahoo").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidSource { .. }));
    }
}
