//! Provider adapters.

pub mod coingecko;
pub mod cryptocompare;

pub use coingecko::CoinGeckoAdapter;
pub use cryptocompare::CryptoCompareAdapter;
