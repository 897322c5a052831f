use crate::sources::binance::BINANCE_FUTURES_API_URL;
use crate::types::parse_symbol_list;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Symbols analyzed when WATCHLIST is not set.
pub const DEFAULT_WATCHLIST: &[&str] = &[
    "BTCUSDT", "ETHUSDT", "SOLUSDT", "BNBUSDT", "XRPUSDT", "ADAUSDT", "AVAXUSDT", "DOGEUSDT",
];

/// Candle fetch settings.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Binance futures REST base URL.
    pub binance_api_url: String,
    /// Kline interval (e.g. "1h").
    pub interval: String,
    /// Number of candles fetched per analysis.
    pub limit: u32,
    /// Upstream request timeout.
    pub request_timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            binance_api_url: BINANCE_FUTURES_API_URL.to_string(),
            interval: "1h".to_string(),
            limit: 100,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Redis URL for the shared reliability pool. None keeps it in memory.
    pub redis_url: Option<String>,
    /// JSON file backing the local reliability scope.
    pub local_reliability_path: PathBuf,
    /// Symbols analyzed by `GET /api/analysis`.
    pub watchlist: Vec<String>,
    /// Initial favorites.
    pub favorites: Vec<String>,
    pub analysis: AnalysisConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            redis_url: None,
            local_reliability_path: PathBuf::from(".cryptosmc/local-learning.json"),
            watchlist: DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect(),
            favorites: Vec::new(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = env::var("HOST").unwrap_or(defaults.host);
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        // Empty lists fall back to the default watchlist
        let watchlist = env::var("WATCHLIST")
            .ok()
            .map(|s| parse_symbol_list(&s))
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.watchlist);

        let analysis = AnalysisConfig {
            binance_api_url: env::var("BINANCE_API_URL")
                .unwrap_or(defaults.analysis.binance_api_url),
            interval: env::var("KLINE_INTERVAL").unwrap_or(defaults.analysis.interval),
            limit: env::var("KLINE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.analysis.limit),
            request_timeout: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.analysis.request_timeout),
        };

        Self {
            host,
            port,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            local_reliability_path: env::var("LOCAL_RELIABILITY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.local_reliability_path),
            watchlist,
            favorites: env::var("FAVORITES")
                .map(|s| parse_symbol_list(&s))
                .unwrap_or_default(),
            analysis,
        }
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.watchlist.len(), 8);
        assert_eq!(config.watchlist[0], "BTCUSDT");
        assert!(config.redis_url.is_none());
        assert_eq!(config.analysis.interval, "1h");
        assert_eq!(config.analysis.limit, 100);
    }
}
