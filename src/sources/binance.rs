use crate::error::{AppError, Result};
use crate::types::{normalize_symbol, Candle};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Binance USDⓈ-M futures REST endpoint.
pub const BINANCE_FUTURES_API_URL: &str = "https://fapi.binance.com/fapi/v1";

/// Maximum klines Binance returns per request.
pub const MAX_KLINE_LIMIT: u32 = 1500;

/// Kline intervals accepted by Binance.
pub const KLINE_INTERVALS: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w", "1M",
];

/// Binance klines client.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl BinanceClient {
    /// Create a new Binance client.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("cryptosmc/1.0")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the most recent `limit` candles, oldest first.
    pub async fn fetch_klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        if !KLINE_INTERVALS.contains(&interval) {
            return Err(AppError::BadRequest(format!("Unsupported interval: {}", interval)));
        }
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(AppError::BadRequest("Symbol is required".to_string()));
        }
        let limit = limit.clamp(1, MAX_KLINE_LIMIT).to_string();

        let url = format!("{}/klines", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.as_str()),
                ("interval", interval),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "Binance klines for {} returned {}: {}",
                symbol,
                status,
                text.chars().take(200).collect::<String>()
            );
            return Err(AppError::ExternalApi(format!(
                "Binance klines error for {}: {}",
                symbol, status
            )));
        }

        let rows: Vec<Vec<Value>> = response.json().await?;
        let candles: Vec<Candle> = rows.iter().filter_map(|row| parse_kline(row)).collect();

        if candles.len() < rows.len() {
            warn!(
                "Dropped {} malformed klines for {}",
                rows.len() - candles.len(),
                symbol
            );
        }
        debug!("Fetched {} {} candles for {}", candles.len(), interval, symbol);

        Ok(candles)
    }
}

/// Parse one kline row: `[openTime, open, high, low, close, volume, ...]`
/// with prices encoded as strings.
pub fn parse_kline(row: &[Value]) -> Option<Candle> {
    if row.len() < 6 {
        return None;
    }

    let timestamp = row[0].as_i64()?;
    let number = |v: &Value| -> Option<f64> {
        match v {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    };

    Some(Candle {
        open: number(&row[1])?,
        high: number(&row[2])?,
        low: number(&row[3])?,
        close: number(&row[4])?,
        volume: number(&row[5])?,
        timestamp,
    })
}
