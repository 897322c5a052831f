use serde::{Deserialize, Serialize};

/// OHLCV candle for one interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Interval open time (Unix milliseconds).
    pub timestamp: i64,
}

impl Candle {
    /// Absolute size of the candle body.
    pub fn body_size(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Full high-to-low range.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Midpoint of the candle body.
    pub fn body_mid(&self) -> f64 {
        (self.open + self.close) / 2.0
    }
}

/// Which extreme a swing point marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwingKind {
    High,
    Low,
}

/// Local price extremum relative to a symmetric lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    /// Position of the candle in the analysed slice.
    pub index: usize,
    /// The candle's high for swing highs, its low for swing lows.
    pub price: f64,
    pub kind: SwingKind,
    pub timestamp: i64,
}

impl SwingPoint {
    pub fn is_high(&self) -> bool {
        self.kind == SwingKind::High
    }

    pub fn is_low(&self) -> bool {
        self.kind == SwingKind::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            open,
            high,
            low,
            close,
            volume: 1.0,
            timestamp: 0,
        }
    }

    #[test]
    fn test_candle_colour() {
        assert!(candle(100.0, 106.0, 99.0, 105.0).is_bullish());
        assert!(candle(105.0, 106.0, 99.0, 100.0).is_bearish());

        let doji = candle(100.0, 101.0, 99.0, 100.0);
        assert!(!doji.is_bullish());
        assert!(!doji.is_bearish());
    }

    #[test]
    fn test_candle_measurements() {
        let c = candle(100.0, 106.0, 98.0, 95.0);
        assert_eq!(c.body_size(), 5.0);
        assert_eq!(c.range(), 8.0);
        assert_eq!(c.body_mid(), 97.5);
    }

    #[test]
    fn test_swing_kind_serialization() {
        let json = serde_json::to_string(&SwingKind::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
