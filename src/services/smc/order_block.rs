//! Order block detection.

use crate::services::smc::{confidence, fmt_price, retain_most_recent, Detector};
use crate::types::{Candle, Direction, PriceBand, SignalKind, SmcSignal};

/// Order block detector.
///
/// An order block is the last opposing candle before a strong two-candle
/// move: a bearish candle followed by two bullish candles that lift the close
/// by more than `move_threshold` (bullish block), or the mirror image.
///
/// confidence = 40 + 30 * body / average range + 1000 * move, capped at 100.
pub struct OrderBlocks {
    /// Minimum close-to-close move over the two following candles (fraction).
    move_threshold: f64,
    /// Trailing candles used for the average range.
    range_window: usize,
    /// Most recent blocks kept.
    max_kept: usize,
}

impl Default for OrderBlocks {
    fn default() -> Self {
        Self {
            move_threshold: 0.005,
            range_window: 20,
            max_kept: 3,
        }
    }
}

impl OrderBlocks {
    /// Mean high-low range of the trailing window, or 1 when that mean is zero.
    fn average_range(&self, candles: &[Candle]) -> f64 {
        let start = candles.len().saturating_sub(self.range_window);
        let window = &candles[start..];
        if window.is_empty() {
            return 1.0;
        }
        let avg = window.iter().map(Candle::range).sum::<f64>() / window.len() as f64;
        if avg > 0.0 {
            avg
        } else {
            1.0
        }
    }

    fn bullish_block(&self, c: &Candle, next1: &Candle, next2: &Candle, avg_range: f64) -> Option<SmcSignal> {
        if !c.is_bearish() || !next1.is_bullish() || !next2.is_bullish() {
            return None;
        }
        let move_up = (next2.close - c.close) / c.close;
        if move_up <= self.move_threshold {
            return None;
        }

        let body_ratio = c.body_size() / avg_range;
        Some(SmcSignal {
            kind: SignalKind::OrderBlock,
            price_level: c.body_mid(),
            band: Some(PriceBand {
                low: c.close,
                high: c.open,
            }),
            direction: Direction::Bullish,
            confidence: confidence(40.0 + body_ratio * 30.0 + move_up * 1000.0),
            description: format!("Bullish OB at {}–{}", fmt_price(c.low), fmt_price(c.open)),
        })
    }

    fn bearish_block(&self, c: &Candle, next1: &Candle, next2: &Candle, avg_range: f64) -> Option<SmcSignal> {
        if !c.is_bullish() || !next1.is_bearish() || !next2.is_bearish() {
            return None;
        }
        let move_down = (c.close - next2.close) / c.close;
        if move_down <= self.move_threshold {
            return None;
        }

        let body_ratio = c.body_size() / avg_range;
        Some(SmcSignal {
            kind: SignalKind::OrderBlock,
            price_level: c.body_mid(),
            band: Some(PriceBand {
                low: c.open,
                high: c.close,
            }),
            direction: Direction::Bearish,
            confidence: confidence(40.0 + body_ratio * 30.0 + move_down * 1000.0),
            description: format!("Bearish OB at {}–{}", fmt_price(c.open), fmt_price(c.high)),
        })
    }
}

impl Detector for OrderBlocks {
    fn id(&self) -> &str {
        "order_block"
    }

    fn name(&self) -> &str {
        "Order Blocks"
    }

    fn min_candles(&self) -> usize {
        10
    }

    fn detect(&self, candles: &[Candle]) -> Vec<SmcSignal> {
        if candles.len() < self.min_candles() {
            return Vec::new();
        }

        let avg_range = self.average_range(candles);
        let mut signals = Vec::new();

        for i in 2..candles.len() - 2 {
            let (c, next1, next2) = (&candles[i], &candles[i + 1], &candles[i + 2]);
            signals.extend(self.bullish_block(c, next1, next2, avg_range));
            signals.extend(self.bearish_block(c, next1, next2, avg_range));
        }

        retain_most_recent(signals, self.max_kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, close: f64) -> Candle {
        Candle {
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 1.0,
            timestamp: 0,
        }
    }

    fn flat(price: f64, count: usize) -> Vec<Candle> {
        vec![candle(price, price); count]
    }

    #[test]
    fn test_order_block_id_and_name() {
        let detector = OrderBlocks::default();
        assert_eq!(detector.id(), "order_block");
        assert_eq!(detector.name(), "Order Blocks");
        assert_eq!(detector.min_candles(), 10);
    }

    #[test]
    fn test_order_block_insufficient_data() {
        let mut candles = flat(100.0, 3);
        candles.extend([candle(100.0, 95.0), candle(95.0, 97.0), candle(97.0, 99.0)]);
        assert!(OrderBlocks::default().detect(&candles).is_empty());
    }

    #[test]
    fn test_bullish_order_block() {
        let mut candles = flat(100.0, 5);
        candles.extend([candle(100.0, 95.0), candle(95.0, 97.0), candle(97.0, 99.0)]);
        candles.extend(flat(99.0, 5));

        let signals = OrderBlocks::default().detect(&candles);
        assert_eq!(signals.len(), 1);

        let ob = &signals[0];
        assert_eq!(ob.kind, SignalKind::OrderBlock);
        assert_eq!(ob.direction, Direction::Bullish);
        assert_eq!(ob.price_level, 97.5);
        assert_eq!(ob.band, Some(PriceBand { low: 95.0, high: 100.0 }));
        assert_eq!(ob.description, "Bullish OB at 95.0000–100.0000");
    }

    #[test]
    fn test_bullish_order_block_confidence() {
        // Average range over the trailing 20 candles is (5 + 2 + 2) / 20 = 0.45.
        let mut candles = flat(100.0, 5);
        candles.extend([candle(100.0, 95.0), candle(95.0, 97.0), candle(97.0, 99.0)]);
        candles.extend(flat(99.0, 17));

        let signals = OrderBlocks::default().detect(&candles);
        assert_eq!(signals.len(), 1);
        // 40 + (5 / 0.45) * 30 + (4 / 95) * 1000 > 100
        assert_eq!(signals[0].confidence, 100);
    }

    #[test]
    fn test_weak_move_is_ignored() {
        let mut candles = flat(100.0, 5);
        candles.extend([candle(100.0, 99.9), candle(99.9, 99.95), candle(99.95, 100.1)]);
        candles.extend(flat(100.1, 5));

        // move = 0.2 / 99.9 ~ 0.2% < 0.5%
        assert!(OrderBlocks::default().detect(&candles).is_empty());
    }

    #[test]
    fn test_bearish_order_block() {
        let mut candles = flat(100.0, 5);
        candles.extend([candle(100.0, 104.0), candle(104.0, 102.0), candle(102.0, 100.0)]);
        candles.extend(flat(100.0, 5));

        let signals = OrderBlocks::default().detect(&candles);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].direction, Direction::Bearish);
        assert_eq!(signals[0].band, Some(PriceBand { low: 100.0, high: 104.0 }));
        assert!(signals[0].confidence >= 40);
    }

    #[test]
    fn test_keeps_three_most_recent() {
        let mut candles = flat(100.0, 3);
        for _ in 0..5 {
            candles.extend([candle(100.0, 95.0), candle(95.0, 97.0), candle(97.0, 100.0)]);
        }
        candles.extend(flat(100.0, 3));

        let signals = OrderBlocks::default().detect(&candles);
        assert_eq!(signals.len(), 3);
        assert!(signals.iter().all(|s| s.direction == Direction::Bullish));
    }

    #[test]
    fn test_zero_range_market_uses_unit_denominator() {
        let detector = OrderBlocks::default();
        assert_eq!(detector.average_range(&flat(100.0, 30)), 1.0);
    }
}
