//! Fair value gap detection.

use crate::services::smc::{confidence, fmt_price, retain_most_recent, Detector};
use crate::types::{Candle, Direction, PriceBand, SignalKind, SmcSignal};

/// Fair value gap (FVG) detector.
///
/// A three-candle imbalance: the impulse candle in the middle moves so far
/// that the outer candles' ranges no longer overlap.
///
/// - Bullish: next.low > prev.high with a bullish middle candle
/// - Bearish: next.high < prev.low with a bearish middle candle
///
/// confidence = 50 + 5000 * gap fraction, capped at 100.
pub struct FairValueGaps {
    /// Minimum gap size relative to the reference price.
    min_gap: f64,
    /// Most recent gaps kept.
    max_kept: usize,
}

impl Default for FairValueGaps {
    fn default() -> Self {
        Self {
            min_gap: 0.001,
            max_kept: 3,
        }
    }
}

impl FairValueGaps {
    fn bullish_gap(&self, prev: &Candle, curr: &Candle, next: &Candle) -> Option<SmcSignal> {
        if next.low <= prev.high || !curr.is_bullish() {
            return None;
        }
        let gap = (next.low - prev.high) / prev.high;
        if gap <= self.min_gap {
            return None;
        }

        Some(SmcSignal {
            kind: SignalKind::FairValueGap,
            price_level: (prev.high + next.low) / 2.0,
            band: Some(PriceBand {
                low: prev.high,
                high: next.low,
            }),
            direction: Direction::Bullish,
            confidence: confidence(50.0 + gap * 5000.0),
            description: format!("Bullish FVG: {}–{}", fmt_price(prev.high), fmt_price(next.low)),
        })
    }

    fn bearish_gap(&self, prev: &Candle, curr: &Candle, next: &Candle) -> Option<SmcSignal> {
        if next.high >= prev.low || !curr.is_bearish() {
            return None;
        }
        let gap = (prev.low - next.high) / prev.low;
        if gap <= self.min_gap {
            return None;
        }

        Some(SmcSignal {
            kind: SignalKind::FairValueGap,
            price_level: (prev.low + next.high) / 2.0,
            band: Some(PriceBand {
                low: next.high,
                high: prev.low,
            }),
            direction: Direction::Bearish,
            confidence: confidence(50.0 + gap * 5000.0),
            description: format!("Bearish FVG: {}–{}", fmt_price(next.high), fmt_price(prev.low)),
        })
    }
}

impl Detector for FairValueGaps {
    fn id(&self) -> &str {
        "fair_value_gap"
    }

    fn name(&self) -> &str {
        "Fair Value Gaps"
    }

    fn min_candles(&self) -> usize {
        3
    }

    fn detect(&self, candles: &[Candle]) -> Vec<SmcSignal> {
        if candles.len() < self.min_candles() {
            return Vec::new();
        }

        let signals = candles
            .windows(3)
            .flat_map(|w| {
                let (prev, curr, next) = (&w[0], &w[1], &w[2]);
                self.bullish_gap(prev, curr, next)
                    .into_iter()
                    .chain(self.bearish_gap(prev, curr, next))
            })
            .collect();

        retain_most_recent(signals, self.max_kept)
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
    fn test_fvg_id_and_name() {
        let detector = FairValueGaps::default();
        assert_eq!(detector.id(), "fair_value_gap");
        assert_eq!(detector.name(), "Fair Value Gaps");
        assert_eq!(detector.min_candles(), 3);
    }

    #[test]
    fn test_fvg_insufficient_data() {
        let candles = vec![candle(99.5, 100.0, 99.0, 99.8), candle(100.0, 103.5, 99.8, 103.0)];
        assert!(FairValueGaps::default().detect(&candles).is_empty());
    }

    #[test]
    fn test_bullish_gap() {
        let candles = vec![
            candle(99.5, 100.0, 99.0, 99.8),
            candle(100.0, 103.5, 99.8, 103.0),
            candle(103.0, 104.0, 101.0, 103.5),
        ];
        let signals = FairValueGaps::default().detect(&candles);
        assert_eq!(signals.len(), 1);

        let fvg = &signals[0];
        assert_eq!(fvg.kind, SignalKind::FairValueGap);
        assert_eq!(fvg.direction, Direction::Bullish);
        assert_eq!(fvg.band, Some(PriceBand { low: 100.0, high: 101.0 }));
        assert_eq!(fvg.price_level, 100.5);
        // 50 + 0.01 * 5000
        assert_eq!(fvg.confidence, 100);
    }

    #[test]
    fn test_small_gap_confidence() {
        let candles = vec![
            candle(99.5, 100.0, 99.0, 99.8),
            candle(99.9, 100.5, 99.8, 100.4),
            candle(100.4, 100.6, 100.2, 100.5),
        ];
        let signals = FairValueGaps::default().detect(&candles);
        assert_eq!(signals.len(), 1);
        // gap 0.2% -> 50 + 10
        assert_eq!(signals[0].confidence, 60);
    }

    #[test]
    fn test_bearish_gap() {
        let candles = vec![
            candle(100.5, 101.0, 100.0, 100.2),
            candle(100.0, 100.2, 97.0, 97.5),
            candle(97.5, 98.0, 96.5, 97.0),
        ];
        let signals = FairValueGaps::default().detect(&candles);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].direction, Direction::Bearish);
        assert_eq!(signals[0].band, Some(PriceBand { low: 98.0, high: 100.0 }));
        assert_eq!(signals[0].description, "Bearish FVG: 98.0000–100.0000");
    }

    #[test]
    fn test_gap_requires_impulse_colour() {
        // Gap up but the middle candle closes red.
        let candles = vec![
            candle(99.5, 100.0, 99.0, 99.8),
            candle(103.0, 103.5, 99.8, 100.5),
            candle(103.0, 104.0, 101.0, 103.5),
        ];
        assert!(FairValueGaps::default().detect(&candles).is_empty());
    }

    #[test]
    fn test_tiny_gap_is_ignored() {
        let candles = vec![
            candle(99.5, 100.0, 99.0, 99.8),
            candle(99.9, 100.2, 99.8, 100.1),
            candle(100.1, 100.3, 100.05, 100.2),
        ];
        // 0.05% gap
        assert!(FairValueGaps::default().detect(&candles).is_empty());
    }

    #[test]
    fn test_keeps_three_most_recent() {
        let mut candles = Vec::new();
        let mut base = 100.0;
        for _ in 0..6 {
            candles.push(candle(base, base + 1.0, base - 1.0, base + 0.5));
            candles.push(candle(base + 0.5, base + 4.0, base + 0.4, base + 3.8));
            base += 3.0;
        }
        let signals = FairValueGaps::default().detect(&candles);
        assert_eq!(signals.len(), 3);
        assert!(signals.iter().all(|s| s.direction == Direction::Bullish));
    }
}
