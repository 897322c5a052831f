//! Swing point location.

use crate::types::{Candle, SwingKind, SwingPoint};

/// Default lookback on each side of a candidate candle.
pub const DEFAULT_LOOKBACK: usize = 5;

/// Find swing highs and lows.
///
/// Candle `i` (with `lookback <= i < len - lookback`) is a swing high when its
/// high is strictly above every other high in `[i - lookback, i + lookback]`,
/// and a swing low when its low is strictly below every other low in that
/// window. Both can hold for the same candle; the high is emitted first.
pub fn find_swing_points(candles: &[Candle], lookback: usize) -> Vec<SwingPoint> {
    let mut swings = Vec::new();
    let end = candles.len().saturating_sub(lookback);

    for i in lookback..end {
        let candle = &candles[i];
        let mut is_high = true;
        let mut is_low = true;

        for (j, other) in candles.iter().enumerate().take(i + lookback + 1).skip(i - lookback) {
            if j == i {
                continue;
            }
            if other.high >= candle.high {
                is_high = false;
            }
            if other.low <= candle.low {
                is_low = false;
            }
        }

        if is_high {
            swings.push(SwingPoint {
                index: i,
                price: candle.high,
                kind: SwingKind::High,
                timestamp: candle.timestamp,
            });
        }
        if is_low {
            swings.push(SwingPoint {
                index: i,
                price: candle.low,
                kind: SwingKind::Low,
                timestamp: candle.timestamp,
            });
        }
    }

    swings
}
