//! Liquidity zone detection.

use crate::services::smc::{confidence, find_swing_points, fmt_price, retain_strongest, Detector};
use crate::types::{Candle, Direction, SignalKind, SmcSignal, SwingPoint};

/// Liquidity zone detector.
///
/// Resting stop orders pile up beyond swing extremes, more so where several
/// swings sit at nearly the same price. Each recent swing becomes a zone
/// whose confidence grows with the number of neighbouring swings:
/// 45 + 15 per neighbour within `proximity`.
///
/// Swing highs mark sell-side liquidity above price (bearish), swing lows
/// mark buy-side liquidity below price (bullish).
pub struct LiquidityZones {
    lookback: usize,
    /// Number of most recent swings considered.
    recent_swings: usize,
    /// Relative distance within which two swings count as clustered.
    proximity: f64,
    /// Strongest zones kept.
    max_kept: usize,
}

impl Default for LiquidityZones {
    fn default() -> Self {
        Self {
            lookback: 4,
            recent_swings: 10,
            proximity: 0.003,
            max_kept: 3,
        }
    }
}

impl LiquidityZones {
    /// Number of other swings within `proximity` of the swing at `pos`.
    fn nearby_count(&self, swings: &[SwingPoint], pos: usize) -> usize {
        let price = swings[pos].price;
        swings
            .iter()
            .enumerate()
            .filter(|&(i, other)| i != pos && ((other.price - price).abs() / price) < self.proximity)
            .count()
    }

    fn zone(swing: &SwingPoint, nearby: usize) -> SmcSignal {
        let (direction, description) = if swing.is_high() {
            (
                Direction::Bearish,
                format!("Sell-side liquidity at {}", fmt_price(swing.price)),
            )
        } else {
            (
                Direction::Bullish,
                format!("Buy-side liquidity at {}", fmt_price(swing.price)),
            )
        };

        SmcSignal {
            kind: SignalKind::LiquidityZone,
            price_level: swing.price,
            band: None,
            direction,
            confidence: confidence(45.0 + nearby as f64 * 15.0),
            description,
        }
    }
}

impl Detector for LiquidityZones {
    fn id(&self) -> &str {
        "liquidity_zone"
    }

    fn name(&self) -> &str {
        "Liquidity Zones"
    }

    fn min_candles(&self) -> usize {
        10
    }

    fn detect(&self, candles: &[Candle]) -> Vec<SmcSignal> {
        if candles.len() < self.min_candles() {
            return Vec::new();
        }

        let swings = find_swing_points(candles, self.lookback);
        let recent = &swings[swings.len().saturating_sub(self.recent_swings)..];

        let zones = recent
            .iter()
            .enumerate()
            .map(|(pos, swing)| Self::zone(swing, self.nearby_count(recent, pos)))
            .collect();

        retain_strongest(zones, self.max_kept)
    }
}
