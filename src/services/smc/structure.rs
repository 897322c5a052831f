//! Break of structure (BOS) and change of character (CHoCH) detection.
//!
//! Four independent checks share one swing selection:
//!
//! | check          | swing context          | break condition      |
//! |----------------|------------------------|----------------------|
//! | bullish BOS    | higher high            | close above last high |
//! | bearish CHoCH  | higher high            | close below last low  |
//! | bearish BOS    | lower low              | close below last low  |
//! | bullish CHoCH  | lower low              | close above last high |
//!
//! Any combination may fire on the same candle.

use crate::services::smc::{confidence, find_swing_points, fmt_price, Detector};
use crate::types::{Candle, Direction, SignalKind, SmcSignal, SwingPoint};

/// Swing highs and lows from the most recent swings, oldest first.
#[derive(Debug, Clone, Default)]
pub struct SwingStructure {
    pub highs: Vec<SwingPoint>,
    pub lows: Vec<SwingPoint>,
}

impl SwingStructure {
    /// Split the last `recent` swings into highs and lows.
    pub fn from_swings(swings: &[SwingPoint], recent: usize) -> Self {
        let start = swings.len().saturating_sub(recent);
        let recent = &swings[start..];

        let mut highs: Vec<SwingPoint> = recent.iter().filter(|s| s.is_high()).copied().collect();
        let mut lows: Vec<SwingPoint> = recent.iter().filter(|s| s.is_low()).copied().collect();
        highs.sort_by_key(|s| s.index);
        lows.sort_by_key(|s| s.index);

        Self { highs, lows }
    }

    /// (previous, last) swing highs.
    fn last_two_highs(&self) -> Option<(&SwingPoint, &SwingPoint)> {
        last_two(&self.highs)
    }

    /// (previous, last) swing lows.
    fn last_two_lows(&self) -> Option<(&SwingPoint, &SwingPoint)> {
        last_two(&self.lows)
    }
}

fn last_two(points: &[SwingPoint]) -> Option<(&SwingPoint, &SwingPoint)> {
    match points {
        [.., prev, last] => Some((prev, last)),
        _ => None,
    }
}

/// Higher high, and the close clears the last high.
pub fn bullish_bos(structure: &SwingStructure, close: f64) -> Option<SmcSignal> {
    let (prev_high, last_high) = structure.last_two_highs()?;
    if last_high.price <= prev_high.price || close <= last_high.price {
        return None;
    }

    let strength = (close - prev_high.price) / prev_high.price;
    Some(SmcSignal {
        kind: SignalKind::BreakOfStructure,
        price_level: prev_high.price,
        band: None,
        direction: Direction::Bullish,
        confidence: confidence(55.0 + strength * 2000.0),
        description: format!("Bullish BOS above {}", fmt_price(prev_high.price)),
    })
}

/// Higher high, but the close falls through the last low.
pub fn bearish_choch(structure: &SwingStructure, close: f64) -> Option<SmcSignal> {
    let (prev_high, last_high) = structure.last_two_highs()?;
    let (_, last_low) = structure.last_two_lows()?;
    if last_high.price <= prev_high.price || close >= last_low.price {
        return None;
    }

    let strength = (last_low.price - close) / last_low.price;
    Some(SmcSignal {
        kind: SignalKind::ChangeOfCharacter,
        price_level: last_low.price,
        band: None,
        direction: Direction::Bearish,
        confidence: confidence(60.0 + strength * 2000.0),
        description: format!("Bearish CHoCH below {}", fmt_price(last_low.price)),
    })
}

/// Lower low, and the close falls through the last low.
pub fn bearish_bos(structure: &SwingStructure, close: f64) -> Option<SmcSignal> {
    let (prev_low, last_low) = structure.last_two_lows()?;
    if last_low.price >= prev_low.price || close >= last_low.price {
        return None;
    }

    let strength = (prev_low.price - close) / prev_low.price;
    Some(SmcSignal {
        kind: SignalKind::BreakOfStructure,
        price_level: prev_low.price,
        band: None,
        direction: Direction::Bearish,
        confidence: confidence(55.0 + strength * 2000.0),
        description: format!("Bearish BOS below {}", fmt_price(prev_low.price)),
    })
}

/// Lower low, but the close clears the last high.
pub fn bullish_choch(structure: &SwingStructure, close: f64) -> Option<SmcSignal> {
    let (prev_low, last_low) = structure.last_two_lows()?;
    let (_, last_high) = structure.last_two_highs()?;
    if last_low.price >= prev_low.price || close <= last_high.price {
        return None;
    }

    let strength = (close - last_high.price) / last_high.price;
    Some(SmcSignal {
        kind: SignalKind::ChangeOfCharacter,
        price_level: last_high.price,
        band: None,
        direction: Direction::Bullish,
        confidence: confidence(60.0 + strength * 2000.0),
        description: format!("Bullish CHoCH above {}", fmt_price(last_high.price)),
    })
}

/// Structure break detector.
pub struct StructureBreaks {
    lookback: usize,
    /// Number of most recent swings considered.
    recent_swings: usize,
}

impl Default for StructureBreaks {
    fn default() -> Self {
        Self {
            lookback: 3,
            recent_swings: 8,
        }
    }
}

impl Detector for StructureBreaks {
    fn id(&self) -> &str {
        "structure_break"
    }

    fn name(&self) -> &str {
        "Structure Breaks (BOS/CHoCH)"
    }

    fn min_candles(&self) -> usize {
        15
    }

    fn detect(&self, candles: &[Candle]) -> Vec<SmcSignal> {
        if candles.len() < self.min_candles() {
            return Vec::new();
        }

        let swings = find_swing_points(candles, self.lookback);
        if swings.len() < 4 {
            return Vec::new();
        }

        let structure = SwingStructure::from_swings(&swings, self.recent_swings);
        if structure.highs.len() < 2 || structure.lows.len() < 2 {
            return Vec::new();
        }

        let Some(close) = candles.last().map(|c| c.close) else {
            return Vec::new();
        };

        [
            bullish_bos(&structure, close),
            bearish_choch(&structure, close),
            bearish_bos(&structure, close),
            bullish_choch(&structure, close),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
