//! Smart Money Concepts detection.
//!
//! Swing point location, the four pattern detectors, the aggregate score
//! and the recommendation mapping. Everything here is pure: each call works
//! on the candle slice it is given and keeps no state between calls.

pub mod fair_value_gap;
pub mod liquidity;
pub mod order_block;
pub mod score;
pub mod structure;
pub mod swing;

pub use fair_value_gap::FairValueGaps;
pub use liquidity::LiquidityZones;
pub use order_block::OrderBlocks;
pub use score::compute_overall_score;
pub use structure::StructureBreaks;
pub use swing::find_swing_points;

use crate::types::{Candle, SmcSignal};

/// Minimum candles for a full analysis.
pub const MIN_ANALYSIS_CANDLES: usize = 10;

/// Trait for implementing pattern detectors.
pub trait Detector: Send + Sync {
    /// Unique identifier for this detector.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Minimum number of candles required; shorter input yields nothing.
    fn min_candles(&self) -> usize;

    /// Detect patterns in the candle slice (oldest first).
    fn detect(&self, candles: &[Candle]) -> Vec<SmcSignal>;
}

/// All detectors in aggregation order.
pub fn all_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(OrderBlocks::default()),
        Box::new(FairValueGaps::default()),
        Box::new(StructureBreaks::default()),
        Box::new(LiquidityZones::default()),
    ]
}

/// Run every detector and concatenate their output.
pub fn run_analysis(candles: &[Candle]) -> Vec<SmcSignal> {
    run_detectors(&all_detectors(), candles)
}

/// Run the given detectors in order and concatenate their output.
pub fn run_detectors(detectors: &[Box<dyn Detector>], candles: &[Candle]) -> Vec<SmcSignal> {
    if candles.len() < MIN_ANALYSIS_CANDLES {
        return Vec::new();
    }

    detectors
        .iter()
        .flat_map(|detector| detector.detect(candles))
        .collect()
}

/// Round a raw confidence and cap it to 0..=100.
pub fn confidence(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Keep the last `max` entries, preserving their order.
pub fn retain_most_recent(mut signals: Vec<SmcSignal>, max: usize) -> Vec<SmcSignal> {
    let excess = signals.len().saturating_sub(max);
    signals.drain(..excess);
    signals
}

/// Keep the `max` highest-confidence entries. Equal confidences keep input order.
pub fn retain_strongest(mut signals: Vec<SmcSignal>, max: usize) -> Vec<SmcSignal> {
    signals.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    signals.truncate(max);
    signals
}

/// Price formatting used in signal descriptions.
pub fn fmt_price(price: f64) -> String {
    format!("{:.4}", price)
}
