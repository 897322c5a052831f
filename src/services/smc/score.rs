//! Overall directional score.

use crate::types::SmcSignal;

/// Adjustment applied to favorite symbols, in the direction of the score.
const FAVORITE_BONUS: f64 = 5.0;

/// Reduce a signal list to a score in [-100, 100].
///
/// Each signal contributes `±confidence * weight` (sign from its direction);
/// the sum is normalised by the total `confidence * weight`. Favorites are
/// pushed 5 points further from zero (towards -5 when the score is exactly 0).
/// An empty list scores 0.
pub fn compute_overall_score(signals: &[SmcSignal], is_favorite: bool) -> f64 {
    if signals.is_empty() {
        return 0.0;
    }

    let mut score = 0.0;
    let mut total_weight = 0.0;

    for signal in signals {
        let weighted = signal.confidence as f64 * signal.kind.weight();
        score += signal.direction.multiplier() * weighted;
        total_weight += weighted;
    }

    let normalized = if total_weight > 0.0 {
        (score / total_weight) * 100.0
    } else {
        0.0
    };

    let bonus = match (is_favorite, normalized > 0.0) {
        (false, _) => 0.0,
        (true, true) => FAVORITE_BONUS,
        (true, false) => -FAVORITE_BONUS,
    };

    (normalized + bonus).clamp(-100.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, SignalKind};

    fn signal(kind: SignalKind, direction: Direction, confidence: u8) -> SmcSignal {
        SmcSignal {
            kind,
            price_level: 100.0,
            band: None,
            direction,
            confidence,
            description: String::new(),
        }
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(compute_overall_score(&[], false), 0.0);
        assert_eq!(compute_overall_score(&[], true), 0.0);
    }

    #[test]
    fn test_unanimous_signals_saturate() {
        let bullish = vec![
            signal(SignalKind::OrderBlock, Direction::Bullish, 80),
            signal(SignalKind::FairValueGap, Direction::Bullish, 60),
        ];
        assert_eq!(compute_overall_score(&bullish, false), 100.0);
        assert_eq!(compute_overall_score(&bullish, true), 100.0);

        let bearish = vec![signal(SignalKind::LiquidityZone, Direction::Bearish, 45)];
        assert_eq!(compute_overall_score(&bearish, false), -100.0);
    }

    #[test]
    fn test_weighted_mix() {
        // (80 * 2 - 60 * 1.5) / (80 * 2 + 60 * 1.5) = 70 / 250
        let signals = vec![
            signal(SignalKind::OrderBlock, Direction::Bullish, 80),
            signal(SignalKind::FairValueGap, Direction::Bearish, 60),
        ];
        let score = compute_overall_score(&signals, false);
        assert!((score - 28.0).abs() < 1e-9);

        let favorite = compute_overall_score(&signals, true);
        assert!((favorite - 33.0).abs() < 1e-9);
    }

    #[test]
    fn test_choch_outweighs_liquidity() {
        let signals = vec![
            signal(SignalKind::ChangeOfCharacter, Direction::Bearish, 60),
            signal(SignalKind::LiquidityZone, Direction::Bullish, 60),
        ];
        // (-180 + 60) / 240 = -50%
        let score = compute_overall_score(&signals, false);
        assert!((score + 50.0).abs() < 1e-9);
        assert!((compute_overall_score(&signals, true) + 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_balanced_favorite_leans_negative() {
        let signals = vec![
            signal(SignalKind::OrderBlock, Direction::Bullish, 50),
            signal(SignalKind::OrderBlock, Direction::Bearish, 50),
        ];
        assert_eq!(compute_overall_score(&signals, false), 0.0);
        assert_eq!(compute_overall_score(&signals, true), -5.0);
    }

    #[test]
    fn test_zero_confidence_signals() {
        let signals = vec![signal(SignalKind::BreakOfStructure, Direction::Bullish, 0)];
        assert_eq!(compute_overall_score(&signals, false), 0.0);
    }
}
