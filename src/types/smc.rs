use serde::{Deserialize, Serialize};
use std::fmt;

/// Smart Money Concepts pattern family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalKind {
    OrderBlock,
    #[serde(rename = "FVG")]
    FairValueGap,
    #[serde(rename = "BOS")]
    BreakOfStructure,
    #[serde(rename = "CHoCH")]
    ChangeOfCharacter,
    LiquidityZone,
}

impl SignalKind {
    pub const ALL: [SignalKind; 5] = [
        SignalKind::OrderBlock,
        SignalKind::FairValueGap,
        SignalKind::BreakOfStructure,
        SignalKind::ChangeOfCharacter,
        SignalKind::LiquidityZone,
    ];

    /// Parse from the short code used on the wire and in storage keys.
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim() {
            "OrderBlock" | "OB" => Some(Self::OrderBlock),
            "FVG" => Some(Self::FairValueGap),
            "BOS" => Some(Self::BreakOfStructure),
            "CHoCH" | "CHOCH" => Some(Self::ChangeOfCharacter),
            "LiquidityZone" => Some(Self::LiquidityZone),
            _ => None,
        }
    }

    /// Short code, matching the serialized form.
    pub fn code(&self) -> &'static str {
        match self {
            Self::OrderBlock => "OrderBlock",
            Self::FairValueGap => "FVG",
            Self::BreakOfStructure => "BOS",
            Self::ChangeOfCharacter => "CHoCH",
            Self::LiquidityZone => "LiquidityZone",
        }
    }

    /// Weight of this pattern family in the overall score.
    pub fn weight(&self) -> f64 {
        match self {
            Self::ChangeOfCharacter => 3.0,
            Self::BreakOfStructure => 2.5,
            Self::OrderBlock => 2.0,
            Self::FairValueGap => 1.5,
            Self::LiquidityZone => 1.0,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Directional bias of a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    /// +1 for bullish, -1 for bearish.
    pub fn multiplier(&self) -> f64 {
        match self {
            Direction::Bullish => 1.0,
            Direction::Bearish => -1.0,
        }
    }
}

/// Price band covered by a zone-like pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub low: f64,
    pub high: f64,
}

/// A single detected pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmcSignal {
    pub kind: SignalKind,
    pub price_level: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<PriceBand>,
    pub direction: Direction,
    /// Confidence from 0 to 100.
    pub confidence: u8,
    pub description: String,
}

/// Coarse recommendation derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Sell")]
    StrongSell,
    Sell,
    Neutral,
    Buy,
    #[serde(rename = "Strong Buy")]
    StrongBuy,
}

impl Recommendation {
    /// Classify a score in [-100, 100].
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 60.0 => Recommendation::StrongBuy,
            s if s >= 20.0 => Recommendation::Buy,
            s if s > -20.0 => Recommendation::Neutral,
            s if s > -60.0 => Recommendation::Sell,
            _ => Recommendation::StrongSell,
        }
    }

    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Neutral => "Neutral",
            Recommendation::Sell => "Sell",
            Recommendation::StrongSell => "Strong Sell",
        }
    }
}

/// Full analysis of one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub symbol: String,
    /// Signals in detector order.
    pub signals: Vec<SmcSignal>,
    /// Directional score from -100 (bearish) to +100 (bullish).
    pub overall_score: f64,
    pub recommendation: Recommendation,
    pub is_favorite: bool,
    /// Reliability score from this device's observations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_score: Option<u8>,
    /// Reliability score from the shared observation pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_score: Option<u8>,
    /// Unix timestamp (milliseconds) when computed.
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(Recommendation::from_score(100.0), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(60.0), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(59.9), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(20.0), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(19.9), Recommendation::Neutral);
        assert_eq!(Recommendation::from_score(0.0), Recommendation::Neutral);
        assert_eq!(Recommendation::from_score(-19.9), Recommendation::Neutral);
        assert_eq!(Recommendation::from_score(-20.0), Recommendation::Sell);
        assert_eq!(Recommendation::from_score(-59.9), Recommendation::Sell);
        assert_eq!(Recommendation::from_score(-60.0), Recommendation::StrongSell);
        assert_eq!(Recommendation::from_score(-100.0), Recommendation::StrongSell);
    }

    #[test]
    fn test_recommendation_serializes_as_label() {
        for rec in [
            Recommendation::StrongBuy,
            Recommendation::Buy,
            Recommendation::Neutral,
            Recommendation::Sell,
            Recommendation::StrongSell,
        ] {
            let json = serde_json::to_string(&rec).unwrap();
            assert_eq!(json, format!("\"{}\"", rec.label()));
        }
    }

    #[test]
    fn test_signal_kind_codes_round_trip() {
        for kind in SignalKind::ALL {
            assert_eq!(SignalKind::from_code(kind.code()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.code()));
        }
        assert_eq!(SignalKind::from_code("RSI"), None);
    }

    #[test]
    fn test_signal_kind_weights() {
        assert_eq!(SignalKind::ChangeOfCharacter.weight(), 3.0);
        assert_eq!(SignalKind::BreakOfStructure.weight(), 2.5);
        assert_eq!(SignalKind::OrderBlock.weight(), 2.0);
        assert_eq!(SignalKind::FairValueGap.weight(), 1.5);
        assert_eq!(SignalKind::LiquidityZone.weight(), 1.0);
    }

    #[test]
    fn test_signal_skips_missing_band() {
        let signal = SmcSignal {
            kind: SignalKind::BreakOfStructure,
            price_level: 101.5,
            band: None,
            direction: Direction::Bullish,
            confidence: 70,
            description: "Bullish BOS above 101.5000".to_string(),
        };
        let json = serde_json::to_string(&signal).unwrap();
        assert!(json.contains("\"priceLevel\":101.5"));
        assert!(json.contains("\"kind\":\"BOS\""));
        assert!(!json.contains("band"));
    }
}
