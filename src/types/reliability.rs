use super::SignalKind;
use serde::{Deserialize, Serialize};

/// Which observation pool a reliability query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReliabilityScope {
    /// Observations recorded on this installation.
    Local,
    /// Observations pooled across installations.
    Global,
}

impl ReliabilityScope {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "local" => Some(Self::Local),
            "global" => Some(Self::Global),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Global => "global",
        }
    }
}

/// Outcome counters for one (symbol, signal type) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityRecord {
    pub symbol: String,
    pub signal_type: SignalKind,
    /// Times the pattern was observed.
    pub occurrence_count: u64,
    /// Times the pattern preceded a significant move.
    pub preceding_move_count: u64,
}

impl ReliabilityRecord {
    /// Create an empty record.
    pub fn new(symbol: String, signal_type: SignalKind) -> Self {
        Self {
            symbol,
            signal_type,
            occurrence_count: 0,
            preceding_move_count: 0,
        }
    }

    /// Count one observation.
    pub fn observe(&mut self, preceded_significant_move: bool) {
        self.occurrence_count += 1;
        if preceded_significant_move {
            self.preceding_move_count += 1;
        }
    }

    /// Rounded percentage of observations that preceded a move.
    pub fn score(&self) -> u8 {
        reliability_pct(self.preceding_move_count, self.occurrence_count)
    }
}

/// round(100 * preceding / occurrences), 0 when nothing was observed.
pub fn reliability_pct(preceding: u64, occurrences: u64) -> u8 {
    if occurrences == 0 {
        return 0;
    }
    ((preceding as f64 / occurrences as f64) * 100.0)
        .round()
        .clamp(0.0, 100.0) as u8
}

/// One externally confirmed observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub symbol: String,
    pub signal_type: SignalKind,
    pub preceded_significant_move: bool,
}

/// Response for reliability endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityResponse {
    pub scope: ReliabilityScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    pub records: Vec<ReliabilityRecord>,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_observe() {
        let mut record = ReliabilityRecord::new("BTCUSDT".to_string(), SignalKind::FairValueGap);
        record.observe(true);
        record.observe(false);
        record.observe(true);

        assert_eq!(record.occurrence_count, 3);
        assert_eq!(record.preceding_move_count, 2);
        assert_eq!(record.score(), 67);
    }

    #[test]
    fn test_reliability_pct_zero_occurrences() {
        assert_eq!(reliability_pct(0, 0), 0);
        assert_eq!(reliability_pct(1, 2), 50);
        assert_eq!(reliability_pct(3, 3), 100);
    }

    #[test]
    fn test_scope_from_name() {
        assert_eq!(ReliabilityScope::from_name("local"), Some(ReliabilityScope::Local));
        assert_eq!(ReliabilityScope::from_name("GLOBAL"), Some(ReliabilityScope::Global));
        assert_eq!(ReliabilityScope::from_name("device"), None);
    }

    #[test]
    fn test_observation_deserialization() {
        let json = r#"{"symbol":"BTCUSDT","signalType":"FVG","precededSignificantMove":true}"#;
        let obs: Observation = serde_json::from_str(json).unwrap();
        assert_eq!(obs.symbol, "BTCUSDT");
        assert_eq!(obs.signal_type, SignalKind::FairValueGap);
        assert!(obs.preceded_significant_move);
    }
}
