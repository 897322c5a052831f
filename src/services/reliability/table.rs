//! In-memory reliability counters.

use crate::types::{normalize_symbol, reliability_pct, ReliabilityRecord, SignalKind};
use dashmap::DashMap;

/// Outcome counters keyed by (symbol, signal type).
///
/// Owned by whoever creates it; share it with `Arc`. Symbols are normalised
/// to upper case so "btcusdt" and "BTCUSDT" hit the same record.
#[derive(Debug, Default)]
pub struct ReliabilityTable {
    records: DashMap<(String, SignalKind), ReliabilityRecord>,
}

impl ReliabilityTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one observation, creating the record on first sight.
    /// Returns the updated record.
    pub fn record_observation(
        &self,
        symbol: &str,
        signal_type: SignalKind,
        preceded_significant_move: bool,
    ) -> ReliabilityRecord {
        let symbol = normalize_symbol(symbol);
        let mut entry = self
            .records
            .entry((symbol.clone(), signal_type))
            .or_insert_with(|| ReliabilityRecord::new(symbol, signal_type));
        entry.observe(preceded_significant_move);
        entry.clone()
    }

    /// Pooled reliability over every signal type seen for `symbol`.
    pub fn score_for_symbol(&self, symbol: &str) -> u8 {
        let symbol = normalize_symbol(symbol);
        let (preceding, occurrences) = self
            .records
            .iter()
            .filter(|entry| entry.key().0 == symbol)
            .fold((0u64, 0u64), |(p, o), entry| {
                (p + entry.preceding_move_count, o + entry.occurrence_count)
            });
        reliability_pct(preceding, occurrences)
    }

    /// Reliability of one signal type on `symbol`.
    pub fn score_for_signal(&self, symbol: &str, signal_type: SignalKind) -> u8 {
        self.get(symbol, signal_type)
            .map(|record| record.score())
            .unwrap_or(0)
    }

    pub fn get(&self, symbol: &str, signal_type: SignalKind) -> Option<ReliabilityRecord> {
        self.records
            .get(&(normalize_symbol(symbol), signal_type))
            .map(|entry| entry.clone())
    }

    /// All records, ordered by symbol then signal type.
    pub fn records(&self) -> Vec<ReliabilityRecord> {
        let mut records: Vec<ReliabilityRecord> =
            self.records.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by(|a, b| {
            a.symbol
                .cmp(&b.symbol)
                .then(a.signal_type.cmp(&b.signal_type))
        });
        records
    }

    /// Records for one symbol, ordered by signal type.
    pub fn records_for_symbol(&self, symbol: &str) -> Vec<ReliabilityRecord> {
        let symbol = normalize_symbol(symbol);
        let mut records: Vec<ReliabilityRecord> = self
            .records
            .iter()
            .filter(|entry| entry.key().0 == symbol)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|r| r.signal_type);
        records
    }

    /// Insert or replace a record wholesale (used when restoring from storage).
    pub fn upsert(&self, mut record: ReliabilityRecord) {
        record.symbol = normalize_symbol(&record.symbol);
        self.records
            .insert((record.symbol.clone(), record.signal_type), record);
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
