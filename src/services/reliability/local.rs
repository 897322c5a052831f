//! Device-local reliability scope.

use super::ReliabilityTable;
use crate::types::{ReliabilityRecord, SignalKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reliability counters for this installation.
///
/// Optionally mirrored to a JSON file holding the record list. A missing or
/// unreadable file starts the scope empty; failed writes are logged and the
/// in-memory counters stay authoritative.
pub struct LocalReliability {
    table: ReliabilityTable,
    path: Option<PathBuf>,
}

impl LocalReliability {
    /// Create a scope that lives only in memory.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self {
            table: ReliabilityTable::new(),
            path: None,
        })
    }

    /// Create a scope backed by a JSON file, loading any records it holds.
    pub fn with_file(path: impl Into<PathBuf>) -> Arc<Self> {
        let store = Self {
            table: ReliabilityTable::new(),
            path: Some(path.into()),
        };
        store.load();
        Arc::new(store)
    }

    /// Count one observation and persist.
    pub fn record_observation(
        &self,
        symbol: &str,
        signal_type: SignalKind,
        preceded_significant_move: bool,
    ) -> ReliabilityRecord {
        let record = self
            .table
            .record_observation(symbol, signal_type, preceded_significant_move);
        debug!(
            "Local observation {} {}: {}/{}",
            record.symbol, record.signal_type, record.preceding_move_count, record.occurrence_count
        );
        self.save();
        record
    }

    pub fn score_for_symbol(&self, symbol: &str) -> u8 {
        self.table.score_for_symbol(symbol)
    }

    pub fn score_for_signal(&self, symbol: &str, signal_type: SignalKind) -> u8 {
        self.table.score_for_signal(symbol, signal_type)
    }

    pub fn records(&self) -> Vec<ReliabilityRecord> {
        self.table.records()
    }

    pub fn records_for_symbol(&self, symbol: &str) -> Vec<ReliabilityRecord> {
        self.table.records_for_symbol(symbol)
    }

    /// Clear every local record and delete the backing file.
    pub fn reset(&self) {
        self.table.clear();
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => info!("Cleared local reliability data at {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load(&self) {
        let Some(path) = &self.path else {
            return;
        };

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };

        match serde_json::from_str::<Vec<ReliabilityRecord>>(&content) {
            Ok(records) => {
                let count = records.len();
                for record in records {
                    self.table.upsert(record);
                }
                info!("Loaded {} local reliability records from {}", count, path.display());
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
            }
        }
    }

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!("Failed to create {}: {}", dir.display(), e);
                return;
            }
        }

        match serde_json::to_string_pretty(&self.table.records()) {
            Ok(content) => {
                if let Err(e) = fs::write(path, content) {
                    warn!("Failed to write {}: {}", path.display(), e);
                }
            }
            Err(e) => {
                warn!("Failed to serialize local reliability records: {}", e);
            }
        }
    }
}
