//! Shared reliability scope backed by Redis.

use super::ReliabilityTable;
use crate::types::{normalize_symbol, ReliabilityRecord, SignalKind};
use dashmap::DashMap;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Redis key prefix for reliability hashes.
const REDIS_RELIABILITY_PREFIX: &str = "cryptosmc:reliability:";

const OCCURRENCES_SUFFIX: &str = "occurrences";
const PRECEDING_SUFFIX: &str = "preceding";

/// Reliability counters pooled across installations.
///
/// Counters live in one Redis hash per symbol
/// (`cryptosmc:reliability:{SYMBOL}`) with `{type}:occurrences` and
/// `{type}:preceding` fields, incremented with HINCRBY so concurrent writers
/// never lose updates. The in-memory table mirrors the last values seen and
/// serves reads when Redis is not configured or unreachable. A retried
/// observation is counted twice.
///
/// Increments that fail to reach Redis are held as pending deltas. They are
/// added on top of every value read back from Redis and pushed again on the
/// next write or refresh, so an outage never drops an observation.
///
/// The shared pool has no reset.
pub struct GlobalReliability {
    table: ReliabilityTable,
    /// (occurrences, preceding) not yet acknowledged by Redis.
    pending: DashMap<(String, SignalKind), (u64, u64)>,
    redis: RwLock<Option<ConnectionManager>>,
}

impl GlobalReliability {
    /// Create a new global scope with no Redis connection.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Connect to Redis for shared counters.
    pub async fn connect_redis(&self, redis_url: &str) {
        match redis::Client::open(redis_url) {
            Ok(client) => match ConnectionManager::new(client).await {
                Ok(conn) => {
                    info!("GlobalReliability connected to Redis");
                    *self.redis.write().await = Some(conn);
                }
                Err(e) => {
                    warn!("Failed to connect GlobalReliability to Redis: {}", e);
                }
            },
            Err(e) => {
                warn!("Invalid Redis URL for GlobalReliability: {}", e);
            }
        }
    }

    /// Whether a Redis connection is configured.
    pub async fn is_shared(&self) -> bool {
        self.redis.read().await.is_some()
    }

    /// Count one observation in the shared pool.
    /// Returns the record as seen after the increment.
    pub async fn record_observation(
        &self,
        symbol: &str,
        signal_type: SignalKind,
        preceded_significant_move: bool,
    ) -> ReliabilityRecord {
        let local = self
            .table
            .record_observation(symbol, signal_type, preceded_significant_move);

        let conn_guard = self.redis.read().await;
        let Some(ref conn) = *conn_guard else {
            return local;
        };
        let mut conn = conn.clone();
        drop(conn_guard);

        let key = (local.symbol.clone(), signal_type);
        let (held_occ, held_pre) = self.pending.remove(&key).map(|(_, d)| d).unwrap_or((0, 0));
        let delta = (held_occ + 1, held_pre + u64::from(preceded_significant_move));

        match push_delta(&mut conn, &local.symbol, signal_type, delta).await {
            Ok(shared) => {
                debug!(
                    "Global observation {} {}: {}/{}",
                    shared.symbol,
                    shared.signal_type,
                    shared.preceding_move_count,
                    shared.occurrence_count
                );
                self.merge_shared(vec![shared]);
                self.table.get(&local.symbol, signal_type).unwrap_or(local)
            }
            Err(e) => {
                warn!(
                    "Failed to record global observation for {}, holding it for retry: {}",
                    local.symbol, e
                );
                self.hold_pending(&local.symbol, signal_type, delta);
                local
            }
        }
    }

    /// Pooled reliability over every signal type seen for `symbol`.
    pub async fn score_for_symbol(&self, symbol: &str) -> u8 {
        self.refresh_symbol(symbol).await;
        self.table.score_for_symbol(symbol)
    }

    /// Reliability of one signal type on `symbol`.
    pub async fn score_for_signal(&self, symbol: &str, signal_type: SignalKind) -> u8 {
        self.refresh_symbol(symbol).await;
        self.table.score_for_signal(symbol, signal_type)
    }

    /// Records for one symbol, refreshed from Redis when connected.
    pub async fn records_for_symbol(&self, symbol: &str) -> Vec<ReliabilityRecord> {
        self.refresh_symbol(symbol).await;
        self.table.records_for_symbol(symbol)
    }

    /// Every record in the pool, reloaded from Redis when connected.
    pub async fn records(&self) -> Vec<ReliabilityRecord> {
        self.load_all_from_redis().await;
        self.table.records()
    }

    /// Number of (symbol, signal type) pairs with increments not yet in Redis.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Replace the in-memory view with counters read from Redis, adding any
    /// increments still held locally.
    pub fn merge_shared(&self, records: Vec<ReliabilityRecord>) {
        for mut record in records {
            let key = (normalize_symbol(&record.symbol), record.signal_type);
            if let Some(held) = self.pending.get(&key) {
                let (occ, pre) = *held;
                record.occurrence_count += occ;
                record.preceding_move_count += pre;
            }
            self.table.upsert(record);
        }
    }

    fn hold_pending(&self, symbol: &str, signal_type: SignalKind, delta: (u64, u64)) {
        let mut held = self
            .pending
            .entry((normalize_symbol(symbol), signal_type))
            .or_insert((0, 0));
        held.0 += delta.0;
        held.1 += delta.1;
    }

    /// Push held increments for `symbol` (or every symbol when None).
    async fn flush_pending(&self, conn: &mut ConnectionManager, symbol: Option<&str>) {
        let keys: Vec<(String, SignalKind)> = self
            .pending
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|(s, _)| symbol.map_or(true, |wanted| s == wanted))
            .collect();

        for key in keys {
            let Some((_, delta)) = self.pending.remove(&key) else {
                continue;
            };
            if let Err(e) = push_delta(conn, &key.0, key.1, delta).await {
                warn!("Still unable to push held observations for {}: {}", key.0, e);
                self.hold_pending(&key.0, key.1, delta);
            }
        }
    }

    /// Replace the in-memory view of `symbol` with the shared counters.
    pub async fn refresh_symbol(&self, symbol: &str) {
        let conn_guard = self.redis.read().await;
        let Some(ref conn) = *conn_guard else {
            return;
        };
        let mut conn = conn.clone();
        drop(conn_guard);

        let symbol = normalize_symbol(symbol);
        self.flush_pending(&mut conn, Some(&symbol)).await;

        match conn.hgetall::<_, HashMap<String, u64>>(redis_key(&symbol)).await {
            Ok(fields) => self.merge_shared(records_from_hash(&symbol, &fields)),
            Err(e) => {
                warn!("Failed to load global reliability for {}: {}", symbol, e);
            }
        }
    }

    /// Load every shared record from Redis.
    pub async fn load_all_from_redis(&self) {
        let conn_guard = self.redis.read().await;
        let Some(ref conn) = *conn_guard else {
            return;
        };
        let mut conn = conn.clone();
        drop(conn_guard);

        self.flush_pending(&mut conn, None).await;

        let pattern = format!("{}*", REDIS_RELIABILITY_PREFIX);
        let keys: Vec<String> = match redis::cmd("KEYS").arg(&pattern).query_async(&mut conn).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list global reliability keys: {}", e);
                return;
            }
        };

        let mut loaded = 0;
        for key in keys {
            let Some(symbol) = key.strip_prefix(REDIS_RELIABILITY_PREFIX) else {
                continue;
            };
            if let Ok(fields) = conn.hgetall::<_, HashMap<String, u64>>(&key).await {
                let records = records_from_hash(symbol, &fields);
                loaded += records.len();
                self.merge_shared(records);
            }
        }

        if loaded > 0 {
            debug!("Loaded {} global reliability records from Redis", loaded);
        }
    }
}

impl Default for GlobalReliability {
    fn default() -> Self {
        Self {
            table: ReliabilityTable::new(),
            pending: DashMap::new(),
            redis: RwLock::new(None),
        }
    }
}

fn redis_key(symbol: &str) -> String {
    format!("{}{}", REDIS_RELIABILITY_PREFIX, symbol)
}

fn field(signal_type: SignalKind, suffix: &str) -> String {
    format!("{}:{}", signal_type.code(), suffix)
}

/// Add `delta` (occurrences, preceding) to the shared counters in one atomic
/// pipeline and return the resulting record.
async fn push_delta(
    conn: &mut ConnectionManager,
    symbol: &str,
    signal_type: SignalKind,
    delta: (u64, u64),
) -> redis::RedisResult<ReliabilityRecord> {
    let key = redis_key(symbol);
    let (occurrence_count, preceding_move_count): (u64, u64) = redis::pipe()
        .atomic()
        .hincr(&key, field(signal_type, OCCURRENCES_SUFFIX), delta.0)
        .hincr(&key, field(signal_type, PRECEDING_SUFFIX), delta.1)
        .query_async(conn)
        .await?;

    Ok(ReliabilityRecord {
        symbol: symbol.to_string(),
        signal_type,
        occurrence_count,
        preceding_move_count,
    })
}

/// Rebuild records from a symbol's hash fields. Unknown fields are skipped.
fn records_from_hash(symbol: &str, fields: &HashMap<String, u64>) -> Vec<ReliabilityRecord> {
    let mut records: BTreeMap<SignalKind, ReliabilityRecord> = BTreeMap::new();

    for (name, &value) in fields {
        let Some((code, suffix)) = name.rsplit_once(':') else {
            continue;
        };
        let Some(signal_type) = SignalKind::from_code(code) else {
            continue;
        };

        let record = records
            .entry(signal_type)
            .or_insert_with(|| ReliabilityRecord::new(normalize_symbol(symbol), signal_type));
        match suffix {
            OCCURRENCES_SUFFIX => record.occurrence_count = value,
            PRECEDING_SUFFIX => record.preceding_move_count = value,
            _ => {}
        }
    }

    records.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names() {
        assert_eq!(redis_key("BTCUSDT"), "cryptosmc:reliability:BTCUSDT");
        assert_eq!(field(SignalKind::FairValueGap, OCCURRENCES_SUFFIX), "FVG:occurrences");
        assert_eq!(field(SignalKind::ChangeOfCharacter, PRECEDING_SUFFIX), "CHoCH:preceding");
    }

    #[test]
    fn test_records_from_hash() {
        let fields: HashMap<String, u64> = [
            ("FVG:occurrences", 4),
            ("FVG:preceding", 3),
            ("BOS:occurrences", 2),
            ("RSI:occurrences", 9),
            ("garbage", 1),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let records = records_from_hash("btcusdt", &fields);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].signal_type, SignalKind::FairValueGap);
        assert_eq!(records[0].symbol, "BTCUSDT");
        assert_eq!(records[0].occurrence_count, 4);
        assert_eq!(records[0].preceding_move_count, 3);

        assert_eq!(records[1].signal_type, SignalKind::BreakOfStructure);
        assert_eq!(records[1].preceding_move_count, 0);
    }

    #[tokio::test]
    async fn test_without_redis_counts_in_memory() {
        let global = GlobalReliability::new();
        assert!(!global.is_shared().await);

        global
            .record_observation("BTCUSDT", SignalKind::OrderBlock, true)
            .await;
        let record = global
            .record_observation("BTCUSDT", SignalKind::OrderBlock, false)
            .await;

        assert_eq!(record.occurrence_count, 2);
        assert_eq!(global.score_for_symbol("BTCUSDT").await, 50);
        assert_eq!(global.records().await.len(), 1);
        assert_eq!(global.pending_len(), 0);
    }

    fn shared(symbol: &str, signal_type: SignalKind, occ: u64, pre: u64) -> ReliabilityRecord {
        ReliabilityRecord {
            symbol: symbol.to_string(),
            signal_type,
            occurrence_count: occ,
            preceding_move_count: pre,
        }
    }

    #[tokio::test]
    async fn test_held_increment_survives_refresh() {
        let global = GlobalReliability::new();

        // An increment that never reached Redis
        global
            .record_observation("ETHUSDT", SignalKind::FairValueGap, true)
            .await;
        global.hold_pending("ethusdt", SignalKind::FairValueGap, (1, 1));
        assert_eq!(global.pending_len(), 1);

        // Redis still holds the other writers' 4/2
        global.merge_shared(vec![shared("ETHUSDT", SignalKind::FairValueGap, 4, 2)]);

        let records = global.records_for_symbol("ETHUSDT").await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].occurrence_count, 5);
        assert_eq!(records[0].preceding_move_count, 3);
        assert_eq!(global.score_for_signal("ETHUSDT", SignalKind::FairValueGap).await, 60);
    }

    #[tokio::test]
    async fn test_listing_includes_records_from_other_writers() {
        let global = GlobalReliability::new();
        global
            .record_observation("BTCUSDT", SignalKind::OrderBlock, true)
            .await;

        global.merge_shared(vec![
            shared("SOLUSDT", SignalKind::BreakOfStructure, 3, 3),
            shared("ADAUSDT", SignalKind::LiquidityZone, 2, 0),
        ]);

        let records = global.records().await;
        let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ADAUSDT", "BTCUSDT", "SOLUSDT"]);
        assert_eq!(global.score_for_symbol("SOLUSDT").await, 100);
    }
}
