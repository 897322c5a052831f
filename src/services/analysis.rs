//! Per-symbol SMC analysis.

use crate::config::AnalysisConfig;
use crate::error::{AppError, Result};
use crate::services::favorites::FavoritesStore;
use crate::services::reliability::{GlobalReliability, LocalReliability};
use crate::services::smc::{compute_overall_score, run_analysis, MIN_ANALYSIS_CANDLES};
use crate::sources::BinanceClient;
use crate::types::{normalize_symbol, AnalysisResult, Candle, Recommendation};
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Analyze a candle series: detect signals, score them, classify the score.
///
/// Reliability scores are left unset; [`AnalysisService`] attaches them.
pub fn analyze_candles(symbol: &str, candles: &[Candle], is_favorite: bool) -> AnalysisResult {
    let signals = run_analysis(candles);
    let overall_score = compute_overall_score(&signals, is_favorite);

    AnalysisResult {
        symbol: normalize_symbol(symbol),
        signals,
        overall_score,
        recommendation: Recommendation::from_score(overall_score),
        is_favorite,
        local_score: None,
        global_score: None,
        timestamp: chrono::Utc::now().timestamp_millis(),
    }
}

/// Fetches candles and produces analysis results with reliability attached.
pub struct AnalysisService {
    binance: BinanceClient,
    favorites: Arc<FavoritesStore>,
    local: Arc<LocalReliability>,
    global: Arc<GlobalReliability>,
    config: AnalysisConfig,
}

impl AnalysisService {
    pub fn new(
        config: AnalysisConfig,
        favorites: Arc<FavoritesStore>,
        local: Arc<LocalReliability>,
        global: Arc<GlobalReliability>,
    ) -> Arc<Self> {
        let binance = BinanceClient::new(config.binance_api_url.clone(), config.request_timeout);
        Arc::new(Self {
            binance,
            favorites,
            local,
            global,
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one symbol with freshly fetched candles.
    pub async fn analyze(&self, symbol: &str) -> Result<AnalysisResult> {
        let symbol = normalize_symbol(symbol);
        let candles = self
            .binance
            .fetch_klines(&symbol, &self.config.interval, self.config.limit)
            .await?;

        if candles.is_empty() {
            return Err(AppError::NotFound(format!("No candles available for {}", symbol)));
        }
        if candles.len() < MIN_ANALYSIS_CANDLES {
            debug!(
                "{} has only {} candles, analysis will be empty",
                symbol,
                candles.len()
            );
        }

        let mut result = analyze_candles(&symbol, &candles, self.favorites.is_favorite(&symbol));
        self.attach_reliability(&mut result).await;

        debug!(
            "Analyzed {}: {} signals, score {:.1} ({})",
            result.symbol,
            result.signals.len(),
            result.overall_score,
            result.recommendation.label()
        );

        Ok(result)
    }

    /// Analyze the watchlist, favorites first. Symbols that fail are skipped.
    pub async fn analyze_watchlist(&self, watchlist: &[String]) -> Vec<AnalysisResult> {
        let symbols = self.favorites.order_watchlist(watchlist);
        let outcomes = join_all(symbols.iter().map(|symbol| self.analyze(symbol))).await;

        symbols
            .iter()
            .zip(outcomes)
            .filter_map(|(symbol, outcome)| match outcome {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Skipping {} in watchlist analysis: {}", symbol, e);
                    None
                }
            })
            .collect()
    }

    async fn attach_reliability(&self, result: &mut AnalysisResult) {
        result.local_score = Some(self.local.score_for_symbol(&result.symbol));
        result.global_score = Some(self.global.score_for_symbol(&result.symbol).await);
    }
}
