//! cryptosmc - Smart Money Concepts analysis server for crypto futures

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use config::Config;
use services::{AnalysisService, FavoritesStore, GlobalReliability, LocalReliability};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analysis: Arc<AnalysisService>,
    pub favorites: Arc<FavoritesStore>,
    pub local_reliability: Arc<LocalReliability>,
    pub global_reliability: Arc<GlobalReliability>,
}

impl AppState {
    /// Wire the services from configuration with the given reliability scopes.
    pub fn new(
        config: Config,
        local_reliability: Arc<LocalReliability>,
        global_reliability: Arc<GlobalReliability>,
    ) -> Self {
        let favorites = FavoritesStore::new(&config.favorites);
        let analysis = AnalysisService::new(
            config.analysis.clone(),
            favorites.clone(),
            local_reliability.clone(),
            global_reliability.clone(),
        );

        Self {
            config: Arc::new(config),
            analysis,
            favorites,
            local_reliability,
            global_reliability,
        }
    }
}

pub use types::*;
