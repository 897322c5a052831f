//! Favorite symbols.

use crate::types::normalize_symbol;
use dashmap::DashSet;
use std::sync::Arc;

/// Set of symbols the user marked as favorite.
#[derive(Debug, Default)]
pub struct FavoritesStore {
    symbols: DashSet<String>,
}

impl FavoritesStore {
    /// Create a store seeded with `initial` favorites.
    pub fn new(initial: &[String]) -> Arc<Self> {
        let store = Self::default();
        for symbol in initial {
            store.symbols.insert(normalize_symbol(symbol));
        }
        Arc::new(store)
    }

    pub fn is_favorite(&self, symbol: &str) -> bool {
        self.symbols.contains(&normalize_symbol(symbol))
    }

    /// Flip the favorite flag. Returns the new state.
    pub fn toggle(&self, symbol: &str) -> bool {
        let symbol = normalize_symbol(symbol);
        if self.symbols.remove(&symbol).is_some() {
            false
        } else {
            self.symbols.insert(symbol);
            true
        }
    }

    /// Sorted favorites.
    pub fn list(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.symbols.iter().map(|s| s.key().clone()).collect();
        symbols.sort();
        symbols
    }

    /// Favorites first, each group keeping the watchlist order.
    pub fn order_watchlist(&self, watchlist: &[String]) -> Vec<String> {
        let (mut favorites, rest): (Vec<String>, Vec<String>) = watchlist
            .iter()
            .map(|s| normalize_symbol(s))
            .partition(|s| self.symbols.contains(s));
        favorites.extend(rest);
        favorites
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_toggle() {
        let store = FavoritesStore::new(&[]);
        assert!(!store.is_favorite("BTCUSDT"));

        assert!(store.toggle("btcusdt"));
        assert!(store.is_favorite("BTCUSDT"));

        assert!(!store.toggle("BTCUSDT"));
        assert!(!store.is_favorite("btcusdt"));
    }

    #[test]
    fn test_seeded_and_listed() {
        let store = FavoritesStore::new(&symbols(&["solusdt", "BTCUSDT"]));
        assert_eq!(store.list(), symbols(&["BTCUSDT", "SOLUSDT"]));
    }

    #[test]
    fn test_order_watchlist() {
        let store = FavoritesStore::new(&symbols(&["SOLUSDT", "ADAUSDT"]));
        let watchlist = symbols(&["BTCUSDT", "ETHUSDT", "SOLUSDT", "BNBUSDT", "ADAUSDT"]);
        assert_eq!(
            store.order_watchlist(&watchlist),
            symbols(&["SOLUSDT", "ADAUSDT", "BTCUSDT", "ETHUSDT", "BNBUSDT"])
        );
    }
}
