pub mod analysis;
pub mod favorites;
pub mod reliability;
pub mod smc;

pub use analysis::{analyze_candles, AnalysisService};
pub use favorites::FavoritesStore;
pub use reliability::{GlobalReliability, LocalReliability, ReliabilityTable};
