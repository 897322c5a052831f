pub mod candle;
pub mod reliability;
pub mod smc;
pub mod symbol;

pub use candle::*;
pub use reliability::*;
pub use smc::*;
pub use symbol::*;
