pub mod cache;
pub mod config;
pub mod screener;
pub mod types;
pub mod universe;
pub mod sources {
    pub mod yahoo;
}

pub use screener::{CurveFitScorer, PatternScorer, Screener, ScreenerConfig, StrideScorer};
pub use sources::yahoo::YahooFinanceClient;
pub use types::*;
