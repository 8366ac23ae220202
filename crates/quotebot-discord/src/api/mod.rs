//! Upstream data clients

pub mod fmp;
pub mod sec;
pub mod yahoo;

pub use fmp::{FmpClient, Period, Statement, StatementKind};
pub use sec::{FILING_TYPES, Filing, SecClient, matching_filing_types};
pub use yahoo::{Candle, CandleClient, CandleInterval};
