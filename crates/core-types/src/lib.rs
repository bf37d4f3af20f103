//! # Moodlens Core Types
//!
//! The shared vocabulary of the workspace: trades, daily sentiment records,
//! the day-keyed sentiment index, joined trades and the immutable trade filter.
//! This crate has no knowledge of files or metrics.

pub mod enums;
pub mod error;
pub mod filter;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::TradeSide;
pub use error::CoreError;
pub use filter::TradeFilter;
pub use structs::{JoinedTrade, SentimentIndex, SentimentRecord, Trade};
