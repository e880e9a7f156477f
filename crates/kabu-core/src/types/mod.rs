//! 기본 값 타입.

pub mod ticker;

pub use ticker::{validate, Ticker, TickerError};
