//! 데이터 Provider 모듈.
//!
//! ## 카부탄 (kabutan.jp)
//! - `KabutanFetcher`: 카부탄 종목 페이지 크롤러
//! - 종목명, 현재가, 전일 종가, PER/PBR, 배당수익률, 시가총액, 거래량

pub mod kabutan;

pub use kabutan::{parse_snapshot, KabutanFetcher};
