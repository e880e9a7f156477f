//! 카부탄(kabutan.jp) 종목 페이지 크롤러.
//!
//! 일본 주식의 시세 스냅샷을 카부탄 종목 페이지 HTML에서 추출합니다.
//!
//! ## 데이터 소스
//! - `/stock/?code={ticker}`: 종목명, 현재가, 전일 종가, PER/PBR, 배당수익률, 시가총액, 거래량
//!
//! ## 사용 예시
//! ```rust,ignore
//! let fetcher = KabutanFetcher::new(&FetcherConfig::default())?;
//! let snapshot = fetcher.fetch(&Ticker::parse("7203")?).await?;
//! println!("{} 현재가: {}", snapshot.company_name, snapshot.current_price);
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use tracing::debug;

use kabu_core::{FetchError, FetcherConfig, SnapshotFetcher, StockSnapshot, Ticker};

const COMPANY_NAME: &str = ".si_i1_1 h2";
const CURRENT_PRICE: &str = ".si_i1_2 .kabuka";
const PREVIOUS_CLOSE: &str = "#kobetsu_left dl dd";
const PER: &str = "#stockinfo_i3 tbody tr:nth-child(1) td:nth-child(1)";
const PBR: &str = "#stockinfo_i3 tbody tr:nth-child(1) td:nth-child(2)";
const DIVIDEND_YIELD: &str = "#stockinfo_i3 tbody tr:nth-child(1) td:nth-child(3)";
const MARKET_CAP: &str = "#stockinfo_i3 tbody tr:nth-child(2) td";
const VOLUME: &str = "#kobetsu_left table:nth-of-type(2) tbody tr:nth-child(1) td";
/// `#kobetsu_left`가 없는 레이아웃용 거래량 경로
const VOLUME_FALLBACK: &str = "body div:nth-child(1) div:nth-child(3) div:nth-child(1) div:nth-child(3) table:nth-of-type(2) tbody tr:nth-child(1) td";

/// 카부탄 크롤러.
pub struct KabutanFetcher {
    client: Client,
    base_url: String,
}

impl KabutanFetcher {
    /// 설정으로 생성.
    ///
    /// # Errors
    ///
    /// HTTP 클라이언트 생성 실패 시 `FetchError::Transport`.
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Transport(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 기본 URL 반환.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn stock_url(&self, ticker: &Ticker) -> String {
        format!("{}/stock/?code={}", self.base_url, ticker)
    }
}

#[async_trait]
impl SnapshotFetcher for KabutanFetcher {
    fn source_name(&self) -> &str {
        "kabutan"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<StockSnapshot, FetchError> {
        let url = self.stock_url(ticker);
        debug!(ticker = %ticker, url = %url, "카부탄 페이지 요청");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus(status.as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        // Html은 Send가 아니므로 await 이후 동기 구간에서만 사용
        let document = Html::parse_document(&html);
        parse_snapshot(ticker, &document)
    }
}

/// 종목 페이지 문서에서 스냅샷을 추출합니다.
///
/// 종목명이 없으면 `FetchError::MissingField("company name")`.
/// 보조 필드는 비어 있으면 `None`입니다.
pub fn parse_snapshot(ticker: &Ticker, document: &Html) -> Result<StockSnapshot, FetchError> {
    let company_name = select_text(document, COMPANY_NAME)?
        .filter(|name| !name.is_empty())
        .ok_or(FetchError::MissingField("company name"))?;

    let current_price = select_text(document, CURRENT_PRICE)?.unwrap_or_default();
    let previous_close = select_text(document, PREVIOUS_CLOSE)?.unwrap_or_default();

    let volume = match non_empty(select_text(document, VOLUME)?) {
        Some(raw) => Some(raw),
        None => non_empty(select_text(document, VOLUME_FALLBACK)?),
    }
    .and_then(|raw| non_empty(Some(normalize_volume(&raw))));

    Ok(StockSnapshot {
        ticker: ticker.to_string(),
        company_name,
        current_price,
        previous_close,
        dividend_yield: non_empty(select_text(document, DIVIDEND_YIELD)?),
        per: non_empty(select_text(document, PER)?),
        pbr: non_empty(select_text(document, PBR)?),
        market_cap: non_empty(select_text(document, MARKET_CAP)?),
        volume,
    })
}

/// 첫 번째 일치 요소의 텍스트 (앞뒤 공백 제거).
fn select_text(document: &Html, selector: &str) -> Result<Option<String>, FetchError> {
    let selector =
        Selector::parse(selector).map_err(|e| FetchError::Parse(format!("{}: {}", selector, e)))?;

    Ok(document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// NBSP를 공백으로 바꾸고 끝의 `株` 단위를 제거합니다.
fn normalize_volume(raw: &str) -> String {
    let replaced = raw.replace('\u{a0}', " ");
    let trimmed = replaced.trim();
    trimmed
        .strip_suffix('株')
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
