//! 종목 시세 스냅샷 레코드.
//!
//! 외부 소스에서 가져온 값은 숫자로 파싱하지 않고 원문 문자열 그대로 보관합니다.
//! (예: `"2,500.5"`, `"3.12％"`, `"35.1兆円"`)

use serde::{Deserialize, Serialize};

/// 티커 하나에 대한 최신 시세 스냅샷.
///
/// JSON 필드명은 camelCase이며, 보조 필드는 값이 없으면 직렬화에서 생략됩니다.
///
/// ```json
/// {"ticker":"7203","companyName":"トヨタ自動車","currentPrice":"2500","previousClose":"2480"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    /// 티커
    pub ticker: String,
    /// 종목명
    pub company_name: String,
    /// 현재가
    pub current_price: String,
    /// 전일 종가
    pub previous_close: String,
    /// 배당수익률
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<String>,
    /// PER
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per: Option<String>,
    /// PBR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pbr: Option<String>,
    /// 시가총액
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<String>,
    /// 거래량
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
}

impl StockSnapshot {
    /// 필수 필드만으로 스냅샷을 생성합니다.
    pub fn new(
        ticker: impl Into<String>,
        company_name: impl Into<String>,
        current_price: impl Into<String>,
        previous_close: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            company_name: company_name.into(),
            current_price: current_price.into(),
            previous_close: previous_close.into(),
            ..Default::default()
        }
    }

    /// 캐시 저장 및 응답 본문에 쓰이는 JSON 문자열로 직렬화합니다.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// JSON 문자열에서 스냅샷을 복원합니다.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_only_json() {
        let snapshot = StockSnapshot::new("7203", "Toyota", "2500", "2480");
        assert_eq!(
            snapshot.to_json().unwrap(),
            r#"{"ticker":"7203","companyName":"Toyota","currentPrice":"2500","previousClose":"2480"}"#
        );
    }

    #[test]
    fn test_round_trip_with_secondary_fields() {
        let snapshot = StockSnapshot {
            dividend_yield: Some("2.85％".to_string()),
            per: Some("9.5倍".to_string()),
            pbr: Some("1.12倍".to_string()),
            market_cap: Some("41兆3,589億円".to_string()),
            volume: Some("20,318,400".to_string()),
            ..StockSnapshot::new("7203", "トヨタ自動車", "2,741.5", "2,730")
        };

        let json = snapshot.to_json().unwrap();
        assert!(json.contains(r#""marketCap":"41兆3,589億円""#));
        assert_eq!(StockSnapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_missing_secondary_fields_deserialize_as_none() {
        let snapshot = StockSnapshot::from_json(
            r#"{"ticker":"AAPL","companyName":"Apple","currentPrice":"190","previousClose":"188"}"#,
        )
        .unwrap();
        assert!(snapshot.dividend_yield.is_none());
        assert!(snapshot.volume.is_none());
    }

    #[test]
    fn test_missing_required_field_is_error() {
        assert!(StockSnapshot::from_json(r#"{"ticker":"AAPL"}"#).is_err());
    }
}
