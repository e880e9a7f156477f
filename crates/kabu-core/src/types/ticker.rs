//! 티커 식별자 정의.
//!
//! 티커는 거래 가능한 종목을 가리키는 짧은 영숫자 식별자입니다.
//! 캐시나 외부 소스에 접근하기 전에 반드시 검증을 통과해야 합니다.
//!
//! 허용 규칙: `^[A-Za-z0-9]+$` (ASCII 영문자/숫자만, 대소문자 보존)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 티커 검증 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickerError {
    /// 빈 문자열
    #[error("invalid ticker: ticker must not be empty")]
    Empty,

    /// 영문자/숫자 이외의 문자 포함
    #[error("invalid ticker: ticker should only contain letters and numbers")]
    InvalidCharacters,
}

/// 티커 문자열을 검증합니다.
///
/// 부수 효과가 없는 순수 함수입니다.
pub fn validate(raw: &str) -> Result<(), TickerError> {
    if raw.is_empty() {
        return Err(TickerError::Empty);
    }
    if !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(TickerError::InvalidCharacters);
    }
    Ok(())
}

/// 검증된 티커.
///
/// `Ticker::parse`를 통해서만 생성되므로 값이 존재하면 항상 유효합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// 문자열을 검증하여 티커를 생성합니다.
    ///
    /// # 예제
    ///
    /// ```
    /// use kabu_core::Ticker;
    ///
    /// assert!(Ticker::parse("7203").is_ok());
    /// assert!(Ticker::parse("AB!").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, TickerError> {
        validate(raw)?;
        Ok(Self(raw.to_string()))
    }

    /// 티커 문자열을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 내부 문자열을 반환합니다.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ticker {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = TickerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Ticker {
    type Error = TickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate(&value)?;
        Ok(Self(value))
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accepts_alphanumeric() {
        assert!(validate("7203").is_ok());
        assert!(validate("AAPL").is_ok());
        assert!(validate("brk2").is_ok());
        assert!(validate("a").is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(validate(""), Err(TickerError::Empty));
    }

    #[test]
    fn test_rejects_punctuation_and_whitespace() {
        for raw in ["AB!", "BRK.B", "72 03", " 7203", "7203\n", "a-b", "x_y", "%27"] {
            assert_eq!(
                validate(raw),
                Err(TickerError::InvalidCharacters),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_non_ascii() {
        assert!(validate("トヨタ").is_err());
        assert!(validate("７２０３").is_err()); // 전각 숫자
        assert!(validate("café").is_err());
    }

    #[test]
    fn test_case_is_preserved() {
        let ticker = Ticker::parse("AbC1").unwrap();
        assert_eq!(ticker.as_str(), "AbC1");
        assert_eq!(ticker.to_string(), "AbC1");
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            TickerError::InvalidCharacters.to_string(),
            "invalid ticker: ticker should only contain letters and numbers"
        );
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let ok: Ticker = serde_json::from_str(r#""7203""#).unwrap();
        assert_eq!(ok.as_str(), "7203");
        assert!(serde_json::from_str::<Ticker>(r#""AB!""#).is_err());
    }

    proptest! {
        #[test]
        fn prop_alphanumeric_always_valid(raw in "[A-Za-z0-9]{1,16}") {
            prop_assert!(validate(&raw).is_ok());
            let parsed = Ticker::parse(&raw).unwrap();
            prop_assert_eq!(parsed.as_str(), raw.as_str());
        }

        #[test]
        fn prop_any_foreign_char_is_invalid(
            prefix in "[A-Za-z0-9]{0,8}",
            bad in any::<char>().prop_filter("non-alphanumeric", |c| !c.is_ascii_alphanumeric()),
            suffix in "[A-Za-z0-9]{0,8}",
        ) {
            let raw = format!("{prefix}{bad}{suffix}");
            prop_assert_eq!(validate(&raw), Err(TickerError::InvalidCharacters));
        }
    }
}
