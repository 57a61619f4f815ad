//! 심볼 및 시장 유형 정의.
//!
//! 이 모듈은 예측 대상 상품 관련 타입을 정의합니다:
//! - `MarketType` - 시장 유형 (암호화폐, 주식, 외환)
//! - `Symbol` - 예측 대상 상품을 나타내는 심볼

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 시장 유형 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    /// 암호화폐 현물 시장
    Crypto,
    /// 주식 시장
    Stock,
    /// 외환 시장
    Forex,
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketType::Crypto => write!(f, "crypto"),
            MarketType::Stock => write!(f, "stock"),
            MarketType::Forex => write!(f, "forex"),
        }
    }
}

/// 예측 대상 상품을 나타내는 심볼.
///
/// 심볼은 기준 자산, 호가 자산, 시장 유형으로 구성됩니다.
/// 예: 암호화폐의 BTC/USDT, 주식의 AAPL/USD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// 기준 자산 (예: BTC, AAPL, EUR)
    pub base: String,
    /// 호가 자산 (예: USDT, USD, JPY)
    pub quote: String,
    /// 시장 유형
    pub market_type: MarketType,
}

impl Symbol {
    /// 새 심볼을 생성합니다.
    pub fn new(base: impl Into<String>, quote: impl Into<String>, market_type: MarketType) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
            market_type,
        }
    }

    /// 암호화폐 심볼을 생성합니다.
    pub fn crypto(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self::new(base, quote, MarketType::Crypto)
    }

    /// 주식 심볼을 생성합니다 (USD 호가).
    pub fn stock(ticker: impl Into<String>) -> Self {
        Self::new(ticker, "USD", MarketType::Stock)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Symbol {
    type Err = CoreError;

    /// "BTC/USDT" 형식 문자열에서 심볼을 파싱합니다.
    ///
    /// 시장 유형이 주어지지 않으므로 암호화폐로 간주합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {
                Ok(Symbol::crypto(base, quote))
            }
            _ => Err(CoreError::Parse(format!("Invalid symbol format: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_display() {
        let symbol = Symbol::crypto("btc", "usdt");
        assert_eq!(symbol.to_string(), "BTC/USDT");
        assert_eq!(symbol.market_type, MarketType::Crypto);
    }

    #[test]
    fn test_symbol_from_str() {
        let symbol: Symbol = "ETH/USDT".parse().unwrap();
        assert_eq!(symbol.base, "ETH");
        assert_eq!(symbol.quote, "USDT");

        assert!("ETHUSDT".parse::<Symbol>().is_err());
        assert!("/USDT".parse::<Symbol>().is_err());
    }

    #[test]
    fn test_stock_symbol() {
        let symbol = Symbol::stock("AAPL");
        assert_eq!(symbol.to_string(), "AAPL/USD");
        assert_eq!(symbol.market_type, MarketType::Stock);
    }
}
