//! OHLCV 캔들 데이터 구조체.
//!
//! 예측 엔진의 유일한 입력 데이터 모델입니다. 캔들 시퀀스는 항상
//! 오래된 것부터 최신 순으로 정렬되며, 마지막 요소가 "현재" 캔들입니다.

use crate::types::{Price, Quantity, Symbol, Timeframe};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV 캔들 데이터.
///
/// OHLC 가격은 양수, 거래량은 0 이상이어야 합니다. `high >= max(open, close)`,
/// `low <= min(open, close)` 불변식은 엔진에서 강제하지 않습니다 - 잘못된
/// 캔들도 받아들이지만 비정상적인 결과를 낼 수 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 거래 심볼
    pub symbol: Symbol,
    /// 타임프레임
    pub timeframe: Timeframe,
    /// 캔들 시작 시간
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량 (기준 자산 단위)
    pub volume: Quantity,
    /// 캔들 종료 시간
    pub close_time: DateTime<Utc>,
}

impl Candle {
    /// 새 캔들을 생성합니다.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        timeframe: Timeframe,
        open_time: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
        close_time: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol,
            timeframe,
            open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time,
        }
    }

    /// 종가만으로 평평한 캔들을 생성합니다 (O=H=L=C, 거래량 0).
    ///
    /// 종가 시계열만 주어지는 입력 경로에서 사용합니다. 통계 백엔드는
    /// 종가만 사용하므로 결과에 영향이 없습니다.
    pub fn flat(
        symbol: Symbol,
        timeframe: Timeframe,
        open_time: DateTime<Utc>,
        close: Price,
    ) -> Self {
        let close_time = open_time
            + chrono::Duration::from_std(timeframe.duration())
                .unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            symbol,
            timeframe,
            open_time,
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::ZERO,
            close_time,
        }
    }

    /// 캔들 몸통 크기(절대값)를 반환합니다.
    pub fn body_size(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 음봉(종가 < 시가)인지 확인합니다.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// 대표가(고가+저가+종가 평균)를 반환합니다.
    pub fn typical_price(&self) -> Decimal {
        (self.high + self.low + self.close) / Decimal::from(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_candle() {
        let symbol = Symbol::crypto("BTC", "USDT");
        let now = Utc::now();
        let candle = Candle::new(
            symbol,
            Timeframe::H1,
            now,
            dec!(50000),
            dec!(51000),
            dec!(49500),
            dec!(50500),
            dec!(100),
            now,
        );

        assert!(candle.is_bullish());
        assert!(!candle.is_bearish());
        assert_eq!(candle.body_size(), dec!(500));
        assert_eq!(candle.range(), dec!(1500));
    }

    #[test]
    fn test_flat_candle() {
        let symbol = Symbol::crypto("ETH", "USDT");
        let candle = Candle::flat(symbol, Timeframe::H1, Utc::now(), dec!(2000));

        assert_eq!(candle.open, dec!(2000));
        assert_eq!(candle.high, dec!(2000));
        assert_eq!(candle.low, dec!(2000));
        assert_eq!(candle.close, dec!(2000));
        assert_eq!(candle.volume, Decimal::ZERO);
        assert!(candle.close_time > candle.open_time);
    }

    #[test]
    fn test_typical_price() {
        let symbol = Symbol::crypto("BTC", "USDT");
        let now = Utc::now();
        let candle = Candle::new(
            symbol,
            Timeframe::D1,
            now,
            dec!(100),
            dec!(120),
            dec!(90),
            dec!(110),
            dec!(10),
            now,
        );

        assert_eq!(candle.typical_price(), dec!(320) / Decimal::from(3));
    }
}
