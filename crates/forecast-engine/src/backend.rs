//! 백엔드 다형성 인터페이스.
//!
//! 통계 백엔드와 신경망 백엔드는 하나의 trait 뒤에 있는 닫힌 변형
//! 집합으로 모델링됩니다. 앙상블은 두 백엔드를 균일하게 다루며,
//! 새 백엔드를 추가해도 결합 로직은 바뀌지 않습니다.

use crate::error::ForecastError;
use crate::types::{PredictionResult, MIN_PRICE};
use forecast_core::Candle;
use rust_decimal::prelude::ToPrimitive;

/// 가격 예측 백엔드.
///
/// `predict`는 절대 panic하거나 에러를 전파하지 않습니다. 모든 실패는
/// 백엔드 경계에서 복구되어 `success=false` 결과로 표면화됩니다.
pub trait PriceBackend: Send + Sync {
    /// 백엔드 식별 이름 (`model_used` 태그).
    fn name(&self) -> &str;

    /// 캔들 시퀀스(오래된 것부터)에서 예측 결과 생성.
    fn predict(&self, candles: &[Candle]) -> PredictionResult;
}

/// 종가를 f64 배열로 변환.
pub(crate) fn close_prices(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .map(|c| c.close.to_f64().unwrap_or(0.0))
        .collect()
}

/// 실제 모델 파일 없이 테스트하기 위한 mock 백엔드.
///
/// 고정 결과나 강제 에러를 설정할 수 있으며, 둘 다 없으면
/// 평균 대비 마지막 종가 위치로 간단한 휴리스틱 예측을 생성합니다.
pub struct MockBackend {
    name: String,
    /// 항상 반환할 고정 결과
    pub fixed_result: Option<PredictionResult>,
    /// 항상 실패로 반환할 강제 에러
    pub forced_error: Option<ForecastError>,
}

impl MockBackend {
    /// 새 mock 백엔드 생성.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed_result: None,
            forced_error: None,
        }
    }

    /// 항상 반환할 고정 결과 설정.
    pub fn with_fixed_result(mut self, result: PredictionResult) -> Self {
        self.fixed_result = Some(result);
        self
    }

    /// 항상 실패를 반환하도록 강제 에러 설정.
    pub fn with_forced_error(mut self, error: ForecastError) -> Self {
        self.forced_error = Some(error);
        self
    }
}

impl PriceBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, candles: &[Candle]) -> PredictionResult {
        if let Some(ref err) = self.forced_error {
            return PredictionResult::failure(&self.name, err);
        }
        if let Some(ref result) = self.fixed_result {
            return result.clone();
        }

        if candles.is_empty() {
            return PredictionResult::failure(
                &self.name,
                ForecastError::InsufficientData {
                    required: 1,
                    actual: 0,
                },
            );
        }

        let closes = close_prices(candles);
        let current = closes[closes.len() - 1];
        let mean = closes.iter().sum::<f64>() / closes.len() as f64;

        // 간단한 휴리스틱: 평균 대비 마지막 종가의 감쇠된 거리만큼 연장
        let drift = (current - mean) / mean.max(MIN_PRICE) * 0.1;
        let predicted = current * (1.0 + drift);

        PredictionResult::success(&self.name, predicted, 0.75, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use chrono::Utc;
    use forecast_core::{Symbol, Timeframe};
    use rust_decimal::Decimal;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        let symbol = Symbol::crypto("BTC", "USDT");
        closes
            .iter()
            .map(|&c| {
                Candle::flat(
                    symbol.clone(),
                    Timeframe::H1,
                    Utc::now(),
                    Decimal::try_from(c).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_mock_heuristic_up() {
        let backend = MockBackend::new("mock");
        let candles = candles_from_closes(&[100.0, 102.0, 104.0, 106.0]);

        let result = backend.predict(&candles);
        assert!(result.success);
        assert_eq!(result.direction, Some(Direction::Up));
        assert_eq!(result.model_used, "mock");
    }

    #[test]
    fn test_mock_heuristic_down() {
        let backend = MockBackend::new("mock");
        let candles = candles_from_closes(&[106.0, 104.0, 102.0, 100.0]);

        let result = backend.predict(&candles);
        assert!(result.success);
        assert_eq!(result.direction, Some(Direction::Down));
    }

    #[test]
    fn test_mock_forced_error() {
        let backend = MockBackend::new("mock")
            .with_forced_error(ForecastError::ModelUnavailable("forced".to_string()));
        let candles = candles_from_closes(&[100.0, 101.0]);

        let result = backend.predict(&candles);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Model unavailable: forced"));
    }

    #[test]
    fn test_mock_empty_input() {
        let backend = MockBackend::new("mock");
        let result = backend.predict(&[]);
        assert!(!result.success);
    }
}
