//! 통계 백엔드 - 계층 분해 기반 추세 외삽 예측.
//!
//! 신경망 백엔드가 불가능할 때의 폴백이자 앙상블의 한 축입니다.
//! 파이프라인: 분해 → 추세 외삽 → 상식 검사 → 변동성 신뢰도.

use crate::backend::{close_prices, PriceBackend};
use crate::config::StatisticalConfig;
use crate::confidence::estimate_confidence;
use crate::decompose::decompose;
use crate::error::{ForecastError, ForecastResult};
use crate::sanitize::sanitize_prediction;
use crate::trend::interpolate;
use crate::types::{PredictionResult, STATISTICAL_MODEL};
use forecast_core::Candle;
use tracing::debug;

/// 통계 백엔드가 요구하는 최소 캔들 수.
///
/// 복구 불가능한 엄격한 전제 조건입니다.
pub const MIN_BARS: usize = 5;

/// 계층 분해 기반 통계 예측 백엔드.
pub struct StatisticalBackend {
    config: StatisticalConfig,
}

impl StatisticalBackend {
    /// 주어진 설정으로 새 백엔드 생성.
    pub fn new(config: StatisticalConfig) -> Self {
        Self { config }
    }

    /// 기본 설정으로 백엔드 생성.
    pub fn with_defaults() -> Self {
        Self::new(StatisticalConfig::default())
    }

    /// 설정 반환.
    pub fn config(&self) -> &StatisticalConfig {
        &self.config
    }

    /// 내부 예측 파이프라인.
    ///
    /// 수치 계산은 최소 가격 하한으로 보호되어 0 나눗셈이 없으며,
    /// 남은 에러 경로는 모두 `predict`에서 구조화된 실패로 복구됩니다.
    fn try_predict(&self, candles: &[Candle]) -> ForecastResult<PredictionResult> {
        if candles.len() < MIN_BARS {
            return Err(ForecastError::InsufficientData {
                required: MIN_BARS,
                actual: candles.len(),
            });
        }

        let closes = close_prices(candles);

        // 작업 윈도우: 최근 종가만 유지, 오래된 쪽을 자름
        let start = closes.len().saturating_sub(self.config.lookback);
        let window = &closes[start..];
        let current = match window.last() {
            Some(&price) => price,
            None => {
                return Err(ForecastError::InvalidInput(
                    "lookback window must be positive".to_string(),
                ))
            }
        };

        let levels = decompose(window);
        let raw = interpolate(
            &levels,
            &self.config.level_weights,
            self.config.renormalize_weights,
        )?;
        let predicted = sanitize_prediction(raw, current, window);
        let confidence = estimate_confidence(window, self.config.volatility_window);

        debug!(
            levels = levels.len(),
            raw,
            predicted,
            confidence,
            "Statistical prediction"
        );

        Ok(PredictionResult::success(
            STATISTICAL_MODEL,
            predicted,
            confidence,
            current,
        ))
    }
}

impl PriceBackend for StatisticalBackend {
    fn name(&self) -> &str {
        STATISTICAL_MODEL
    }

    fn predict(&self, candles: &[Candle]) -> PredictionResult {
        match self.try_predict(candles) {
            Ok(result) => result,
            Err(err) => {
                debug!(error = %err, "Statistical backend failed");
                PredictionResult::failure(STATISTICAL_MODEL, err)
            }
        }
    }
}
