//! 앙상블 결합기 - 두 백엔드 결과의 가중 결합 및 폴백 정책.
//!
//! 호출별 상태 기계:
//! `Start → {Statistical: Ok|Fail} × {Neural: Ok|Fail} → {Combined | PassThrough | Failed}`.
//! 호출 내 재시도는 없으며, 재시도 정책은 호출자의 몫입니다.

use crate::backend::PriceBackend;
use crate::config::{EngineConfig, EnsembleConfig};
use crate::error::ForecastError;
use crate::neural::NeuralBackend;
use crate::statistical::StatisticalBackend;
use crate::types::{PredictionResult, ENSEMBLE_MODEL};
use forecast_core::Candle;
use tracing::debug;

/// 통계 + 신경망 백엔드 앙상블 엔진.
///
/// 백엔드는 명시적으로 생성되어 주입되는 의존성입니다. 프로세스 전역
/// 캐시는 없으며, 같은 입력과 모델 아티팩트에 대해 각 호출은 독립적으로
/// 재현 가능합니다.
pub struct EnsembleEngine {
    config: EnsembleConfig,
    statistical: Box<dyn PriceBackend>,
    neural: Box<dyn PriceBackend>,
}

impl EnsembleEngine {
    /// 전체 엔진 설정에서 실제 백엔드 쌍으로 엔진 생성.
    ///
    /// 신경망 세션은 여기서 로드되지 않고 첫 예측에서 지연 로드됩니다.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_backends(
            config.ensemble,
            Box::new(StatisticalBackend::new(config.statistical)),
            Box::new(NeuralBackend::new(config.neural)),
        )
    }

    /// 기본 설정으로 엔진 생성.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// 주입된 백엔드 쌍으로 엔진 생성 (테스트 및 사용자 정의 구성용).
    pub fn with_backends(
        config: EnsembleConfig,
        statistical: Box<dyn PriceBackend>,
        neural: Box<dyn PriceBackend>,
    ) -> Self {
        Self {
            config,
            statistical,
            neural,
        }
    }

    /// 설정 반환.
    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    /// 두 백엔드를 독립적으로 호출하고 결과를 결합하거나 폴백합니다.
    ///
    /// - 둘 다 성공: 가중 결합, `model_used = "ensemble"`, 개별 결과 첨부
    /// - 하나만 성공: 생존한 백엔드의 결과를 수정 없이 그대로 반환
    /// - 둘 다 실패: 두 실패를 모두 담은 구조화된 실패 반환
    pub fn predict(&self, candles: &[Candle]) -> PredictionResult {
        let statistical = self.statistical.predict(candles);
        let neural = self.neural.predict(candles);

        match (statistical.success, neural.success) {
            (true, true) => self.combine(statistical, neural),
            (true, false) => {
                debug!(
                    neural_error = neural.error.as_deref().unwrap_or(""),
                    "Neural backend failed, passing through statistical result"
                );
                statistical
            }
            (false, true) => {
                debug!(
                    statistical_error = statistical.error.as_deref().unwrap_or(""),
                    "Statistical backend failed, passing through neural result"
                );
                neural
            }
            (false, false) => {
                let detail = format!(
                    "{}: {}; {}: {}",
                    statistical.model_used,
                    statistical.error.as_deref().unwrap_or("unknown error"),
                    neural.model_used,
                    neural.error.as_deref().unwrap_or("unknown error"),
                );
                debug!(error = %detail, "All backends failed");
                PredictionResult::failure(ENSEMBLE_MODEL, ForecastError::EnsembleFailure(detail))
            }
        }
    }

    /// 두 성공 결과의 가중 결합.
    fn combine(&self, statistical: PredictionResult, neural: PredictionResult) -> PredictionResult {
        let nw = self.config.neural_weight;
        let sw = self.config.statistical_weight;

        let current = neural
            .current_price
            .or(statistical.current_price)
            .unwrap_or(0.0);
        let combined_price = nw * neural.predicted_price.unwrap_or(current)
            + sw * statistical.predicted_price.unwrap_or(current);

        let combined_confidence = (nw * neural.confidence.unwrap_or(0.0)
            + sw * statistical.confidence.unwrap_or(0.0))
            * self.config.confidence_boost;
        let combined_confidence = combined_confidence.min(self.config.confidence_cap);

        debug!(
            combined_price,
            combined_confidence,
            "Ensemble combination"
        );

        PredictionResult::success(ENSEMBLE_MODEL, combined_price, combined_confidence, current)
            .with_components(statistical, neural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::types::{Direction, NEURAL_MODEL, STATISTICAL_MODEL};
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

    fn engine_with(
        statistical: MockBackend,
        neural: MockBackend,
    ) -> EnsembleEngine {
        EnsembleEngine::with_backends(
            EnsembleConfig::default(),
            Box::new(statistical),
            Box::new(neural),
        )
    }

    #[test]
    fn test_both_succeed_combines_weighted() {
        let statistical = MockBackend::new(STATISTICAL_MODEL)
            .with_fixed_result(PredictionResult::success(STATISTICAL_MODEL, 100.0, 0.5, 100.0));
        let neural = MockBackend::new(NEURAL_MODEL)
            .with_fixed_result(PredictionResult::success(NEURAL_MODEL, 110.0, 0.5, 100.0));
        let engine = engine_with(statistical, neural);

        let result = engine.predict(&candles_from_closes(&[100.0; 6]));

        assert!(result.success);
        assert_eq!(result.model_used, ENSEMBLE_MODEL);
        // 0.6 * 110 + 0.4 * 100 = 106
        assert!((result.predicted_price.unwrap() - 106.0).abs() < 1e-9);
        // (0.6 * 0.5 + 0.4 * 0.5) * 1.1 = 0.55
        assert!((result.confidence.unwrap() - 0.55).abs() < 1e-9);
        assert_eq!(result.direction, Some(Direction::Up));

        let components = result.components.unwrap();
        assert_eq!(components.statistical.model_used, STATISTICAL_MODEL);
        assert_eq!(components.neural.model_used, NEURAL_MODEL);
    }

    #[test]
    fn test_combined_confidence_capped() {
        let statistical = MockBackend::new(STATISTICAL_MODEL)
            .with_fixed_result(PredictionResult::success(STATISTICAL_MODEL, 100.0, 0.95, 100.0));
        let neural = MockBackend::new(NEURAL_MODEL)
            .with_fixed_result(PredictionResult::success(NEURAL_MODEL, 100.0, 0.95, 100.0));
        let engine = engine_with(statistical, neural);

        let result = engine.predict(&candles_from_closes(&[100.0; 6]));
        assert_eq!(result.confidence, Some(0.95));
    }

    #[test]
    fn test_neural_failure_passes_statistical_through() {
        let statistical = MockBackend::new(STATISTICAL_MODEL)
            .with_fixed_result(PredictionResult::success(STATISTICAL_MODEL, 102.0, 0.8, 100.0));
        let neural = MockBackend::new(NEURAL_MODEL)
            .with_forced_error(ForecastError::ModelUnavailable("no artifact".to_string()));
        let engine = engine_with(statistical, neural);

        let result = engine.predict(&candles_from_closes(&[100.0; 6]));

        // 생존한 백엔드의 결과가 수정 없이 그대로 - 앙상블 태그 없음
        assert_eq!(
            result,
            PredictionResult::success(STATISTICAL_MODEL, 102.0, 0.8, 100.0)
        );
    }

    #[test]
    fn test_statistical_failure_passes_neural_through() {
        let statistical = MockBackend::new(STATISTICAL_MODEL).with_forced_error(
            ForecastError::InsufficientData {
                required: 5,
                actual: 2,
            },
        );
        let neural = MockBackend::new(NEURAL_MODEL)
            .with_fixed_result(PredictionResult::success(NEURAL_MODEL, 99.0, 0.7, 100.0));
        let engine = engine_with(statistical, neural);

        let result = engine.predict(&candles_from_closes(&[100.0, 101.0]));

        assert!(result.success);
        assert_eq!(result.model_used, NEURAL_MODEL);
        assert!(result.components.is_none());
    }

    #[test]
    fn test_both_fail() {
        let statistical = MockBackend::new(STATISTICAL_MODEL).with_forced_error(
            ForecastError::InsufficientData {
                required: 5,
                actual: 0,
            },
        );
        let neural = MockBackend::new(NEURAL_MODEL)
            .with_forced_error(ForecastError::ModelUnavailable("no artifact".to_string()));
        let engine = engine_with(statistical, neural);

        let result = engine.predict(&[]);

        assert!(!result.success);
        assert_eq!(result.model_used, ENSEMBLE_MODEL);
        let error = result.error.unwrap();
        assert!(error.contains(STATISTICAL_MODEL));
        assert!(error.contains(NEURAL_MODEL));
        assert!(error.contains("All backends failed"));
    }

    #[test]
    fn test_real_backends_fall_back_without_model() {
        // 실제 구성: 모델 아티팩트가 없으면 통계 결과로 폴백
        let engine = EnsembleEngine::new(EngineConfig::with_model("nonexistent/model.onnx"));
        let candles = candles_from_closes(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);

        let result = engine.predict(&candles);
        assert!(result.success);
        assert_eq!(result.model_used, STATISTICAL_MODEL);
    }
}
