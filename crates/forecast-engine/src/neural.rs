//! 신경망 백엔드 - ONNX 모델 세션 래퍼.
//!
//! 모델은 별도로 학습되어 ONNX 형식으로 내보내야 하며 다음 계약을
//! 따라야 합니다:
//! - 입력: `[1, lookback, 5]` 형태의 float32 텐서 (OHLCV 채널)
//! - 출력: 스칼라 float32 신호 하나
//!
//! 세션 로드는 프로세스당 한 번입니다. 로드 실패는 영구적이며 이후의
//! 모든 예측은 재시도 없이 즉시 실패합니다.

use crate::backend::PriceBackend;
use crate::config::NeuralConfig;
use crate::error::{ForecastError, ForecastResult};
use crate::types::{PredictionResult, MIN_PRICE};
use forecast_core::Candle;
use ort::session::Session;
use rust_decimal::prelude::ToPrimitive;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// 입력 텐서의 OHLCV 채널 수.
pub const INPUT_CHANNELS: usize = 5;

/// 세션 로드 상태 기계.
///
/// `Uninitialized → Ready | Failed`로만 전이합니다. 전이는 백엔드의
/// Mutex를 잡은 채 일어나므로 "로딩 중" 상태는 락 보유 구간 그 자체이며,
/// 동시 첫 호출들은 로드가 끝날 때까지 블록된 뒤 같은 세션을 공유합니다.
enum SessionState {
    /// 아직 로드 시도 전
    Uninitialized,
    /// 로드 완료, 추론 가능
    Ready(Session),
    /// 로드 실패 - 프로세스 수명 동안 영구적
    Failed(String),
}

/// ONNX 기반 가격 예측 백엔드.
pub struct NeuralBackend {
    config: NeuralConfig,
    state: Mutex<SessionState>,
}

impl NeuralBackend {
    /// 주어진 설정으로 새 백엔드 생성.
    ///
    /// 세션은 여기서 로드되지 않고 첫 `initialize` 또는 `predict`
    /// 호출에서 지연 로드됩니다.
    pub fn new(config: NeuralConfig) -> Self {
        Self {
            config,
            state: Mutex::new(SessionState::Uninitialized),
        }
    }

    /// 기본 설정으로 백엔드 생성.
    pub fn with_defaults() -> Self {
        Self::new(NeuralConfig::default())
    }

    /// 설정 반환.
    pub fn config(&self) -> &NeuralConfig {
        &self.config
    }

    /// 세션을 로드합니다. 멱등 - 이미 로드되었으면 no-op.
    ///
    /// 아티팩트가 없거나 로드에 실패하면 백엔드는 영구적으로
    /// 사용 불가 상태가 되고 `ModelUnavailable`을 반환합니다.
    pub fn initialize(&self) -> ForecastResult<()> {
        let mut state = self.lock_state();
        Self::ensure_loaded(&self.config, &mut state);

        match &*state {
            SessionState::Ready(_) => Ok(()),
            SessionState::Failed(msg) => Err(ForecastError::ModelUnavailable(msg.clone())),
            SessionState::Uninitialized => Err(ForecastError::ModelUnavailable(
                "model session not loaded".to_string(),
            )),
        }
    }

    /// 모델이 사용 가능한 상태인지 확인 (로드 시도 없음).
    pub fn is_ready(&self) -> bool {
        matches!(&*self.lock_state(), SessionState::Ready(_))
    }

    // 상태 enum은 panic한 보유자가 논리적으로 깨뜨릴 수 없으므로
    // 포이즌된 락은 내부 값으로 복구한다
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Uninitialized 상태에서만 로드를 시도하고 상태를 전이시킵니다.
    fn ensure_loaded(config: &NeuralConfig, state: &mut SessionState) {
        if matches!(state, SessionState::Uninitialized) {
            match Self::load_session(config) {
                Ok(session) => {
                    info!(model = %config.model_name, "ONNX model loaded successfully");
                    *state = SessionState::Ready(session);
                }
                Err(msg) => {
                    warn!(model = %config.model_name, error = %msg, "ONNX model load failed");
                    *state = SessionState::Failed(msg);
                }
            }
        }
    }

    fn load_session(config: &NeuralConfig) -> Result<Session, String> {
        let path = &config.model_path;

        if !path.exists() {
            return Err(format!("Model file not found: {}", path.display()));
        }

        info!("Loading ONNX model from: {}", path.display());

        Session::builder()
            .map_err(|e| format!("Failed to create session builder: {}", e))?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| format!("Failed to set optimization level: {}", e))?
            .commit_from_file(path)
            .map_err(|e| format!("Failed to load model: {}", e))
    }

    /// 정규화된 입력으로 추론을 실행해 스칼라 신호를 얻습니다.
    fn run_inference(&self, input_data: Vec<f32>) -> ForecastResult<f32> {
        let mut state = self.lock_state();
        Self::ensure_loaded(&self.config, &mut state);

        let session = match &mut *state {
            SessionState::Ready(session) => session,
            SessionState::Failed(msg) => {
                return Err(ForecastError::ModelUnavailable(msg.clone()))
            }
            SessionState::Uninitialized => {
                return Err(ForecastError::ModelUnavailable(
                    "model session not loaded".to_string(),
                ))
            }
        };

        let input_shape = [
            1i64,
            self.config.lookback as i64,
            INPUT_CHANNELS as i64,
        ];
        let input_tensor =
            ort::value::Tensor::from_array((input_shape, input_data.into_boxed_slice()))
                .map_err(|e| {
                    ForecastError::Inference(format!("Failed to create input tensor: {}", e))
                })?;

        let outputs = session
            .run(ort::inputs!["input" => input_tensor])
            .map_err(|e| ForecastError::Inference(format!("Inference failed: {}", e)))?;

        // 첫 번째 출력 가져오기 ("output" 이름 또는 첫 번째 사용 가능한 것)
        let output_name = outputs
            .iter()
            .next()
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| ForecastError::Inference("No output tensor found".to_string()))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| ForecastError::Inference("Failed to get output by name".to_string()))?;

        let (_, output_slice) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ForecastError::Inference(format!("Failed to extract output tensor: {}", e)))?;

        // 출력을 드롭하기 전에 신호를 소유 값으로 복사
        let signal = *output_slice
            .first()
            .ok_or_else(|| ForecastError::Inference("Empty output tensor".to_string()))?;

        drop(outputs);

        Ok(signal)
    }

    fn try_predict(&self, candles: &[Candle]) -> ForecastResult<PredictionResult> {
        if candles.is_empty() {
            return Err(ForecastError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        let rows = prepare_window(candles, self.config.lookback);
        let input_data = normalize_channels(&rows);

        let current = candles[candles.len() - 1].close.to_f64().unwrap_or(0.0);

        let signal = self.run_inference(input_data)? as f64;
        let predicted = current * (1.0 + signal * self.config.scale_factor);
        let signal_score = (predicted - current) / current.max(MIN_PRICE);
        let confidence =
            (self.config.base_confidence + signal_score.abs() * 5.0).min(self.config.confidence_cap);

        debug!(
            signal,
            predicted,
            confidence,
            "Neural prediction"
        );

        Ok(PredictionResult::success(
            &self.config.model_name,
            predicted,
            confidence,
            current,
        ))
    }
}

impl PriceBackend for NeuralBackend {
    fn name(&self) -> &str {
        &self.config.model_name
    }

    fn predict(&self, candles: &[Candle]) -> PredictionResult {
        match self.try_predict(candles) {
            Ok(result) => result,
            Err(err) => {
                debug!(error = %err, "Neural backend failed");
                PredictionResult::failure(&self.config.model_name, err)
            }
        }
    }
}

/// 입력 윈도우 준비: 최근 `lookback`개 캔들을 OHLCV 행으로 변환.
///
/// 캔들이 부족하면 가장 오래된 캔들을 앞쪽에 반복해 순서를 유지한 채
/// 패딩합니다. 호출자는 비어있지 않은 입력을 보장해야 합니다.
fn prepare_window(candles: &[Candle], lookback: usize) -> Vec<[f64; INPUT_CHANNELS]> {
    let start = candles.len().saturating_sub(lookback);
    let recent = &candles[start..];

    let mut rows = Vec::with_capacity(lookback);
    if recent.len() < lookback {
        let earliest = candle_row(&recent[0]);
        rows.extend(std::iter::repeat(earliest).take(lookback - recent.len()));
    }
    rows.extend(recent.iter().map(candle_row));
    rows
}

fn candle_row(candle: &Candle) -> [f64; INPUT_CHANNELS] {
    [
        candle.open.to_f64().unwrap_or(0.0),
        candle.high.to_f64().unwrap_or(0.0),
        candle.low.to_f64().unwrap_or(0.0),
        candle.close.to_f64().unwrap_or(0.0),
        candle.volume.to_f64().unwrap_or(0.0),
    ]
}

/// 각 OHLCV 채널을 윈도우 전체에 대해 독립적으로 min-max 정규화.
///
/// 범위가 0인 채널은 0 나눗셈을 피하기 위해 범위 1로 간주합니다.
/// 결과는 행 우선(시간 스텝별 채널 연속) f32 배열입니다.
fn normalize_channels(rows: &[[f64; INPUT_CHANNELS]]) -> Vec<f32> {
    let mut mins = [f64::INFINITY; INPUT_CHANNELS];
    let mut maxs = [f64::NEG_INFINITY; INPUT_CHANNELS];

    for row in rows {
        for ch in 0..INPUT_CHANNELS {
            mins[ch] = mins[ch].min(row[ch]);
            maxs[ch] = maxs[ch].max(row[ch]);
        }
    }

    let mut data = Vec::with_capacity(rows.len() * INPUT_CHANNELS);
    for row in rows {
        for ch in 0..INPUT_CHANNELS {
            let range = maxs[ch] - mins[ch];
            let range = if range > 0.0 { range } else { 1.0 };
            data.push(((row[ch] - mins[ch]) / range) as f32);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_missing_model_is_permanently_unavailable() {
        let backend = NeuralBackend::new(NeuralConfig::new("nonexistent/model.onnx"));

        let first = backend.initialize();
        assert!(matches!(first, Err(ForecastError::ModelUnavailable(_))));
        assert!(!backend.is_ready());

        // 두 번째 호출은 재시도 없이 같은 실패를 즉시 반환
        let second = backend.initialize();
        assert!(matches!(second, Err(ForecastError::ModelUnavailable(_))));
    }

    #[test]
    fn test_predict_fails_fast_after_failed_load() {
        let backend = NeuralBackend::new(NeuralConfig::new("nonexistent/model.onnx"));
        let candles = candles_from_closes(&[100.0, 101.0, 102.0]);

        let result = backend.predict(&candles);
        assert!(!result.success);
        assert_eq!(result.model_used, backend.name());
        assert!(result.error.as_deref().unwrap().starts_with("Model unavailable"));
    }

    #[test]
    fn test_empty_input_is_insufficient() {
        let backend = NeuralBackend::with_defaults();
        let result = backend.predict(&[]);

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Insufficient data: need 1 bars, got 0")
        );
    }

    #[test]
    fn test_window_front_padding_preserves_order() {
        let candles = candles_from_closes(&[100.0, 110.0]);
        let rows = prepare_window(&candles, 4);

        assert_eq!(rows.len(), 4);
        // 앞쪽 두 행은 가장 오래된 캔들의 반복
        assert_eq!(rows[0][3], 100.0);
        assert_eq!(rows[1][3], 100.0);
        assert_eq!(rows[2][3], 100.0);
        assert_eq!(rows[3][3], 110.0);
    }

    #[test]
    fn test_window_truncates_to_most_recent() {
        let closes: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let candles = candles_from_closes(&closes);
        let rows = prepare_window(&candles, 30);

        assert_eq!(rows.len(), 30);
        assert_eq!(rows[0][3], 10.0);
        assert_eq!(rows[29][3], 39.0);
    }

    #[test]
    fn test_channel_normalization_bounds() {
        let candles = candles_from_closes(&[100.0, 150.0, 200.0]);
        let rows = prepare_window(&candles, 3);
        let data = normalize_channels(&rows);

        assert_eq!(data.len(), 3 * INPUT_CHANNELS);
        for &v in &data {
            assert!((0.0..=1.0).contains(&v));
        }
        // 종가 채널: 최소 0, 최대 1
        assert_eq!(data[3], 0.0);
        assert_eq!(data[2 * INPUT_CHANNELS + 3], 1.0);
    }

    #[test]
    fn test_zero_range_channel_guard() {
        // 평평한 캔들의 거래량 채널은 범위가 0
        let candles = candles_from_closes(&[100.0, 100.0, 100.0]);
        let rows = prepare_window(&candles, 3);
        let data = normalize_channels(&rows);

        for &v in &data {
            assert!(v.is_finite());
            assert_eq!(v, 0.0);
        }
    }
}
