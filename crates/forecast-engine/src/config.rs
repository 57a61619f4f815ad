//! 예측 엔진 설정.
//!
//! 모든 튜닝 가능한 상수는 배포별로 보정되는 설정 값입니다.
//! 각 설정은 serde로 역직렬화 가능하며 TOML 파일에서 로드할 수 있습니다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 통계 백엔드 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticalConfig {
    /// 작업 윈도우 크기 (최근 종가 수)
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// 레벨 1~3 추정치 결합 가중치
    #[serde(default = "default_level_weights")]
    pub level_weights: [f64; 3],
    /// 누락된 레벨의 가중치를 재정규화할지 여부.
    ///
    /// false(기본값)이면 누락된 레벨의 가중치 질량이 그대로 빠지고,
    /// true이면 존재하는 레벨의 가중치 합이 1이 되도록 재조정됩니다.
    #[serde(default)]
    pub renormalize_weights: bool,
    /// 변동성 기반 신뢰도 계산에 사용할 최근 종가 수
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,
}

fn default_lookback() -> usize {
    30
}

fn default_level_weights() -> [f64; 3] {
    [0.5, 0.3, 0.2]
}

fn default_volatility_window() -> usize {
    5
}

impl Default for StatisticalConfig {
    fn default() -> Self {
        Self {
            lookback: default_lookback(),
            level_weights: default_level_weights(),
            renormalize_weights: false,
            volatility_window: default_volatility_window(),
        }
    }
}

impl StatisticalConfig {
    /// 가중치 재정규화 설정.
    pub fn with_renormalize_weights(mut self, enabled: bool) -> Self {
        self.renormalize_weights = enabled;
        self
    }

    /// 작업 윈도우 크기 설정.
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }
}

/// 신경망 백엔드 설정.
///
/// 모델은 `[1, lookback, 5]` 형태의 float32 입력 텐서 하나와
/// 스칼라 출력 텐서 하나를 노출해야 합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralConfig {
    /// ONNX 모델 파일 경로
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// 로깅/식별을 위한 모델 이름
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// 입력 윈도우 크기 (캔들 수)
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// 출력 신호를 가격으로 역정규화할 때의 스케일 계수.
    ///
    /// `predicted = current * (1 + signal * scale_factor)`. 배포별로
    /// 보정되는 값이며 보통 몇 퍼센트 수준입니다.
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    /// 기본 신뢰도
    #[serde(default = "default_base_confidence")]
    pub base_confidence: f64,
    /// 신뢰도 상한
    #[serde(default = "default_confidence_cap")]
    pub confidence_cap: f64,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/price_forecaster.onnx")
}

fn default_model_name() -> String {
    crate::types::NEURAL_MODEL.to_string()
}

fn default_scale_factor() -> f64 {
    0.05
}

fn default_base_confidence() -> f64 {
    0.6
}

fn default_confidence_cap() -> f64 {
    0.95
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            model_name: default_model_name(),
            lookback: default_lookback(),
            scale_factor: default_scale_factor(),
            base_confidence: default_base_confidence(),
            confidence_cap: default_confidence_cap(),
        }
    }
}

impl NeuralConfig {
    /// 주어진 모델 경로로 새 설정 생성.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    /// 모델 이름 설정.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// 스케일 계수 설정.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// 기본 신뢰도 설정.
    pub fn with_base_confidence(mut self, base_confidence: f64) -> Self {
        self.base_confidence = base_confidence;
        self
    }
}

/// 앙상블 결합 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// 신경망 백엔드 가중치
    #[serde(default = "default_neural_weight")]
    pub neural_weight: f64,
    /// 통계 백엔드 가중치
    #[serde(default = "default_statistical_weight")]
    pub statistical_weight: f64,
    /// 두 백엔드가 모두 성공했을 때의 신뢰도 보너스 승수 (> 1.0)
    #[serde(default = "default_confidence_boost")]
    pub confidence_boost: f64,
    /// 결합 신뢰도 절대 상한
    #[serde(default = "default_confidence_cap")]
    pub confidence_cap: f64,
}

fn default_neural_weight() -> f64 {
    0.6
}

fn default_statistical_weight() -> f64 {
    0.4
}

fn default_confidence_boost() -> f64 {
    1.1
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            neural_weight: default_neural_weight(),
            statistical_weight: default_statistical_weight(),
            confidence_boost: default_confidence_boost(),
            confidence_cap: default_confidence_cap(),
        }
    }
}

/// 전체 엔진 설정.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 통계 백엔드 설정
    #[serde(default)]
    pub statistical: StatisticalConfig,
    /// 신경망 백엔드 설정
    #[serde(default)]
    pub neural: NeuralConfig,
    /// 앙상블 결합 설정
    #[serde(default)]
    pub ensemble: EnsembleConfig,
}

impl EngineConfig {
    /// 주어진 모델 경로로 새 엔진 설정 생성.
    pub fn with_model(model_path: impl Into<PathBuf>) -> Self {
        Self {
            neural: NeuralConfig::new(model_path),
            ..Default::default()
        }
    }
}
