//! 예측 엔진의 공통 타입.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 통계 백엔드 식별 태그.
pub const STATISTICAL_MODEL: &str = "statistical";
/// 신경망 백엔드 식별 태그.
pub const NEURAL_MODEL: &str = "neural";
/// 앙상블 식별 태그.
pub const ENSEMBLE_MODEL: &str = "ensemble";

/// 0 나눗셈 가드를 위한 최소 가격 하한.
pub(crate) const MIN_PRICE: f64 = 1e-8;

/// 예측된 가격 이동 방향.
///
/// 방향은 `predicted_price - current_price`의 부호만으로 결정되며,
/// 차이가 0이면 Flat입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// 가격 상승 예상
    Up,
    /// 가격 하락 예상
    Down,
    /// 가격 유지 예상
    Flat,
}

impl Direction {
    /// 가격 변화량에서 방향으로 변환.
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Direction::Up
        } else if change < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }

    /// 계산을 위해 방향을 숫자 값으로 변환.
    pub fn to_numeric(&self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
            Direction::Flat => 0.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
            Direction::Flat => write!(f, "FLAT"),
        }
    }
}

/// 앙상블 결합 시 진단용으로 첨부되는 개별 백엔드 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleComponents {
    /// 통계 백엔드 결과
    pub statistical: PredictionResult,
    /// 신경망 백엔드 결과
    pub neural: PredictionResult,
}

/// 백엔드 또는 앙상블의 최종 예측 결과.
///
/// 생성 후 불변입니다. `success == false`이면 `error`와 `model_used`만
/// 의미가 있으며 나머지 필드는 모두 None입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// 예측 성공 여부
    pub success: bool,
    /// 예측된 가격
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_price: Option<f64>,
    /// 신뢰도 점수 (0.0 ~ 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// 현재 가격 (마지막 종가)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    /// 예측 가격 변화량
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change: Option<f64>,
    /// 예측 가격 변화율 (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_pct: Option<f64>,
    /// 예측 방향
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// 이 결과를 생성한 모델
    pub model_used: String,
    /// 실패 시 사람이 읽을 수 있는 에러 메시지
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 앙상블 결합 시 개별 백엔드 결과 (진단용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Box<EnsembleComponents>>,
}

impl PredictionResult {
    /// 성공 결과 생성.
    ///
    /// 변화량, 변화율, 방향은 예측 가격과 현재 가격에서 계산됩니다.
    /// 신뢰도는 [0, 1]로 클램프됩니다.
    pub fn success(
        model_used: impl Into<String>,
        predicted_price: f64,
        confidence: f64,
        current_price: f64,
    ) -> Self {
        let price_change = predicted_price - current_price;
        let price_change_pct = price_change / current_price.max(MIN_PRICE) * 100.0;

        Self {
            success: true,
            predicted_price: Some(predicted_price),
            confidence: Some(confidence.clamp(0.0, 1.0)),
            current_price: Some(current_price),
            price_change: Some(price_change),
            price_change_pct: Some(price_change_pct),
            direction: Some(Direction::from_change(price_change)),
            model_used: model_used.into(),
            error: None,
            components: None,
        }
    }

    /// 실패 결과 생성.
    pub fn failure(model_used: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            success: false,
            predicted_price: None,
            confidence: None,
            current_price: None,
            price_change: None,
            price_change_pct: None,
            direction: None,
            model_used: model_used.into(),
            error: Some(error.to_string()),
            components: None,
        }
    }

    /// 개별 백엔드 결과를 진단용으로 첨부.
    pub fn with_components(mut self, statistical: PredictionResult, neural: PredictionResult) -> Self {
        self.components = Some(Box::new(EnsembleComponents {
            statistical,
            neural,
        }));
        self
    }
}
