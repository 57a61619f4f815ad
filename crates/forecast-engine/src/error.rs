//! 예측 엔진 에러 타입.

use thiserror::Error;

/// 예측 작업에서 발생할 수 있는 에러.
#[derive(Debug, Clone, Error)]
pub enum ForecastError {
    /// 백엔드 최소 요구량보다 적은 데이터
    #[error("Insufficient data: need {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// 모델 아티팩트 없음 또는 로드 실패
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// 분해, 외삽 또는 신경망 추론 중 런타임 에러
    #[error("Inference error: {0}")]
    Inference(String),

    /// 두 백엔드 모두 실패
    #[error("All backends failed: {0}")]
    EnsembleFailure(String),

    /// 유효하지 않은 입력 데이터
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// 예측 작업을 위한 Result 타입.
pub type ForecastResult<T> = Result<T, ForecastError>;

impl ForecastError {
    /// 이 에러가 복구 가능한지 확인 (다른 데이터로 재시도 가능).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ForecastError::InsufficientData { .. } | ForecastError::InvalidInput(_)
        )
    }

    /// 이 에러가 모델 아티팩트 문제인지 확인.
    ///
    /// 모델 로드 실패는 프로세스 수명 동안 영구적이므로 호출자는
    /// 재시도 대신 통계 백엔드로 폴백해야 합니다.
    pub fn is_model_fault(&self) -> bool {
        matches!(self, ForecastError::ModelUnavailable(_))
    }
}

// ONNX Runtime 에러로부터 변환
impl From<ort::Error> for ForecastError {
    fn from(err: ort::Error) -> Self {
        ForecastError::Inference(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ForecastError::InsufficientData {
            required: 5,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Insufficient data: need 5 bars, got 3");

        let err = ForecastError::ModelUnavailable("file not found".to_string());
        assert_eq!(err.to_string(), "Model unavailable: file not found");
    }

    #[test]
    fn test_error_recoverable() {
        let err = ForecastError::InsufficientData {
            required: 5,
            actual: 0,
        };
        assert!(err.is_recoverable());

        let err = ForecastError::ModelUnavailable("corrupted".to_string());
        assert!(!err.is_recoverable());
        assert!(err.is_model_fault());
    }
}
