//! 예측 시스템의 공통 에러 타입.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("Config error: {0}")]
    Config(String),

    /// 파일 입출력 에러
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 직렬화 에러
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 시장 데이터 에러
    #[error("Data error: {0}")]
    Data(String),

    /// 파싱 에러
    #[error("Parse error: {0}")]
    Parse(String),
}

/// 핵심 도메인 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::Config("missing model path".to_string());
        assert_eq!(err.to_string(), "Config error: missing model path");

        let err = CoreError::Parse("invalid close price".to_string());
        assert_eq!(err.to_string(), "Parse error: invalid close price");
    }
}
