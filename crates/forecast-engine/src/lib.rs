//! 이중 백엔드 가격 예측 엔진.
//!
//! 이 크레이트는 두 개의 독립적으로 실패할 수 있는 백엔드를 가중
//! 앙상블로 결합하는 가격 예측 엔진을 제공합니다:
//!
//! - **통계 백엔드**: 계층적 다중 주기 추세 분해 예측기 (폴백 모델)
//! - **신경망 백엔드**: ONNX 형식으로 직렬화된 외부 모델 세션
//!
//! # 아키텍처
//!
//! ```text
//! Candle Sequence (오래된 것부터)
//!        │
//!        ├──────────────────────────┐
//!        ▼                          ▼
//! ┌───────────────────┐    ┌─────────────────┐
//! │ Statistical       │    │ Neural          │
//! │ decompose → trend │    │ normalize →     │
//! │ → sanitize → conf │    │ ONNX inference  │
//! └─────────┬─────────┘    └────────┬────────┘
//!           │                       │
//!           └───────────┬───────────┘
//!                       ▼
//!               ┌───────────────┐
//!               │   Ensemble    │ ← 결합 / 폴백 / 실패
//!               └───────┬───────┘
//!                       ▼
//!               PredictionResult
//! ```
//!
//! # 예제
//!
//! ```ignore
//! use forecast_engine::{EngineConfig, EnsembleEngine};
//!
//! let engine = EnsembleEngine::new(EngineConfig::with_model("models/forecaster.onnx"));
//! let result = engine.predict(&candles);
//! if result.success {
//!     println!("{} → {:.2}", result.model_used, result.predicted_price.unwrap());
//! }
//! ```

pub mod backend;
pub mod config;
pub mod confidence;
pub mod decompose;
pub mod ensemble;
pub mod error;
pub mod neural;
pub mod sanitize;
pub mod statistical;
pub mod trend;
pub mod types;

// 자주 사용되는 타입 재내보내기
pub use backend::{MockBackend, PriceBackend};
pub use config::{EngineConfig, EnsembleConfig, NeuralConfig, StatisticalConfig};
pub use ensemble::EnsembleEngine;
pub use error::{ForecastError, ForecastResult};
pub use neural::NeuralBackend;
pub use statistical::StatisticalBackend;
pub use types::{
    Direction, EnsembleComponents, PredictionResult, ENSEMBLE_MODEL, NEURAL_MODEL,
    STATISTICAL_MODEL,
};
