//! 공통 타입 정의.

pub mod symbol;
pub mod timeframe;

pub use symbol::{MarketType, Symbol};
pub use timeframe::Timeframe;

use rust_decimal::Decimal;

/// 가격 타입.
pub type Price = Decimal;

/// 수량 타입.
pub type Quantity = Decimal;
