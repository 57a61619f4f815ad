//! 최근 변동성 기반 신뢰도 추정.

use crate::types::MIN_PRICE;

/// 변동성 윈도우가 부족할 때의 기본 신뢰도.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;
/// 통계 백엔드 신뢰도 하한.
pub const CONFIDENCE_FLOOR: f64 = 0.5;
/// 통계 백엔드 신뢰도 상한.
pub const CONFIDENCE_CAP: f64 = 0.95;

/// 최근 종가의 변동성에서 스칼라 신뢰도를 계산합니다.
///
/// 마지막 `window`개 종가의 표본 표준편차와 평균으로
/// `volatility_ratio = std / mean`을 구하고,
/// `clamp(1 - 2 * volatility_ratio, 0.5, 0.95)`를 반환합니다.
/// 최근 변동성이 높을수록 신뢰도는 엄격하게 낮아집니다.
///
/// 종가가 `window`개 미만이면 0.7을 반환합니다.
pub fn estimate_confidence(closes: &[f64], window: usize) -> f64 {
    if closes.len() < window || window < 2 {
        return DEFAULT_CONFIDENCE;
    }

    let tail = &closes[closes.len() - window..];
    let n = tail.len() as f64;
    let mean = tail.iter().sum::<f64>() / n;
    let variance = tail.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();

    let volatility_ratio = std_dev / mean.max(MIN_PRICE);
    (1.0 - 2.0 * volatility_ratio).clamp(CONFIDENCE_FLOOR, CONFIDENCE_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_window_defaults() {
        assert_eq!(estimate_confidence(&[100.0, 101.0], 5), DEFAULT_CONFIDENCE);
        assert_eq!(estimate_confidence(&[], 5), DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_constant_closes_hit_cap() {
        let closes = [100.0; 5];
        assert_eq!(estimate_confidence(&closes, 5), CONFIDENCE_CAP);
    }

    #[test]
    fn test_high_volatility_hits_floor() {
        let closes = [100.0, 10.0, 250.0, 30.0, 400.0];
        assert_eq!(estimate_confidence(&closes, 5), CONFIDENCE_FLOOR);
    }

    #[test]
    fn test_volatility_lowers_confidence() {
        let calm = [100.0, 100.5, 101.0, 100.8, 101.2];
        let choppy = [100.0, 95.0, 107.0, 92.0, 110.0];

        let calm_conf = estimate_confidence(&calm, 5);
        let choppy_conf = estimate_confidence(&choppy, 5);

        assert!(calm_conf > choppy_conf);
        assert!(calm_conf <= CONFIDENCE_CAP);
        assert!(choppy_conf >= CONFIDENCE_FLOOR);
    }

    #[test]
    fn test_bounds_hold_for_degenerate_prices() {
        // 0에 가까운 평균도 하한을 뚫지 못함
        let closes = [0.0, 0.0, 0.0, 0.0, 1e-12];
        let conf = estimate_confidence(&closes, 5);
        assert!((CONFIDENCE_FLOOR..=CONFIDENCE_CAP).contains(&conf));
    }
}
