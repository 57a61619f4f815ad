//! 레벨별 추세 외삽 및 가중 결합.

use crate::decompose::Level;
use crate::error::{ForecastError, ForecastResult};

/// 마지막 3개 점에 1차 최소제곱 추세선을 적합해 기울기를 구합니다.
///
/// 점이 3개 미만이면 기울기 0으로 간주합니다.
fn trend_slope(values: &[f64]) -> f64 {
    if values.len() < 3 {
        return 0.0;
    }

    let tail = &values[values.len() - 3..];
    let n = tail.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = tail.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in tail.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }

    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// 한 레벨의 한 스텝 선행 추정치를 계산합니다.
///
/// 적합된 기울기를 마지막 관측값에 한 번 적용합니다. 점이 3개 미만인
/// 레벨은 마지막 값을 그대로 사용합니다 (기울기 0).
pub fn level_estimate(level: &Level) -> ForecastResult<f64> {
    let last = level
        .last()
        .ok_or_else(|| ForecastError::InvalidInput("empty decomposition level".to_string()))?;

    Ok(last + trend_slope(&level.values))
}

/// 레벨별 추정치를 고정 가중치로 결합해 원시 예측 가격을 만듭니다.
///
/// 가중치는 레벨 1~3에 순서대로 적용되며, 존재하지 않는 레벨의
/// 가중치는 버려집니다. `renormalize`가 false(기본)이면 버려진 가중치
/// 질량만큼 결과가 낮은 레벨 쪽으로 치우치고, true이면 존재하는
/// 레벨의 가중치 합이 1이 되도록 재조정됩니다.
pub fn interpolate(levels: &[Level], weights: &[f64; 3], renormalize: bool) -> ForecastResult<f64> {
    if levels.is_empty() {
        return Err(ForecastError::InvalidInput(
            "no decomposition levels".to_string(),
        ));
    }

    let mut weighted_sum = 0.0;
    let mut weight_used = 0.0;
    for (level, weight) in levels.iter().zip(weights.iter()) {
        weighted_sum += weight * level_estimate(level)?;
        weight_used += weight;
    }

    if renormalize && weight_used > 0.0 {
        Ok(weighted_sum / weight_used)
    } else {
        Ok(weighted_sum)
    }
}
