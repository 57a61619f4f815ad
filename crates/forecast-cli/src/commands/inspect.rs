//! 분해 레벨 검사 명령어.
//!
//! 통계 백엔드가 보는 계층 분해 결과와 레벨별 추세 추정치를
//! 출력하는 디버깅 도구입니다.

use crate::commands::predict::load_candles;
use anyhow::Result;
use forecast_core::{Symbol, Timeframe};
use forecast_engine::decompose::decompose;
use forecast_engine::trend::level_estimate;
use forecast_engine::StatisticalConfig;
use rust_decimal::prelude::ToPrimitive;
use std::path::PathBuf;

/// 검사 설정.
#[derive(Debug)]
pub struct InspectConfig {
    /// 캔들 입력 파일 (csv 또는 json)
    pub input: PathBuf,
    /// 심볼 (CSV 입력용)
    pub symbol: Symbol,
    /// 타임프레임 (CSV 입력용)
    pub timeframe: Timeframe,
}

/// 분해 레벨을 출력합니다.
pub fn run_inspect(config: InspectConfig) -> Result<()> {
    let candles = load_candles(&config.input, &config.symbol, config.timeframe)?;
    let engine_config = StatisticalConfig::default();

    let closes: Vec<f64> = candles
        .iter()
        .map(|c| c.close.to_f64().unwrap_or(0.0))
        .collect();
    let start = closes.len().saturating_sub(engine_config.lookback);
    let window = &closes[start..];

    println!("\n=== {} 계층 분해 ===", config.symbol);
    println!(
        "캔들 {}개 중 최근 {}개 사용\n",
        closes.len(),
        window.len()
    );

    let levels = decompose(window);
    for (idx, level) in levels.iter().enumerate() {
        let weight = engine_config.level_weights.get(idx).copied().unwrap_or(0.0);
        let estimate = level_estimate(level)?;

        println!(
            "레벨 {} (보폭 {:>2}, 가중치 {:.1}): {}개 값, 다음 스텝 추정 {:.4}",
            idx + 1,
            level.stride,
            weight,
            level.values.len(),
            estimate
        );

        // 마지막 값 몇 개만 표시
        let tail_start = level.values.len().saturating_sub(5);
        let tail: Vec<String> = level.values[tail_start..]
            .iter()
            .map(|v| format!("{:.2}", v))
            .collect();
        println!("         ... {}", tail.join(", "));
    }

    Ok(())
}
