//! 가격 예측 실행 명령어.
//!
//! CSV 또는 JSON 파일에서 캔들을 로드해 앙상블 엔진을 실행하고
//! 결과를 출력합니다. CSV 형식: `date,open,high,low,close,volume`.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use forecast_core::{Candle, Symbol, Timeframe};
use forecast_engine::{EngineConfig, EnsembleEngine, PredictionResult};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// 예측 실행 설정.
#[derive(Debug)]
pub struct PredictConfig {
    /// 캔들 입력 파일 (csv 또는 json)
    pub input: PathBuf,
    /// ONNX 모델 경로 (없으면 통계 백엔드만 유효)
    pub model: Option<PathBuf>,
    /// 엔진 설정 TOML 파일
    pub config: Option<PathBuf>,
    /// 심볼 (CSV 입력용)
    pub symbol: Symbol,
    /// 타임프레임 (CSV 입력용)
    pub timeframe: Timeframe,
    /// JSON으로 출력할지 여부
    pub json: bool,
}

/// 예측을 실행하고 결과를 출력합니다.
pub fn run_predict(config: PredictConfig) -> Result<()> {
    let engine_config = build_engine_config(config.config.as_deref(), config.model.as_deref())?;
    let candles = load_candles(&config.input, &config.symbol, config.timeframe)?;

    info!(
        candles = candles.len(),
        input = %config.input.display(),
        "Running ensemble prediction"
    );

    let engine = EnsembleEngine::new(engine_config);
    let result = engine.predict(&candles);

    if config.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&config.symbol, &result);
    }

    Ok(())
}

/// 엔진 설정을 TOML 파일과 CLI 인자에서 조립합니다.
pub fn build_engine_config(
    config_path: Option<&Path>,
    model_path: Option<&Path>,
) -> Result<EngineConfig> {
    let mut engine_config = match config_path {
        Some(path) => config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .with_context(|| format!("Failed to read config file: {}", path.display()))?
            .try_deserialize::<EngineConfig>()
            .context("Invalid engine config")?,
        None => EngineConfig::default(),
    };

    if let Some(path) = model_path {
        engine_config.neural.model_path = path.to_path_buf();
    }

    Ok(engine_config)
}

/// 파일 확장자에 따라 캔들 시퀀스를 로드합니다.
pub fn load_candles(path: &Path, symbol: &Symbol, timeframe: Timeframe) -> Result<Vec<Candle>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let candles = match extension.as_str() {
        "json" => serde_json::from_reader::<_, Vec<Candle>>(BufReader::new(file))
            .context("Invalid JSON candle file")?,
        "csv" => parse_csv_candles(BufReader::new(file), symbol, timeframe)?,
        other => bail!("Unsupported input format: {} (use csv or json)", other),
    };

    if candles.is_empty() {
        bail!("Input file contains no candles: {}", path.display());
    }

    Ok(candles)
}

/// `date,open,high,low,close,volume` 형식의 CSV를 파싱합니다.
///
/// 행은 오래된 것부터 정렬되어 있어야 합니다. 헤더 행은 선택적입니다.
pub fn parse_csv_candles(
    reader: impl BufRead,
    symbol: &Symbol,
    timeframe: Timeframe,
) -> Result<Vec<Candle>> {
    let mut candles = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read CSV line")?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }
        // 헤더 행 건너뛰기
        if line_no == 0 && trimmed.to_lowercase().starts_with("date") {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if fields.len() != 6 {
            bail!(
                "CSV line {}: expected 6 fields (date,open,high,low,close,volume), got {}",
                line_no + 1,
                fields.len()
            );
        }

        let date = NaiveDate::parse_from_str(fields[0], "%Y-%m-%d")
            .with_context(|| format!("CSV line {}: invalid date '{}'", line_no + 1, fields[0]))?;
        let open_time = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));

        let parse_price = |idx: usize, name: &str| -> Result<Decimal> {
            Decimal::from_str(fields[idx]).with_context(|| {
                format!("CSV line {}: invalid {} '{}'", line_no + 1, name, fields[idx])
            })
        };

        let close_time = open_time
            + chrono::Duration::from_std(timeframe.duration())
                .unwrap_or_else(|_| chrono::Duration::zero());

        candles.push(Candle::new(
            symbol.clone(),
            timeframe,
            open_time,
            parse_price(1, "open")?,
            parse_price(2, "high")?,
            parse_price(3, "low")?,
            parse_price(4, "close")?,
            parse_price(5, "volume")?,
            close_time,
        ));
    }

    Ok(candles)
}

/// 사람이 읽기 쉬운 형식으로 결과를 출력합니다.
fn print_result(symbol: &Symbol, result: &PredictionResult) {
    println!("\n=== {} 가격 예측 ===", symbol);

    if !result.success {
        println!("❌ 예측 실패 ({})", result.model_used);
        if let Some(error) = &result.error {
            println!("   원인: {}", error);
        }
        return;
    }

    let arrow = match result.direction {
        Some(forecast_engine::Direction::Up) => "▲",
        Some(forecast_engine::Direction::Down) => "▼",
        _ => "→",
    };

    println!("모델:        {}", result.model_used);
    println!(
        "현재 가격:   {:.4}",
        result.current_price.unwrap_or_default()
    );
    println!(
        "예측 가격:   {:.4} {}",
        result.predicted_price.unwrap_or_default(),
        arrow
    );
    println!(
        "변화율:      {:+.3}%",
        result.price_change_pct.unwrap_or_default()
    );
    println!(
        "신뢰도:      {:.1}%",
        result.confidence.unwrap_or_default() * 100.0
    );

    if let Some(components) = &result.components {
        println!("--- 개별 백엔드 ---");
        for part in [&components.statistical, &components.neural] {
            println!(
                "{:>12}: {:.4} (신뢰도 {:.1}%)",
                part.model_used,
                part.predicted_price.unwrap_or_default(),
                part.confidence.unwrap_or_default() * 100.0
            );
        }
    }
}
