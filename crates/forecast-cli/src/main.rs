//! 가격 예측 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # CSV 캔들 파일로 예측 (통계 백엔드 폴백)
//! forecast predict -i data/btc_daily.csv -s BTC/USDT -t 1d
//!
//! # ONNX 모델과 함께 앙상블 예측
//! forecast predict -i data/btc_daily.csv -m models/forecaster.onnx
//!
//! # JSON 출력 (다른 도구로 파이프)
//! forecast predict -i data/btc_daily.csv --json
//!
//! # 계층 분해 레벨 확인
//! forecast inspect -i data/btc_daily.csv
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use forecast_core::logging::{init_logging, LogConfig};
use forecast_core::{Symbol, Timeframe};

mod commands;

use commands::inspect::{run_inspect, InspectConfig};
use commands::predict::{run_predict, PredictConfig};

#[derive(Parser)]
#[command(name = "forecast")]
#[command(about = "이중 백엔드 가격 예측 엔진 CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 캔들 파일에서 앙상블 가격 예측 실행
    Predict {
        /// 캔들 입력 파일 (csv: date,open,high,low,close,volume 또는 json)
        #[arg(short, long)]
        input: String,

        /// ONNX 모델 파일 경로 (없으면 통계 백엔드로 폴백)
        #[arg(short, long)]
        model: Option<String>,

        /// 엔진 설정 TOML 파일
        #[arg(short, long)]
        config: Option<String>,

        /// 심볼 (예: BTC/USDT)
        #[arg(short, long, default_value = "BTC/USDT")]
        symbol: String,

        /// 타임프레임 (1m, 1h, 1d 등)
        #[arg(short, long, default_value = "1d")]
        timeframe: String,

        /// JSON 형식으로 출력
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// 계층 분해 레벨과 추세 추정치 출력
    Inspect {
        /// 캔들 입력 파일 (csv 또는 json)
        #[arg(short, long)]
        input: String,

        /// 심볼 (예: BTC/USDT)
        #[arg(short, long, default_value = "BTC/USDT")]
        symbol: String,

        /// 타임프레임 (1m, 1h, 1d 등)
        #[arg(short, long, default_value = "1d")]
        timeframe: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_logging(LogConfig::from_env()).map_err(|e| anyhow::anyhow!("{}", e))?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            input,
            model,
            config,
            symbol,
            timeframe,
            json,
        } => {
            let symbol: Symbol = symbol
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid symbol: {}", e))?;
            let timeframe: Timeframe = timeframe
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid timeframe: {}", e))?;

            run_predict(PredictConfig {
                input: input.into(),
                model: model.map(Into::into),
                config: config.map(Into::into),
                symbol,
                timeframe,
                json,
            })
        }
        Commands::Inspect {
            input,
            symbol,
            timeframe,
        } => {
            let symbol: Symbol = symbol
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid symbol: {}", e))?;
            let timeframe: Timeframe = timeframe
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid timeframe: {}", e))?;

            run_inspect(InspectConfig {
                input: input.into(),
                symbol,
                timeframe,
            })
        }
    }
}
