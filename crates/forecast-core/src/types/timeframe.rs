//! 캔들 데이터를 위한 타임프레임 정의.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 캔들 타임프레임.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// 1분봉
    M1,
    /// 5분봉
    M5,
    /// 15분봉
    M15,
    /// 30분봉
    M30,
    /// 1시간봉
    H1,
    /// 4시간봉
    H4,
    /// 일봉
    D1,
    /// 주봉
    W1,
}

impl Timeframe {
    /// 이 타임프레임의 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        match self {
            Timeframe::M1 => Duration::from_secs(60),
            Timeframe::M5 => Duration::from_secs(5 * 60),
            Timeframe::M15 => Duration::from_secs(15 * 60),
            Timeframe::M30 => Duration::from_secs(30 * 60),
            Timeframe::H1 => Duration::from_secs(60 * 60),
            Timeframe::H4 => Duration::from_secs(4 * 60 * 60),
            Timeframe::D1 => Duration::from_secs(24 * 60 * 60),
            Timeframe::W1 => Duration::from_secs(7 * 24 * 60 * 60),
        }
    }

    /// 이 타임프레임의 기간을 초 단위로 반환합니다.
    pub fn as_secs(&self) -> u64 {
        self.duration().as_secs()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::M1 => write!(f, "1m"),
            Timeframe::M5 => write!(f, "5m"),
            Timeframe::M15 => write!(f, "15m"),
            Timeframe::M30 => write!(f, "30m"),
            Timeframe::H1 => write!(f, "1h"),
            Timeframe::H4 => write!(f, "4h"),
            Timeframe::D1 => write!(f, "1d"),
            Timeframe::W1 => write!(f, "1w"),
        }
    }
}

impl FromStr for Timeframe {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" | "m1" => Ok(Timeframe::M1),
            "5m" | "m5" => Ok(Timeframe::M5),
            "15m" | "m15" => Ok(Timeframe::M15),
            "30m" | "m30" => Ok(Timeframe::M30),
            "1h" | "h1" => Ok(Timeframe::H1),
            "4h" | "h4" => Ok(Timeframe::H4),
            "1d" | "d1" | "d" | "daily" => Ok(Timeframe::D1),
            "1w" | "w1" | "w" | "weekly" => Ok(Timeframe::W1),
            _ => Err(CoreError::Parse(format!("Unknown timeframe: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_duration() {
        assert_eq!(Timeframe::M1.as_secs(), 60);
        assert_eq!(Timeframe::H1.as_secs(), 3600);
        assert_eq!(Timeframe::D1.as_secs(), 86400);
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!("1h".parse::<Timeframe>().unwrap(), Timeframe::H1);
        assert_eq!("daily".parse::<Timeframe>().unwrap(), Timeframe::D1);
        assert!("3h".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_timeframe_roundtrip() {
        let tf = Timeframe::H4;
        assert_eq!(tf.to_string().parse::<Timeframe>().unwrap(), tf);
    }
}
