use std::time::Duration;

use stackit_ai::{GeminiClientConfig, ServiceConfig};

use crate::error::AppError;

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiClientConfig,
    pub service: ServiceConfig,
}

impl Config {
    /// Optional:
    /// - `GEMINI_API_KEY`: without it every capability serves synthetic results
    /// - `GEMINI_BASE_URL`, `GEMINI_MODEL`, `GEMINI_TIMEOUT_SECS`,
    ///   `GEMINI_MAX_ERROR_BODY_BYTES`
    /// - `STACKIT_FALLBACK_DELAY_MS`: simulated latency before synthetic results
    pub fn from_env() -> Result<Self, AppError> {
        let service = match std::env::var("STACKIT_FALLBACK_DELAY_MS") {
            Ok(raw) => ServiceConfig {
                fallback_delay: parse_delay(&raw)?,
            },
            Err(_) => ServiceConfig::default(),
        };

        Ok(Self {
            gemini: GeminiClientConfig::from_env(),
            service,
        })
    }
}

fn parse_delay(raw: &str) -> Result<Duration, AppError> {
    raw.trim().parse::<u64>().map(Duration::from_millis).map_err(|_| {
        AppError::Config(format!(
            "STACKIT_FALLBACK_DELAY_MS must be a whole number of milliseconds, got {raw:?}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_accepts_milliseconds() {
        assert_eq!(parse_delay(" 250 ").expect("delay"), Duration::from_millis(250));
        assert_eq!(parse_delay("0").expect("delay"), Duration::ZERO);
    }

    #[test]
    fn delay_rejects_garbage() {
        let err = parse_delay("1s").expect_err("invalid delay");
        assert!(err.to_string().contains("STACKIT_FALLBACK_DELAY_MS"));
    }
}
