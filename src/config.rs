use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    pub seed_fixtures: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            event_buffer_size: require_positive(
                "EVENT_BUFFER_SIZE",
                parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            )?,
            seed_fixtures: flag_or_default("SEED_FIXTURES", false)?,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

fn require_positive(key: &str, value: usize) -> Result<usize, AppError> {
    if value == 0 {
        return Err(AppError::Internal(format!("invalid {key}: must be > 0")));
    }
    Ok(value)
}

fn flag_or_default(key: &str, default: bool) -> Result<bool, AppError> {
    match env::var(key) {
        Ok(raw) => parse_flag(&raw)
            .ok_or_else(|| AppError::Internal(format!("invalid {key}: expected a boolean, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_flag, require_positive};
    use crate::error::AppError;

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag(""), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn zero_event_buffer_is_rejected() {
        assert!(matches!(
            require_positive("EVENT_BUFFER_SIZE", 0),
            Err(AppError::Internal(msg)) if msg == "invalid EVENT_BUFFER_SIZE: must be > 0"
        ));
        assert_eq!(require_positive("EVENT_BUFFER_SIZE", 16).unwrap(), 16);
    }
}
