use crate::auth::SessionJwtConfig;
use crate::db::DEFAULT_MIN_ITEM_QUANTITY;
use dotenvy::var;
use std::str::FromStr;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub min_item_quantity: i32,
    /// 0 disables the background sweeper task.
    pub sweeper_interval_secs: u64,
    pub session: SessionJwtConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;
        let host = var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("PORT", var("PORT").ok(), 8080u16);
        let min_item_quantity = parse_or(
            "MIN_ITEM_QUANTITY",
            var("MIN_ITEM_QUANTITY").ok(),
            DEFAULT_MIN_ITEM_QUANTITY,
        )
        .max(0);
        let sweeper_interval_secs =
            parse_or("SWEEPER_INTERVAL_SECS", var("SWEEPER_INTERVAL_SECS").ok(), 0u64);
        let session = SessionJwtConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            min_item_quantity,
            sweeper_interval_secs,
            session,
        })
    }
}

/// Parses an optional env value, falling back to `default` with a warning
/// when the value is present but malformed.
pub(crate) fn parse_or<T: FromStr + std::fmt::Display + Copy>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        None => default,
        Some(v) => match v.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("{} has invalid value '{}', using {}", key, v, default);
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::parse_or;

    #[test]
    fn missing_value_uses_default() {
        assert_eq!(parse_or("PORT", None, 8080u16), 8080);
    }

    #[test]
    fn valid_value_is_parsed() {
        assert_eq!(parse_or("PORT", Some(" 9000 ".to_string()), 8080u16), 9000);
        assert_eq!(parse_or("SWEEPER_INTERVAL_SECS", Some("30".to_string()), 0u64), 30);
    }

    #[test]
    fn malformed_value_falls_back() {
        assert_eq!(parse_or("PORT", Some("eighty".to_string()), 8080u16), 8080);
        assert_eq!(parse_or("MIN_ITEM_QUANTITY", Some("-x".to_string()), 1i32), 1);
    }
}
