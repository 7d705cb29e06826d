/// 서비스 설정
/// 모든 값은 환경 변수에서 읽고, 없으면 기본값을 사용한다.
// region:    --- Imports
use std::env;
use std::time::Duration;
use thiserror::Error;

// endregion: --- Imports

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/buyer";
pub const DEFAULT_KAFKA_TOPIC: &str = "market-events";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SCHEDULER_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// 없으면 메모리 저장소로 동작
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub init_database: bool,
    /// 없으면 이벤트를 로그로만 남긴다
    pub kafka_brokers: Option<String>,
    pub kafka_topic: String,
    pub client_url: Option<String>,
    pub api_prefix: String,
    /// 0 이면 스케줄러 비활성화
    pub scheduler_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            init_database: false,
            kafka_brokers: None,
            kafka_topic: DEFAULT_KAFKA_TOPIC.to_string(),
            client_url: None,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            scheduler_interval: Duration::from_secs(DEFAULT_SCHEDULER_INTERVAL_SECS),
        }
    }
}

impl AppConfig {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_max_connections = match non_empty("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                value: v.clone(),
            })?,
            None => defaults.database_max_connections,
        };

        let init_database = match non_empty("INIT_DATABASE") {
            Some(v) => parse_flag(&v).ok_or(ConfigError::Invalid {
                key: "INIT_DATABASE",
                value: v.clone(),
            })?,
            None => defaults.init_database,
        };

        let scheduler_interval = match non_empty("SCHEDULER_INTERVAL_SECS") {
            Some(v) => Duration::from_secs(v.parse().map_err(|_| ConfigError::Invalid {
                key: "SCHEDULER_INTERVAL_SECS",
                value: v.clone(),
            })?),
            None => defaults.scheduler_interval,
        };

        let api_prefix = non_empty("API_PREFIX")
            .map(|p| normalize_prefix(&p))
            .unwrap_or(defaults.api_prefix);

        Ok(Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: non_empty("DATABASE_URL"),
            database_max_connections,
            init_database,
            kafka_brokers: non_empty("KAFKA_BROKERS"),
            kafka_topic: non_empty("KAFKA_TOPIC").unwrap_or(defaults.kafka_topic),
            client_url: non_empty("CLIENT_URL"),
            api_prefix,
            scheduler_interval,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// "/api/buyer/" -> "/api/buyer", "api" -> "/api"
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert!(config.database_url.is_none());
        assert!(config.kafka_brokers.is_none());
        assert_eq!(config.api_prefix, "/api/buyer");
        assert_eq!(config.scheduler_interval, Duration::from_secs(30));
        assert!(!config.init_database);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/market"),
            ("INIT_DATABASE", "yes"),
            ("API_PREFIX", "v1/buyer/"),
            ("SCHEDULER_INTERVAL_SECS", "0"),
            ("KAFKA_BROKERS", ""),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/market")
        );
        assert!(config.init_database);
        assert_eq!(config.api_prefix, "/v1/buyer");
        assert!(config.scheduler_interval.is_zero());
        assert!(config.kafka_brokers.is_none());
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = load(&[("DATABASE_MAX_CONNECTIONS", "many")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_MAX_CONNECTIONS"));
    }
}
