//! Configuration types.

use std::str::FromStr;
use std::time::Duration;

use crate::codec::DEFAULT_CONFIGURATION_NAME;
use crate::error::ConfigError;

/// Backend connection settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the backend, without a trailing path.
    pub base_url: String,
    /// Upper bound for a single request, connect through body.
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let base_url = std::env::var("ONBOARD_API_URL").unwrap_or(defaults.base_url);
        let request_timeout = match std::env::var("ONBOARD_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(parse_value("ONBOARD_REQUEST_TIMEOUT_SECS", &raw)?),
            Err(_) => defaults.request_timeout,
        };
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "ONBOARD_REQUEST_TIMEOUT_SECS".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(Self {
            base_url,
            request_timeout,
        })
    }
}

/// How a wizard session orders its pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageOrder {
    /// `page1`, `page2`, … `pageN`, regardless of transitions.
    #[default]
    Ordinal,
    /// Follow transitions from the single page without incoming edges.
    Edges,
}

impl FromStr for PageOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordinal" => Ok(Self::Ordinal),
            "edges" => Ok(Self::Edges),
            other => Err(ConfigError::InvalidValue {
                key: "ONBOARD_PAGE_ORDER".into(),
                message: format!("expected \"ordinal\" or \"edges\", got {other:?}"),
            }),
        }
    }
}

/// Settings for the onboarding front-end.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    /// Name used when the editor saves a configuration.
    pub configuration_name: String,
    pub page_order: PageOrder,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            configuration_name: DEFAULT_CONFIGURATION_NAME.to_string(),
            page_order: PageOrder::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let page_order = match std::env::var("ONBOARD_PAGE_ORDER") {
            Ok(raw) => raw.parse()?,
            Err(_) => PageOrder::default(),
        };
        Ok(Self {
            gateway: GatewayConfig::from_env()?,
            configuration_name: std::env::var("ONBOARD_CONFIG_NAME")
                .unwrap_or_else(|_| DEFAULT_CONFIGURATION_NAME.to_string()),
            page_order,
        })
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
