use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub provider: ProviderConfig,
    pub openai: OpenAiConfig,
    pub excel: ExcelConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub backend: ProviderBackend,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderBackend {
    OpenAi,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExcelConfig {
    pub url: String,
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// When set, `X-API-Key` is required on the generation and proxy routes.
    pub api_key: Option<String>,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(GatewayConfig {
            common: common_config,
            provider: ProviderConfig {
                backend: get_env("PROVIDER_BACKEND", Some("openai"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            },
            openai: OpenAiConfig {
                // No default: the process must refuse to start without a credential.
                api_key: get_env("OPENAI_API_KEY", None, is_prod)?,
                api_url: get_env(
                    "OPENAI_API_URL",
                    Some("https://api.openai.com/v1/chat/completions"),
                    is_prod,
                )?,
                model: get_env("OPENAI_MODEL", Some("gpt-4.1"), is_prod)?,
            },
            excel: ExcelConfig {
                url: get_env(
                    "EXCEL_UPSTREAM_URL",
                    Some("https://192.168.3.90:8080/generate-excel"),
                    is_prod,
                )?,
                accept_invalid_certs: get_env("EXCEL_ACCEPT_INVALID_CERTS", Some("false"), is_prod)?
                    .parse()
                    .unwrap_or(false),
            },
            security: SecurityConfig {
                api_key: env::var("SECURITY_API_KEY").ok(),
            },
        })
    }
}

impl std::str::FromStr for ProviderBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderBackend::OpenAi),
            "mock" => Ok(ProviderBackend::Mock),
            _ => Err(format!("Invalid provider backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
