use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub provider: ProviderConfig,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Allowed CORS origins. Set GEO_GATEWAY__API__CORS_ALLOWED_ORIGINS in production.
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
    /// How long in-flight requests may run after a stop signal.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

/// Origin that receives every unmatched `/api/` request.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_host")]
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
}

impl ProxyConfig {
    pub fn target(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn default_bind() -> String { "0.0.0.0".to_string() }
fn default_api_port() -> u16 { 8080 }
fn default_shutdown_grace() -> u64 { 5 }
fn default_jwt_expiry() -> u64 { 1 }
fn default_provider_base_url() -> String { DEFAULT_PROVIDER_BASE_URL.to_string() }
fn default_provider_timeout() -> u64 { 10 }
fn default_proxy_host() -> String { "localhost".to_string() }
fn default_proxy_port() -> u16 { 1313 }
fn default_cors_allowed_origins() -> Vec<String> {
    vec!["http://localhost:1313".to_string()]
}

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";
const DEFAULT_PROVIDER_BASE_URL: &str = "https://suggestions.dadata.ru/suggestions/api/4_1/rs/";

/// Parses the forwarder target. Only absolute http(s) URLs with a host qualify.
pub fn parse_proxy_target(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid proxy target URL: {}", raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("Proxy target must use http or https: {}", raw);
    }
    if url.host_str().map_or(true, str::is_empty) {
        anyhow::bail!("Proxy target has no host: {}", raw);
    }
    Ok(url)
}

pub fn validate(cfg: &Config) -> Result<()> {
    if cfg.auth.jwt_secret == DEFAULT_JWT_SECRET {
        anyhow::bail!(
            "SECURITY ERROR: JWT secret must be changed from default value '{}'. \
            Set GEO_GATEWAY__AUTH__JWT_SECRET environment variable with a strong random value.",
            DEFAULT_JWT_SECRET
        );
    }

    if cfg.auth.jwt_secret.len() < 32 {
        anyhow::bail!(
            "CONFIG ERROR: JWT secret must be at least 32 characters (current: {})",
            cfg.auth.jwt_secret.len()
        );
    }

    if cfg.auth.jwt_expiry_hours == 0 {
        anyhow::bail!("CONFIG ERROR: auth.jwt_expiry_hours must be greater than zero");
    }

    parse_proxy_target(&cfg.proxy.target()).context("CONFIG ERROR: proxy")?;

    Url::parse(&cfg.provider.base_url).with_context(|| {
        format!("CONFIG ERROR: invalid provider base URL: {}", cfg.provider.base_url)
    })?;

    if cfg.api.shutdown_grace_secs == 0 {
        anyhow::bail!("CONFIG ERROR: api.shutdown_grace_secs must be greater than zero");
    }

    if cfg.provider.api_key.is_empty() {
        tracing::warn!("Provider API key is empty; address lookups will be rejected upstream");
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}

pub fn load() -> Result<Config> {
    // Legacy variable names are honoured as defaults; prefixed ones win.
    let legacy_api_key = std::env::var("ApiKey").unwrap_or_default();
    let legacy_secret_key = std::env::var("SecretKey").unwrap_or_default();

    let cfg = config::Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(
            config::Environment::with_prefix("GEO_GATEWAY")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("api.cors_allowed_origins")
                .try_parsing(true),
        )
        .set_default("api.bind", "0.0.0.0")?
        .set_default("api.port", 8080)?
        .set_default("api.shutdown_grace_secs", 5)?
        .set_default("auth.jwt_secret", DEFAULT_JWT_SECRET)?
        .set_default("auth.jwt_expiry_hours", 1)?
        .set_default("provider.api_key", legacy_api_key)?
        .set_default("provider.secret_key", legacy_secret_key)?
        .set_default("provider.base_url", DEFAULT_PROVIDER_BASE_URL)?
        .set_default("provider.timeout_secs", 10)?
        .set_default("proxy.host", "localhost")?
        .set_default("proxy.port", 1313)?
        .build()?
        .try_deserialize()?;

    validate(&cfg)?;

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            api: ApiConfig {
                port: 8080,
                bind: "127.0.0.1".to_string(),
                cors_allowed_origins: default_cors_allowed_origins(),
                shutdown_grace_secs: 5,
            },
            auth: AuthConfig {
                jwt_secret: "a-sufficiently-long-secret-for-config-tests".to_string(),
                jwt_expiry_hours: 1,
            },
            provider: ProviderConfig {
                api_key: "key".to_string(),
                secret_key: "secret".to_string(),
                base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
                timeout_secs: 10,
            },
            proxy: ProxyConfig {
                host: "localhost".to_string(),
                port: 1313,
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_default_secret_rejected() {
        let mut cfg = valid_config();
        cfg.auth.jwt_secret = DEFAULT_JWT_SECRET.to_string();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut cfg = valid_config();
        cfg.auth.jwt_secret = "short".to_string();
        let err = validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_unparseable_proxy_target_rejected() {
        let mut cfg = valid_config();
        cfg.proxy.host = "bad host".to_string();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_proxy_target_requires_http_scheme() {
        assert!(parse_proxy_target("ftp://origin:21").is_err());
        assert!(parse_proxy_target("http://origin:8080").is_ok());
    }

    #[test]
    fn test_zero_grace_period_rejected() {
        let mut cfg = valid_config();
        cfg.api.shutdown_grace_secs = 0;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_empty_provider_key_is_not_fatal() {
        let mut cfg = valid_config();
        cfg.provider.api_key.clear();
        assert!(validate(&cfg).is_ok());
    }
}
