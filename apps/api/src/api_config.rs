use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use phishwise_application::UsePolicy;
use phishwise_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

const MIN_ADMIN_TOKEN_LENGTH: usize = 16;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub public_base_url: Option<Url>,
    pub frontend_url: String,
    pub admin_api_token: Option<String>,
    pub use_policy: UsePolicy,
    pub seed_demo_data: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(5000);
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5000".to_owned());

        let public_base_url = optional_env("PUBLIC_BASE_URL")
            .map(|value| parse_public_base_url(value.as_str()))
            .transpose()?;
        let admin_api_token = optional_env("ADMIN_API_TOKEN")
            .map(validate_admin_token)
            .transpose()?;
        let use_policy = optional_env("ACCESS_USE_POLICY")
            .map(|value| UsePolicy::from_str(value.trim()))
            .transpose()?
            .unwrap_or_default();
        let seed_demo_data = optional_env("SEED_DEMO_DATA")
            .map(|value| parse_flag("SEED_DEMO_DATA", value.as_str()))
            .transpose()?
            .unwrap_or(true);

        Ok(Self {
            migrate_only,
            database_url,
            api_host,
            api_port,
            public_base_url,
            frontend_url,
            admin_api_token,
            use_policy,
            seed_demo_data,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    /// Base URL used when neither configuration nor request headers supply one.
    pub fn fallback_base_url(&self) -> String {
        format!("http://{}:{}", self.api_host, self.api_port)
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_public_base_url(value: &str) -> Result<Url, AppError> {
    let url = Url::parse(value.trim())
        .map_err(|error| AppError::Validation(format!("invalid PUBLIC_BASE_URL: {error}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(AppError::Validation(
            "PUBLIC_BASE_URL must be an absolute http(s) URL".to_owned(),
        ));
    }

    Ok(url)
}

fn validate_admin_token(value: String) -> Result<String, AppError> {
    let token = value.trim().to_owned();
    if token.len() < MIN_ADMIN_TOKEN_LENGTH {
        return Err(AppError::Validation(format!(
            "ADMIN_API_TOKEN must be at least {MIN_ADMIN_TOKEN_LENGTH} characters"
        )));
    }

    Ok(token)
}

fn parse_flag(name: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(AppError::Validation(format!(
            "{name} must be 'true' or 'false', got '{other}'"
        ))),
    }
}
