use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use careline_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Eversign connection settings.
#[derive(Debug, Clone)]
pub struct EversignRuntimeConfig {
    pub base_url: String,
    pub access_key: String,
}

/// Selected e-signature provider.
#[derive(Debug, Clone)]
pub enum SignatureProviderConfig {
    Console,
    Eversign(EversignRuntimeConfig),
}

/// Runtime configuration for the API process.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub dev_seed: bool,
    pub signature_provider: SignatureProviderConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let dev_seed = env::var("CARELINE_DEV_SEED")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let signature_provider = match env::var("SIGNATURE_PROVIDER")
            .unwrap_or_else(|_| "console".to_owned())
            .as_str()
        {
            "console" => SignatureProviderConfig::Console,
            "eversign" => {
                let base_url = env::var("EVERSIGN_BASE_URL")
                    .unwrap_or_else(|_| "https://api.eversign.com/api".to_owned());
                Url::parse(&base_url).map_err(|error| {
                    AppError::Validation(format!("invalid EVERSIGN_BASE_URL: {error}"))
                })?;
                SignatureProviderConfig::Eversign(EversignRuntimeConfig {
                    base_url,
                    access_key: required_non_empty_env("EVERSIGN_ACCESS_KEY")?,
                })
            }
            other => {
                return Err(AppError::Validation(format!(
                    "SIGNATURE_PROVIDER must be either 'console' or 'eversign', got '{other}'"
                )));
            }
        };

        Ok(Self {
            frontend_url,
            api_host,
            api_port,
            dev_seed,
            signature_provider,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
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

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
