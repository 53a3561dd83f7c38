use std::net::{Ipv4Addr, SocketAddr};

use crate::domain::GenerationError;
use crate::infra::llm::env::read_env_var;

const DEFAULT_PORT: u16 = 5000;
const ENV_PORT: &str = "PORT";
const ENV_ORIGIN_VARS: &[&str] = &["FRONTEND_URL", "VERCEL_URL", "VERCEL_BRANCH_URL"];
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "https://noder.vercel.app",
    "https://noder-taupe.vercel.app",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, GenerationError> {
        let port = read_env_var(ENV_PORT).map_err(config_error)?;
        let extra_origins = ENV_ORIGIN_VARS
            .iter()
            .map(|name| read_env_var(name).map_err(config_error))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_values(port.as_deref(), extra_origins.into_iter().flatten())
    }

    pub fn from_values<I>(port: Option<&str>, extra_origins: I) -> Result<Self, GenerationError>
    where
        I: IntoIterator<Item = String>,
    {
        let port = match port {
            Some(value) => value.trim().parse::<u16>().map_err(|_| {
                GenerationError::configuration(format!(
                    "{ENV_PORT} must be a port number (got {value})"
                ))
            })?,
            None => DEFAULT_PORT,
        };

        let mut allowed_origins: Vec<String> = DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(|origin| origin.to_string())
            .collect();
        for origin in extra_origins {
            let origin = normalize_origin(&origin);
            if !origin.is_empty() && !allowed_origins.contains(&origin) {
                allowed_origins.push(origin);
            }
        }

        Ok(Self {
            port,
            allowed_origins,
        })
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

// Vercel exposes bare host names.
fn normalize_origin(origin: &str) -> String {
    let origin = origin.trim().trim_end_matches('/');
    if origin.is_empty() || origin.contains("://") {
        origin.to_string()
    } else {
        format!("https://{origin}")
    }
}

fn config_error(err: crate::domain::LlmError) -> GenerationError {
    GenerationError::configuration(err.to_string())
}
