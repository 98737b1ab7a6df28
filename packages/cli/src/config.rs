// ABOUTME: Runtime configuration for the OpsDesk server
// ABOUTME: Parses environment variables (after .env loading) into a typed Config

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;

use opsdesk_config::constants::{
    OPSDESK_API_HOST, OPSDESK_API_PORT, OPSDESK_CORS_ORIGIN, OPSDESK_DATABASE_PATH,
    OPSDESK_DB_BUSY_TIMEOUT_SECS, OPSDESK_DB_MAX_CONNECTIONS, OPSDESK_LOG, PORT,
};
use opsdesk_config::{env_parse_or, first_env};
use opsdesk_storage::DatabaseOptions;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4001;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid host address: {0}")]
    InvalidHost(String),
    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
    pub cors_origin: String,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host_str = env::var(OPSDESK_API_HOST).unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let host = parse_host(&host_str)?;

        let port = match first_env(&[OPSDESK_API_PORT, PORT]) {
            Some(raw) => parse_port(&raw)?,
            None => DEFAULT_PORT,
        };

        let database_path = env::var(OPSDESK_DATABASE_PATH)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(opsdesk_core::default_database_path);

        let cors_origin =
            env::var(OPSDESK_CORS_ORIGIN).unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string());

        let log_filter = env::var(OPSDESK_LOG).unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Ok(Config {
            host,
            port,
            database_path,
            max_connections: env_parse_or(OPSDESK_DB_MAX_CONNECTIONS, 10),
            busy_timeout_secs: env_parse_or(OPSDESK_DB_BUSY_TIMEOUT_SECS, 30),
            cors_origin,
            log_filter,
        })
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        database_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = host {
            self.host = parse_host(&host)?;
        }
        if let Some(port) = port {
            if port == 0 {
                return Err(ConfigError::PortOutOfRange(port));
            }
            self.port = port;
        }
        if let Some(path) = database_path {
            self.database_path = path;
        }
        Ok(self)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn database_options(&self) -> DatabaseOptions {
        DatabaseOptions {
            path: self.database_path.clone(),
            max_connections: self.max_connections,
            busy_timeout: Duration::from_secs(self.busy_timeout_secs),
            ..DatabaseOptions::default()
        }
    }
}

fn parse_host(raw: &str) -> Result<IpAddr, ConfigError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("localhost") {
        return Ok(IpAddr::from([127, 0, 0, 1]));
    }
    raw.parse::<IpAddr>()
        .map_err(|_| ConfigError::InvalidHost(raw.to_string()))
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    let port = raw.trim().parse::<u16>()?;
    if port == 0 {
        return Err(ConfigError::PortOutOfRange(port));
    }
    Ok(port)
}
