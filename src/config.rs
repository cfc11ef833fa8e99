// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup. Invalid
//! values abort startup with a [`ConfigError`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for document storage | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HMAC secret for access tokens (≥ 32 bytes) | Required |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime in seconds | `604800` |
//! | `BCRYPT_COST` | bcrypt work factor (4–31) | `12` |
//! | `CLIENT_ORIGIN` | Allowed CORS origin | Any origin |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files enabling HTTPS | Plain HTTP |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::auth::{DEFAULT_BCRYPT_COST, DEFAULT_TOKEN_TTL_SECS};
use crate::storage::paths::DATA_ROOT;

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const BCRYPT_COST_ENV: &str = "BCRYPT_COST";
pub const CLIENT_ORIGIN_ENV: &str = "CLIENT_ORIGIN";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Shortest accepted `JWT_SECRET`, in bytes.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 8080;

/// Configuration errors. Any of these aborts startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// TLS certificate and key locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    pub client_origin: Option<String>,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("data_dir", &self.data_dir)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("client_origin", &self.client_origin)
            .field("tls", &self.tls)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_dir = get(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DATA_ROOT));

        let host = parse_or(get(HOST_ENV), HOST_ENV, DEFAULT_HOST)?;

        let port = parse_or(get(PORT_ENV), PORT_ENV, DEFAULT_PORT)?;

        let jwt_secret = get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::Invalid {
                name: JWT_SECRET_ENV,
                reason: format!("must be at least {MIN_JWT_SECRET_BYTES} bytes"),
            });
        }

        let token_ttl_secs = parse_or(get(TOKEN_TTL_ENV), TOKEN_TTL_ENV, DEFAULT_TOKEN_TTL_SECS)?;
        if token_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                name: TOKEN_TTL_ENV,
                reason: "must be positive".to_string(),
            });
        }

        let bcrypt_cost = parse_or(get(BCRYPT_COST_ENV), BCRYPT_COST_ENV, DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: BCRYPT_COST_ENV,
                reason: "must be between 4 and 31".to_string(),
            });
        }

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                })
            }
        };

        Ok(Self {
            data_dir,
            host,
            port,
            jwt_secret,
            token_ttl_secs,
            bcrypt_cost,
            client_origin: get(CLIENT_ORIGIN_ENV),
            tls,
            log_format,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
