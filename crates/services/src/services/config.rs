//! Runtime configuration read from the environment.

use std::{
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
    time::Duration,
};

use secrecy::SecretString;
use thiserror::Error;
use tracing::warn;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATABASE_URL: &str = "sqlite://catalog.sqlite";
const DEFAULT_SESSION_TTL_MINUTES: u64 = 12 * 60;
const DEFAULT_WHATSAPP_NUMBER: &str = "628123456789";
const DEFAULT_STORE_NAME: &str = "Toko Asmara Jaya";
const DEFAULT_STORAGE_BUCKET: &str = "product-images";
const DEFAULT_UPLOAD_DIR: &str = "uploads";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Where uploaded product images go.
#[derive(Debug)]
pub enum ImageStorageConfig {
    Supabase {
        base_url: String,
        service_key: SecretString,
        bucket: String,
    },
    LocalDisk {
        root: PathBuf,
        public_base_url: String,
    },
}

impl ImageStorageConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            ImageStorageConfig::Supabase { .. } => "supabase",
            ImageStorageConfig::LocalDisk { .. } => "local_disk",
        }
    }

    /// Directory the HTTP server should expose at `/uploads`, if any.
    pub fn local_root(&self) -> Option<&Path> {
        match self {
            ImageStorageConfig::LocalDisk { root, .. } => Some(root),
            ImageStorageConfig::Supabase { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    /// `None` disables admin login entirely.
    pub admin_password: Option<SecretString>,
    /// `None` means a random per-process secret is generated.
    pub admin_session_secret: Option<SecretString>,
    pub admin_session_ttl: Duration,
    pub whatsapp_number: String,
    pub store_name: String,
    pub image_storage: ImageStorageConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = match var("HOST") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "HOST",
                value: raw,
            })?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };
        let port = parse_or("PORT", var("PORT"), DEFAULT_PORT)?;
        let ttl_minutes: u64 = parse_or(
            "ADMIN_SESSION_TTL_MINUTES",
            var("ADMIN_SESSION_TTL_MINUTES"),
            DEFAULT_SESSION_TTL_MINUTES,
        )?;
        let ttl_secs = ttl_minutes
            .checked_mul(60)
            .ok_or_else(|| ConfigError::Invalid {
                name: "ADMIN_SESSION_TTL_MINUTES",
                value: ttl_minutes.to_string(),
            })?;

        let admin_password = var("ADMIN_PASSWORD").map(SecretString::from);
        if admin_password.is_none() {
            warn!("ADMIN_PASSWORD not set - admin login is disabled");
        }
        let admin_session_secret = var("ADMIN_SESSION_SECRET").map(SecretString::from);
        if admin_password.is_some() && admin_session_secret.is_none() {
            warn!("ADMIN_SESSION_SECRET not set - admin sessions will not survive a restart");
        }

        let image_storage = match var("SUPABASE_URL") {
            Some(base_url) => {
                let service_key = match var("SUPABASE_SERVICE_ROLE_KEY") {
                    Some(key) => Some(key),
                    None => {
                        warn!(
                            "SUPABASE_SERVICE_ROLE_KEY not found, falling back to SUPABASE_ANON_KEY; uploads may be rejected"
                        );
                        var("SUPABASE_ANON_KEY")
                    }
                };
                match service_key {
                    Some(key) => ImageStorageConfig::Supabase {
                        base_url: base_url.trim_end_matches('/').to_string(),
                        service_key: SecretString::from(key),
                        bucket: var("STORAGE_BUCKET")
                            .unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string()),
                    },
                    None => {
                        return Err(ConfigError::Invalid {
                            name: "SUPABASE_SERVICE_ROLE_KEY",
                            value: String::new(),
                        });
                    }
                }
            }
            None => ImageStorageConfig::LocalDisk {
                root: PathBuf::from(var("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string())),
                public_base_url: var("PUBLIC_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| format!("http://{host}:{port}")),
            },
        };

        Ok(Self {
            host,
            port,
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            admin_password,
            admin_session_secret,
            admin_session_ttl: Duration::from_secs(ttl_secs),
            whatsapp_number: var("WHATSAPP_NUMBER")
                .unwrap_or_else(|| DEFAULT_WHATSAPP_NUMBER.to_string()),
            store_name: var("STORE_NAME").unwrap_or_else(|| DEFAULT_STORE_NAME.to_string()),
            image_storage,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.database_url, "sqlite://catalog.sqlite");
        assert!(config.admin_password.is_none());
        assert_eq!(config.admin_session_ttl, Duration::from_secs(720 * 60));
        assert_eq!(config.whatsapp_number, "628123456789");
        match config.image_storage {
            ImageStorageConfig::LocalDisk {
                root,
                public_base_url,
            } => {
                assert_eq!(root, PathBuf::from("uploads"));
                assert_eq!(public_base_url, "http://127.0.0.1:3001");
            }
            other => panic!("expected local disk storage, got {other:?}"),
        }
    }

    #[test]
    fn test_supabase_falls_back_to_anon_key() {
        let config = config_from(&[
            ("SUPABASE_URL", "https://demo.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ])
        .unwrap();
        match config.image_storage {
            ImageStorageConfig::Supabase {
                base_url,
                service_key,
                bucket,
            } => {
                assert_eq!(base_url, "https://demo.supabase.co");
                assert_eq!(service_key.expose_secret(), "anon");
                assert_eq!(bucket, "product-images");
            }
            other => panic!("expected supabase storage, got {other:?}"),
        }
    }

    #[test]
    fn test_supabase_without_any_key_is_rejected() {
        assert!(config_from(&[("SUPABASE_URL", "https://demo.supabase.co")]).is_err());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_overflowing_session_ttl_is_rejected() {
        let err = config_from(&[("ADMIN_SESSION_TTL_MINUTES", u64::MAX.to_string().as_str())]).unwrap_err();
        assert!(err.to_string().contains("ADMIN_SESSION_TTL_MINUTES"));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = config_from(&[("ADMIN_PASSWORD", "  ")]).unwrap();
        assert!(config.admin_password.is_none());
    }
}
