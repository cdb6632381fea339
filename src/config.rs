use crate::error::ConfigError;

pub const DEFAULT_COOLDOWN: u64 = 86400;

/// One hundred years.
pub const MAX_COOLDOWN: u64 = 100 * 365 * 86400;

#[derive(Debug, Clone, PartialEq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub timeout: std::time::Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    /// Minimum delay between two replies to the same sender, shared by every
    /// mailbox.
    pub cooldown: chrono::Duration,
    pub smtp: SmtpConfig,
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value: v,
        }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars<F: Fn(&str) -> Option<String>>(var: F) -> Result<Self, ConfigError> {
        let database_url = var("DATABASE_URL")
            .filter(|u| !u.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let timeout = var("AUTOREPLIES_TIMEOUT");
        let seconds = parse_var("AUTOREPLIES_TIMEOUT", timeout.clone(), DEFAULT_COOLDOWN)?;
        if seconds > MAX_COOLDOWN {
            return Err(ConfigError::Invalid {
                name: "AUTOREPLIES_TIMEOUT",
                value: timeout.unwrap_or_default(),
                reason: format!("must not exceed {} seconds", MAX_COOLDOWN),
            });
        }
        let cooldown = chrono::Duration::from_std(std::time::Duration::from_secs(seconds))
            .map_err(|e| ConfigError::Invalid {
                name: "AUTOREPLIES_TIMEOUT",
                value: timeout.unwrap_or_default(),
                reason: e.to_string(),
            })?;

        let host = var("SMTP_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| "localhost".to_string());
        let port = parse_var("SMTP_PORT", var("SMTP_PORT"), 25u16)?;
        let smtp_timeout = parse_var("SMTP_TIMEOUT", var("SMTP_TIMEOUT"), 30u64)?;

        Ok(Config {
            database_url,
            cooldown,
            smtp: SmtpConfig {
                host,
                port,
                timeout: std::time::Duration::from_secs(smtp_timeout),
            },
        })
    }
}
