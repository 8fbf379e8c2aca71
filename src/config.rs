//! Runtime configuration.
//!
//! Configuration comes from a JSON file (`config.json` by default). When the
//! file is absent, the sender account falls back to environment variables
//! (`SENDER_EMAIL`, `SENDER_PASSWORD`, `SMTP_SERVER`, `SMTP_PORT`) for
//! single-sender use, with `.env` files honoured. The resolved [`Config`] is
//! built once at startup and passed into the batch driver; nothing reads the
//! process environment after load.

use std::{env, fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::{
    delivery::SenderIdentity, error::ConfigError, retry::RetryPolicy, roster::SenderPool,
    template::Template,
};

/// Default submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Everything the batch driver needs, resolved at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Outbound accounts, rotated round-robin across recipients.
    #[serde(default)]
    pub sender_emails: Vec<String>,

    /// Credential shared by every sender account.
    #[serde(default)]
    pub sender_password: Option<String>,

    /// SMTP server hostname shared by every sender account.
    #[serde(default)]
    pub smtp_server: Option<String>,

    /// SMTP server port; defaults to [`DEFAULT_SMTP_PORT`].
    #[serde(default)]
    pub smtp_port: Option<u16>,

    /// Upgrade sessions via STARTTLS. Disabled only for local testing.
    #[serde(default = "default_starttls")]
    pub smtp_starttls: bool,

    /// Subject/body template applied to every recipient.
    #[serde(default)]
    pub email_template: Template,

    /// Pause between recipients, in seconds. 0 disables the pause.
    #[serde(default = "default_delay_between_emails")]
    pub delay_between_emails: u64,

    /// Maximum delivery attempts per recipient. Must be at least 1.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause between failed attempts, in seconds.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Starting offset into the sender pool.
    #[serde(default)]
    pub sender_offset: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sender_emails: Vec::new(),
            sender_password: None,
            smtp_server: None,
            smtp_port: None,
            smtp_starttls: default_starttls(),
            email_template: Template::default(),
            delay_between_emails: default_delay_between_emails(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            sender_offset: 0,
        }
    }
}

const fn default_starttls() -> bool {
    true
}

const fn default_delay_between_emails() -> u64 {
    1
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_retry_delay_secs() -> u64 {
    5
}

impl Config {
    /// Load configuration from `path`, falling back to the environment for
    /// any sender field the file does not provide. A missing file is not an
    /// error; it selects single-sender environment mode.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = if path.exists() {
            serde_json::from_str(&fs::read_to_string(path)?)?
        } else {
            Self::default()
        };
        config.merge_env();

        Ok(config)
    }

    fn merge_env(&mut self) {
        if self.sender_emails.is_empty()
            && let Ok(address) = env::var("SENDER_EMAIL")
        {
            self.sender_emails.push(address);
        }
        if self.sender_password.is_none() {
            self.sender_password = env::var("SENDER_PASSWORD").ok();
        }
        if self.smtp_server.is_none() {
            self.smtp_server = env::var("SMTP_SERVER").ok();
        }
        if self.smtp_port.is_none() {
            self.smtp_port = env::var("SMTP_PORT")
                .ok()
                .and_then(|port| port.parse().ok());
        }
    }

    /// Materialize one [`SenderIdentity`] per configured address.
    ///
    /// # Errors
    ///
    /// Returns an error when no addresses, no password, or no server is
    /// configured.
    pub fn senders(&self) -> Result<Vec<SenderIdentity>, ConfigError> {
        if self.sender_emails.is_empty() {
            return Err(ConfigError::NoSenders);
        }
        let password = self
            .sender_password
            .clone()
            .ok_or(ConfigError::MissingPassword)?;
        let host = self.smtp_server.clone().ok_or(ConfigError::MissingServer)?;
        let port = self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT);

        Ok(self
            .sender_emails
            .iter()
            .map(|email| SenderIdentity {
                email: email.clone(),
                password: password.clone(),
                host: host.clone(),
                port,
                starttls: self.smtp_starttls,
            })
            .collect())
    }

    /// Build the rotation pool, starting at the configured offset.
    ///
    /// # Errors
    ///
    /// Propagates the sender-resolution errors of [`Config::senders`].
    pub fn sender_pool(&self) -> Result<SenderPool, ConfigError> {
        SenderPool::new(self.senders()?, self.sender_offset)
    }

    /// Build the retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroRetries`] when `max_retries` is 0.
    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        Ok(RetryPolicy::new(
            self.max_retries,
            Duration::from_secs(self.retry_delay_secs),
        ))
    }

    /// Pause applied between recipients.
    #[must_use]
    pub const fn pause(&self) -> Duration {
        Duration::from_secs(self.delay_between_emails)
    }
}
