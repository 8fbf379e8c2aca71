//! Typed error handling for configuration, rendering, and delivery.
//!
//! The taxonomy mirrors how failures are treated at runtime:
//! - [`ConfigError`] is fatal and aborts the process before any send.
//! - [`TemplateError`] is non-fatal; rendering degrades to the unformatted
//!   template and the batch continues.
//! - [`DeliveryError`] is contained at the delivery boundary, retried up to
//!   the configured limit, and then recorded as a per-recipient failure.

use thiserror::Error;

/// Errors raised while loading or validating the configuration.
///
/// Any of these aborts the run before a single message is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration: {0}")]
    Read(#[from] std::io::Error),

    /// The configuration file is not valid JSON.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Neither the configuration file nor the environment provides a sender
    /// address.
    #[error("No sender addresses configured")]
    NoSenders,

    /// No credential available for the sender accounts.
    #[error("No sender password configured")]
    MissingPassword,

    /// No SMTP endpoint available for the sender accounts.
    #[error("No SMTP server configured")]
    MissingServer,

    /// `max_retries` must allow at least the initial attempt.
    #[error("max_retries must be at least 1")]
    ZeroRetries,
}

/// Errors raised while substituting placeholders into a template.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder names a variable the recipient row does not provide.
    #[error("Missing template variable: {0}")]
    MissingVariable(String),

    /// A `{` was opened but never closed.
    #[error("Unclosed placeholder")]
    UnclosedPlaceholder,

    /// A `}}` appeared outside a placeholder without being escaped.
    #[error("Unmatched '}}' outside a placeholder")]
    UnmatchedBrace,
}

/// Errors raised by a single delivery attempt.
///
/// These never escape the delivery boundary; the attempt logs the error and
/// reports failure to the retry controller.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The sender or recipient address is not a valid mailbox.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled.
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// The transport session failed (connection, TLS, auth, or a rejected
    /// envelope).
    #[error("SMTP transport failure: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}
