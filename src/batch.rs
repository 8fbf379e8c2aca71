//! Batch processing over a CSV recipient file.
//!
//! The driver walks the CSV rows one at a time: render the template, pick
//! the next sender, deliver with retries, tally the outcome, pause, move on.
//! Once a batch has started no error aborts it; bad rows are skipped and
//! failed recipients are recorded, but the remaining rows always get their
//! chance.

use std::{collections::HashMap, path::Path, time::Duration};

use tracing::{error, info, warn};

use crate::{
    config::Config,
    delivery::{Mailer, OutboundMessage},
    error::ConfigError,
    retry::{self, RetryPolicy},
    roster::SenderPool,
    template::{self, Template},
};

/// Aggregate counters for one batch.
///
/// `total` counts every CSV row, including skipped ones; skipped rows
/// contribute to neither `sent` nor `failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}

impl BatchReport {
    /// Percentage of rows that were delivered.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.sent as f64 / self.total as f64 * 100.0
        }
    }
}

/// The outcome of one recipient's retry-wrapped delivery.
#[derive(Debug, Clone)]
pub struct SendRecord {
    pub recipient: String,
    pub sender: String,
    pub attempts: u32,
    pub delivered: bool,
}

/// Sequential driver over a CSV recipient file.
pub struct BatchDriver<M> {
    template: Template,
    pool: SenderPool,
    policy: RetryPolicy,
    pause: Duration,
    mailer: M,
}

impl<M: Mailer> BatchDriver<M> {
    #[must_use]
    pub const fn new(
        template: Template,
        pool: SenderPool,
        policy: RetryPolicy,
        pause: Duration,
        mailer: M,
    ) -> Self {
        Self {
            template,
            pool,
            policy,
            pause,
            mailer,
        }
    }

    /// Assemble a driver from a resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration cannot produce a sender pool
    /// or a retry policy.
    pub fn from_config(config: &Config, mailer: M) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.email_template.clone(),
            config.sender_pool()?,
            config.retry_policy()?,
            config.pause(),
            mailer,
        ))
    }

    /// Process every row of `csv_path` and return the aggregate counters.
    ///
    /// A missing or unreadable CSV file logs an error and returns an
    /// all-zero report; nothing is partially processed. Rows without a
    /// non-empty `email` field are skipped with a warning and advance
    /// neither the sender rotation nor the inter-recipient pause.
    pub async fn run(&mut self, csv_path: &Path) -> BatchReport {
        let mut report = BatchReport::default();

        if !csv_path.exists() {
            error!(path = %csv_path.display(), "CSV file not found");
            return report;
        }

        let mut reader = match csv::Reader::from_path(csv_path) {
            Ok(reader) => reader,
            Err(err) => {
                error!(path = %csv_path.display(), error = %err, "Failed to open CSV file");
                return report;
            }
        };

        for row in reader.deserialize::<HashMap<String, String>>() {
            report.total += 1;

            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable CSV row");
                    continue;
                }
            };
            let Some(recipient) = recipient_of(&row) else {
                warn!("Skipping row with missing or empty email field");
                continue;
            };

            let record = self.dispatch(recipient, row).await;
            if record.delivered {
                report.sent += 1;
                info!(
                    recipient = %record.recipient,
                    sender = %record.sender,
                    attempts = record.attempts,
                    "Email sent"
                );
            } else {
                report.failed += 1;
                error!(
                    recipient = %record.recipient,
                    attempts = record.attempts,
                    "Giving up on recipient"
                );
            }

            self.pool.advance();
            if !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }

        report
    }

    /// Render and deliver one recipient's message with the current sender.
    async fn dispatch(&self, recipient: String, row: HashMap<String, String>) -> SendRecord {
        let mut vars = row;
        vars.insert("unique_code".to_string(), template::unique_code());

        let mail = OutboundMessage {
            recipient,
            subject: template::render(&self.template.subject, &vars),
            body: template::render(&self.template.body, &vars),
            html: self.template.html,
        };

        let sender = self.pool.current();
        let outcome = retry::deliver(&self.policy, &self.mailer, sender, &mail).await;

        SendRecord {
            recipient: mail.recipient,
            sender: sender.email.clone(),
            attempts: outcome.attempts(),
            delivered: outcome.delivered(),
        }
    }
}

fn recipient_of(row: &HashMap<String, String>) -> Option<String> {
    row.get("email")
        .map(|email| email.trim())
        .filter(|email| !email.is_empty())
        .map(ToString::to_string)
}
