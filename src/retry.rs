//! Bounded retry around delivery attempts.
//!
//! Unlike a spooling MTA there is no backoff schedule here: the tool retries
//! a fixed number of times with a fixed pause in between, then records the
//! recipient as failed and moves on.

use std::time::Duration;

use tracing::warn;

use crate::delivery::{self, Mailer, OutboundMessage, SenderIdentity};

/// Retry configuration for delivery operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` of 1 means a single attempt with no retry.
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether `attempt` (1-indexed) is the last one allowed.
    #[must_use]
    pub const fn is_final_attempt(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

/// How a retry-wrapped delivery ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Delivered on the `attempts`-th try.
    Delivered { attempts: u32 },
    /// Every allowed attempt failed.
    Failed { attempts: u32 },
}

impl Outcome {
    #[must_use]
    pub const fn delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Number of attempts actually made.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Delivered { attempts } | Self::Failed { attempts } => *attempts,
        }
    }
}

/// Attempt delivery until it succeeds or the policy is exhausted.
///
/// Returns immediately on the first successful attempt. The inter-retry
/// pause is skipped after the final failed attempt since there is nothing
/// left to wait for.
pub async fn deliver<M: Mailer>(
    policy: &RetryPolicy,
    mailer: &M,
    sender: &SenderIdentity,
    mail: &OutboundMessage,
) -> Outcome {
    for attempt in 1..=policy.max_attempts() {
        if delivery::attempt(mailer, sender, mail).await {
            return Outcome::Delivered { attempts: attempt };
        }

        if !policy.is_final_attempt(attempt) {
            warn!(
                recipient = %mail.recipient,
                attempt,
                "Delivery attempt failed, retrying"
            );
            tokio::time::sleep(policy.delay).await;
        }
    }

    Outcome::Failed {
        attempts: policy.max_attempts(),
    }
}
