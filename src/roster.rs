//! Round-robin rotation over the configured sender accounts.

use crate::{delivery::SenderIdentity, error::ConfigError};

/// An ordered, non-empty pool of sender identities with a rotation cursor.
///
/// The cursor advances exactly once per processed recipient, regardless of
/// whether that recipient's send succeeded, so load spreads evenly across
/// the pool over a whole batch.
#[derive(Debug)]
pub struct SenderPool {
    senders: Vec<SenderIdentity>,
    cursor: usize,
}

impl SenderPool {
    /// Build a pool starting at `offset` (wrapped into range).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoSenders`] when `senders` is empty.
    pub fn new(senders: Vec<SenderIdentity>, offset: usize) -> Result<Self, ConfigError> {
        if senders.is_empty() {
            return Err(ConfigError::NoSenders);
        }
        let cursor = offset % senders.len();
        Ok(Self { senders, cursor })
    }

    /// The identity the next send should use.
    #[must_use]
    pub fn current(&self) -> &SenderIdentity {
        &self.senders[self.cursor]
    }

    /// Advance the rotation cursor by one, wrapping around the pool.
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.senders.len();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}
