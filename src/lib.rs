//! Bulk personalized email dispatch over SMTP.
//!
//! Reads recipient rows from a CSV file, renders a subject/body template per
//! recipient, rotates through a pool of sender accounts, and delivers each
//! message with bounded retries and a fixed pause between sends.

pub mod batch;
pub mod config;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod retry;
pub mod roster;
pub mod template;
