//! Outbound email notifications.

pub mod sendgrid;

pub use sendgrid::SendGridNotifier;

use crate::error::Result;

/// Delivery outcome of a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The sink is not configured; nothing was attempted.
    Skipped,
}

/// Single email sink for alerts and summaries.
pub trait Notifier: Send {
    fn send(&self, subject: &str, html_body: &str) -> Result<Delivery>;
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn send(&self, _subject: &str, _html_body: &str) -> Result<Delivery> {
        Ok(Delivery::Skipped)
    }
}
