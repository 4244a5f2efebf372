//! Persistent run counter gating the periodic full-price summary.

use tracing::warn;

/// Number of runs since the last periodic summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunCounter(pub u64);

/// Result of advancing the counter by one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterStep {
    /// Ordinal of this run within the current interval (1-based).
    pub run_number: u64,
    /// `true` when this run completes an interval and the summary must go out.
    pub summary_due: bool,
    /// Value to persist for the next run.
    pub persisted: RunCounter,
}

impl RunCounter {
    /// Parse the stored text form; unreadable content counts as zero.
    pub fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        match text.trim().parse::<u64>() {
            Ok(n) => RunCounter(n),
            Err(e) => {
                warn!(content = %text.trim(), error = %e, "unreadable run counter, starting from zero");
                RunCounter(0)
            }
        }
    }

    pub fn to_text(self) -> String {
        self.0.to_string()
    }

    /// Advance by exactly one run. When the new count is a multiple of
    /// `interval` the summary fires and the counter resets to zero.
    ///
    /// An `interval` of zero never fires. A stored value at `u64::MAX`
    /// cannot advance and is treated like unreadable content.
    pub fn advance(self, interval: u64) -> CounterStep {
        let next = self.0.checked_add(1).unwrap_or_else(|| {
            warn!(content = self.0, "run counter at its limit, starting from zero");
            1
        });
        let summary_due = interval > 0 && next % interval == 0;
        CounterStep {
            run_number: next,
            summary_due,
            persisted: if summary_due {
                RunCounter(0)
            } else {
                RunCounter(next)
            },
        }
    }
}
