//! The per-run pipeline.
//!
//! Prior state is read once at the start and the new state written once at
//! the end. Only failures to persist the snapshot, the history or the run
//! counter abort a run; notification and chart failures are logged and the
//! run carries on with whatever output it can still produce.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{error, info, warn};

use crate::config::{self, ALERT_SUBJECT, CHART_KEY, HISTORY_KEY, REPORT_KEY, RUN_COUNT_KEY, SNAPSHOT_KEY};
use crate::counter::RunCounter;
use crate::detect::detect_changes;
use crate::error::{FareError, Result};
use crate::models::{History, Snapshot};
use crate::notify::Delivery;
use crate::render::{build_trend, change_alert_html, summary_html, TrendOutcome};
use crate::source::{collect_snapshot, plan_queries};
use crate::Fareboard;

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub observations: usize,
    pub failed_lookups: usize,
    pub changes: usize,
    pub alert_sent: bool,
    pub summary_sent: bool,
    /// Counter value persisted for the next run.
    pub counter: u64,
    pub chart_published: bool,
    pub report_published: bool,
}

impl Fareboard {
    /// Execute one run stamped with the current time.
    pub fn run(&self) -> Result<RunOutcome> {
        self.run_at(Utc::now())
    }

    /// Execute one run as if it happened at `now`.
    pub fn run_at(&self, now: DateTime<Utc>) -> Result<RunOutcome> {
        info!(board = %self, "run started");
        let previous = self.load_snapshot()?;
        let mut history = self.load_history()?;

        let today = now.date_naive();
        let queries = plan_queries(&self.settings, today);
        let collected = collect_snapshot(self.source.as_ref(), &queries, now);
        let current = collected.snapshot;

        let mut outcome = RunOutcome {
            observations: current.len(),
            failed_lookups: collected.failed_calls,
            ..RunOutcome::default()
        };

        if current.is_empty() {
            warn!("no flights found in current search, keeping previous snapshot");
        } else {
            match detect_changes(&current, &previous) {
                Ok(changes) => {
                    outcome.changes = changes.len();
                    if let Some(body) = change_alert_html(&changes) {
                        info!(changes = changes.len(), "price changes detected, sending alert");
                        outcome.alert_sent = self.notify(ALERT_SUBJECT, &body);
                    }
                }
                Err(e) => error!(error = %e, "change detection skipped"),
            }

            // The snapshot must never run ahead of the ledger.
            let extended = history.with_snapshot(&current, now);
            self.persist(HISTORY_KEY, extended.to_csv().as_bytes(), "text/csv")?;
            info!(rows = extended.len(), appended = current.len(), "history updated");
            self.persist(SNAPSHOT_KEY, current.to_json()?.as_bytes(), "application/json")?;
            history = extended;
        }

        let step = self.load_counter()?.advance(self.settings.notify_interval);
        self.persist(RUN_COUNT_KEY, step.persisted.to_text().as_bytes(), "text/plain")?;
        outcome.counter = step.persisted.0;
        if step.summary_due {
            info!(run = step.run_number, "interval reached, sending summary");
            outcome.summary_sent = self.notify(
                &config::summary_subject(self.settings.notify_interval),
                &summary_html(&current),
            );
        }

        let (chart_published, report_published) = self.publish_dashboard(&current, &history, today, now);
        outcome.chart_published = chart_published;
        outcome.report_published = report_published;

        info!(?outcome, "run finished");
        Ok(outcome)
    }

    /// Rebuild the chart and dashboard from stored state without fetching,
    /// notifying or advancing the run counter.
    ///
    /// Returns whether the report was published.
    pub fn render_report(&self, now: DateTime<Utc>) -> Result<bool> {
        let snapshot = self.load_snapshot()?;
        let history = self.load_history()?;
        let (_, published) = self.publish_dashboard(&snapshot, &history, now.date_naive(), now);
        Ok(published)
    }

    // -- State loading -----------------------------------------------------

    /// Previous run's snapshot; missing or unreadable content counts as empty.
    pub fn load_snapshot(&self) -> Result<Snapshot> {
        match self.store.read(SNAPSHOT_KEY)? {
            None => {
                info!(key = SNAPSHOT_KEY, "no previous snapshot found");
                Ok(Snapshot::empty())
            }
            Some(bytes) => match Snapshot::from_json(&bytes) {
                Ok(snapshot) => {
                    info!(key = SNAPSHOT_KEY, rows = snapshot.len(), "loaded previous snapshot");
                    Ok(snapshot)
                }
                Err(e) => {
                    warn!(key = SNAPSHOT_KEY, error = %e, "previous snapshot unreadable, treating as empty");
                    Ok(Snapshot::empty())
                }
            },
        }
    }

    /// Stored history. A corrupt ledger is an error so it is never overwritten.
    pub fn load_history(&self) -> Result<History> {
        match self.store.read(HISTORY_KEY)? {
            None => {
                info!(key = HISTORY_KEY, "no history found");
                Ok(History::default())
            }
            Some(bytes) => {
                let text = String::from_utf8(bytes)
                    .map_err(|e| FareError::Parse(format!("history is not UTF-8: {}", e)))?;
                let history = History::from_csv(&text)?;
                info!(key = HISTORY_KEY, rows = history.len(), "loaded history");
                Ok(history)
            }
        }
    }

    pub fn load_counter(&self) -> Result<RunCounter> {
        Ok(self
            .store
            .read(RUN_COUNT_KEY)?
            .map(|bytes| RunCounter::parse(&bytes))
            .unwrap_or_default())
    }

    // -- Boundary helpers --------------------------------------------------

    fn persist(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        match self.store.write(key, data, content_type) {
            Ok(()) => {
                info!(key, bytes = data.len(), "saved");
                Ok(())
            }
            Err(e) => {
                error!(key, error = %e, "failed to persist run state, aborting run");
                Err(match e {
                    FareError::Persistence { .. } => e,
                    other => FareError::persistence(key, other),
                })
            }
        }
    }

    fn notify(&self, subject: &str, body: &str) -> bool {
        match self.notifier.send(subject, body) {
            Ok(Delivery::Sent) => true,
            Ok(Delivery::Skipped) => false,
            Err(e) => {
                error!(subject, error = %e, "notification failed");
                false
            }
        }
    }

    /// Render and store the chart (when history allows) and the dashboard.
    /// Failures here are logged, never returned.
    fn publish_dashboard(
        &self,
        snapshot: &Snapshot,
        history: &History,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> (bool, bool) {
        let chart_url = match build_trend(history) {
            TrendOutcome::InsufficientData => {
                info!("not enough history to draw a chart");
                None
            }
            TrendOutcome::Chart(chart) => match self.publish_chart(&chart) {
                Ok(url) => Some(url),
                Err(e) => {
                    error!(error = %e, "chart rendering failed, showing placeholder");
                    None
                }
            },
        };

        let html = self.report.assemble(snapshot, today, chart_url.as_deref(), now);
        let published = self
            .store
            .write(REPORT_KEY, html.as_bytes(), "text/html")
            .and_then(|()| self.store.make_public(REPORT_KEY));
        match published {
            Ok(()) => {
                info!(url = %self.store.public_url(REPORT_KEY), "dashboard updated");
                (chart_url.is_some(), true)
            }
            Err(e) => {
                error!(key = REPORT_KEY, error = %e, "failed to publish dashboard");
                (chart_url.is_some(), false)
            }
        }
    }

    fn publish_chart(&self, chart: &crate::render::TrendChart) -> Result<String> {
        let image = self.chart.render(chart)?;
        self.store.write(CHART_KEY, &image.bytes, &image.content_type)?;
        self.store.make_public(CHART_KEY)?;
        let url = self.store.public_url(CHART_KEY);
        info!(series = chart.series.len(), %url, "chart uploaded");
        Ok(url)
    }
}
