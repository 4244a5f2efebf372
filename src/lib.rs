//! Fareboard: an airline fare watcher.
//!
//! Each run snapshots the cheapest fares for a fixed set of routes, compares
//! them with the previous run, emails an alert when prices move, appends the
//! observations to a growing price history, and publishes a calendar-style
//! HTML dashboard with a price-evolution chart.
//!
//! # Quick start
//!
//! ```no_run
//! use fareboard::Fareboard;
//!
//! let board = Fareboard::builder()
//!     .store_dir("/var/lib/fareboard")
//!     .build()
//!     .unwrap();
//!
//! let outcome = board.run().unwrap();
//! println!("{} changes detected", outcome.changes);
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod counter;
pub mod detect;
pub mod error;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod render;
pub mod source;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncFareboard;
pub use config::Settings;
pub use counter::{CounterStep, RunCounter};
pub use detect::detect_changes;
pub use error::{FareError, Result};
pub use pipeline::RunOutcome;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Notifier, SendGridNotifier};
use render::{ChartRenderer, HeatmapScale, ReportAssembler, SvgChartRenderer};
use source::{PriceSource, RyanairSource};
use store::{BlobStore, LocalBlobStore};

// ---------------------------------------------------------------------------
// FareboardBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`Fareboard`].
///
/// Every collaborator has a default: a [`LocalBlobStore`] in the platform data
/// directory, the Ryanair fare API, SendGrid configured from the environment,
/// and the SVG chart renderer.
pub struct FareboardBuilder {
    settings: Settings,
    store_dir: Option<PathBuf>,
    timeout: Duration,
    store: Option<Box<dyn BlobStore>>,
    source: Option<Box<dyn PriceSource>>,
    notifier: Option<Box<dyn Notifier>>,
    chart: Option<Box<dyn ChartRenderer>>,
}

impl Default for FareboardBuilder {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            store_dir: None,
            timeout: Duration::from_secs(30),
            store: None,
            source: None,
            notifier: None,
            chart: None,
        }
    }
}

impl FareboardBuilder {
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Directory for the default [`LocalBlobStore`]. Ignored when a store is
    /// supplied with [`store`](Self::store).
    pub fn store_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.store_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// HTTP timeout for the default fare source and notifier.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(mut self, store: impl BlobStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn source(mut self, source: impl PriceSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    pub fn chart_renderer(mut self, chart: impl ChartRenderer + 'static) -> Self {
        self.chart = Some(Box::new(chart));
        self
    }

    /// Validate the settings and construct the missing collaborators.
    pub fn build(self) -> Result<Fareboard> {
        let settings = self.settings;
        if settings.notify_interval == 0 {
            return Err(FareError::InvalidArgument(
                "notify_interval must be at least 1".into(),
            ));
        }
        if settings.destinations.is_empty() {
            return Err(FareError::InvalidArgument(
                "at least one destination is required".into(),
            ));
        }
        let scale = HeatmapScale::new(settings.heatmap_min, settings.heatmap_max)?;

        let store = match self.store {
            Some(store) => store,
            None => Box::new(LocalBlobStore::new(self.store_dir)?),
        };
        let source = match self.source {
            Some(source) => source,
            None => Box::new(RyanairSource::new(&settings.currency, self.timeout)?),
        };
        let notifier = match self.notifier {
            Some(notifier) => notifier,
            None => Box::new(SendGridNotifier::from_env(self.timeout)?),
        };
        let chart = match self.chart {
            Some(chart) => chart,
            None => Box::new(SvgChartRenderer::new(&settings.currency)),
        };

        Ok(Fareboard {
            report: ReportAssembler::new(scale, settings.calendar_months),
            settings,
            store,
            source,
            notifier,
            chart,
        })
    }
}

// ---------------------------------------------------------------------------
// Fareboard
// ---------------------------------------------------------------------------

/// Run context: settings plus every boundary collaborator, created once at
/// process start and passed by reference to each pipeline step.
///
/// Created via [`Fareboard::builder()`].
pub struct Fareboard {
    pub(crate) settings: Settings,
    pub(crate) report: ReportAssembler,
    pub(crate) store: Box<dyn BlobStore>,
    pub(crate) source: Box<dyn PriceSource>,
    pub(crate) notifier: Box<dyn Notifier>,
    pub(crate) chart: Box<dyn ChartRenderer>,
}

impl Fareboard {
    pub fn builder() -> FareboardBuilder {
        FareboardBuilder::default()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &dyn BlobStore {
        self.store.as_ref()
    }
}

impl fmt::Display for Fareboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fareboard(origin={}, destinations=[{}], store={})",
            self.settings.origin,
            self.settings.destinations.join(", "),
            self.store.describe()
        )
    }
}
