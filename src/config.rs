use std::env;
use std::path::PathBuf;

use chrono::Weekday;
use rust_decimal::Decimal;

pub const FARE_API_BASE: &str = "https://services-api.ryanair.com/farfnd/v4";
pub const BOOKING_URL_BASE: &str = "https://www.ryanair.com/ie/en/trip/flights/select";
pub const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";
pub const GCS_API_BASE: &str = "https://storage.googleapis.com";

// Blob keys shared by every store backend.
pub const SNAPSHOT_KEY: &str = "prices.json";
pub const HISTORY_KEY: &str = "price_history.csv";
pub const RUN_COUNT_KEY: &str = "run_count.txt";
pub const REPORT_KEY: &str = "index.html";
pub const CHART_KEY: &str = "price_history_graph.svg";

pub const ALERT_SUBJECT: &str = "Ryanair Price Change Alert!";

pub const DEFAULT_ORIGIN: &str = "DUB";
pub const DEFAULT_DESTINATIONS: [&str; 2] = ["VIE", "BTS"];
pub const DEFAULT_HEATMAP_MIN: i64 = 10;
pub const DEFAULT_HEATMAP_MAX: i64 = 75;
pub const DEFAULT_NOTIFY_INTERVAL: u64 = 6;
pub const DEFAULT_CALENDAR_MONTHS: u32 = 12;
pub const DEFAULT_SEARCH_WEEKS: u32 = 52;
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Subject line for the periodic full-price summary.
pub fn summary_subject(interval: u64) -> String {
    format!("Ryanair {}-Run Flight Price Summary", interval)
}

/// Run-wide tunables. Constructed once at process start and owned by
/// [`Fareboard`](crate::Fareboard).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Home airport; outbound queries start here and return queries end here.
    pub origin: String,
    pub destinations: Vec<String>,
    /// Days of the week searched for origin -> destination flights.
    pub outbound_days: Vec<Weekday>,
    /// Days of the week searched for destination -> origin flights.
    pub return_days: Vec<Weekday>,
    pub search_weeks: u32,
    pub currency: String,
    pub heatmap_min: Decimal,
    pub heatmap_max: Decimal,
    /// A full summary is emailed every `notify_interval` runs.
    pub notify_interval: u64,
    pub calendar_months: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            destinations: DEFAULT_DESTINATIONS.iter().map(|d| d.to_string()).collect(),
            outbound_days: vec![Weekday::Mon, Weekday::Sun],
            return_days: vec![Weekday::Fri],
            search_weeks: DEFAULT_SEARCH_WEEKS,
            currency: DEFAULT_CURRENCY.to_string(),
            heatmap_min: Decimal::from(DEFAULT_HEATMAP_MIN),
            heatmap_max: Decimal::from(DEFAULT_HEATMAP_MAX),
            notify_interval: DEFAULT_NOTIFY_INTERVAL,
            calendar_months: DEFAULT_CALENDAR_MONTHS,
        }
    }
}

impl Settings {
    /// Defaults overlaid with any `FAREBOARD_*` environment variables.
    ///
    /// Values that fail to parse are ignored and the default is kept.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let destinations = env::var("FAREBOARD_DESTINATIONS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.destinations);

        Self {
            origin: env::var("FAREBOARD_ORIGIN")
                .ok()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.origin),
            destinations,
            outbound_days: defaults.outbound_days,
            return_days: defaults.return_days,
            search_weeks: env_parse("FAREBOARD_SEARCH_WEEKS", defaults.search_weeks),
            currency: env::var("FAREBOARD_CURRENCY").unwrap_or(defaults.currency),
            heatmap_min: env_parse("FAREBOARD_HEATMAP_MIN", defaults.heatmap_min),
            heatmap_max: env_parse("FAREBOARD_HEATMAP_MAX", defaults.heatmap_max),
            notify_interval: env_parse("FAREBOARD_NOTIFY_INTERVAL", defaults.notify_interval),
            calendar_months: env_parse("FAREBOARD_CALENDAR_MONTHS", defaults.calendar_months),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub fn default_store_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("fareboard")
    } else {
        PathBuf::from(".fareboard-data")
    }
}
