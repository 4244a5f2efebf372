//! Fare lookups and snapshot assembly.
//!
//! A run issues one [`FareQuery`] per (route, departure day) in the search
//! plan. A failed lookup contributes no observations; it never aborts the run.

pub mod ryanair;

pub use ryanair::RyanairSource;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::models::{Observation, Route, Snapshot};

// ---------------------------------------------------------------------------
// FareQuery
// ---------------------------------------------------------------------------

/// One lookup: the cheapest fares on `route` departing within the date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareQuery {
    pub route: Route,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl FareQuery {
    pub fn on(route: Route, date: NaiveDate) -> Self {
        Self {
            route,
            date_from: date,
            date_to: date,
        }
    }
}

/// External supplier of priced itineraries.
pub trait PriceSource: Send {
    fn fetch_prices(&self, query: &FareQuery) -> Result<Vec<Observation>>;
}

// ---------------------------------------------------------------------------
// Search plan
// ---------------------------------------------------------------------------

/// Next occurrence of `weekday` on or after `from`.
pub fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let offset = (7 + weekday.num_days_from_monday() as i64
        - from.weekday().num_days_from_monday() as i64)
        % 7;
    from + Duration::days(offset)
}

/// Queries for every searched week starting at `today`: outbound flights from
/// the origin on each outbound weekday, and return flights into the origin on
/// each return weekday, for every destination.
pub fn plan_queries(settings: &Settings, today: NaiveDate) -> Vec<FareQuery> {
    let mut queries = Vec::new();
    for week in 0..settings.search_weeks {
        let week_start = today + Duration::weeks(week as i64);
        for &day in &settings.outbound_days {
            let date = next_weekday(week_start, day);
            for dest in &settings.destinations {
                queries.push(FareQuery::on(Route::new(&settings.origin, dest), date));
            }
        }
        for &day in &settings.return_days {
            let date = next_weekday(week_start, day);
            for dest in &settings.destinations {
                queries.push(FareQuery::on(Route::new(dest, &settings.origin), date));
            }
        }
    }
    queries
}

// ---------------------------------------------------------------------------
// Snapshot assembly
// ---------------------------------------------------------------------------

/// Snapshot built from a search plan, plus how many lookups failed.
#[derive(Debug, Clone)]
pub struct Collected {
    pub snapshot: Snapshot,
    pub failed_calls: usize,
}

/// Run every query against `source` and assemble the run's snapshot.
pub fn collect_snapshot(
    source: &dyn PriceSource,
    queries: &[FareQuery],
    captured_at: DateTime<Utc>,
) -> Collected {
    let mut observations = Vec::new();
    let mut failed_calls = 0;
    for query in queries {
        match source.fetch_prices(query) {
            Ok(found) => {
                debug!(route = %query.route, date = %query.date_from, found = found.len(), "fare lookup");
                observations.extend(found);
            }
            Err(e) => {
                failed_calls += 1;
                warn!(route = %query.route, date = %query.date_from, error = %e, "fare lookup failed");
            }
        }
    }
    let snapshot = Snapshot::captured(observations, captured_at);
    info!(
        queries = queries.len(),
        failed = failed_calls,
        observations = snapshot.len(),
        "snapshot collected"
    );
    Collected {
        snapshot,
        failed_calls,
    }
}
