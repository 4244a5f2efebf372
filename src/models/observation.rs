use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Route — Origin/destination IATA pair
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "From")]
    pub origin: String,
    #[serde(rename = "To")]
    pub destination: String,
}

impl Route {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{}", self.origin, self.destination)
    }
}

// ---------------------------------------------------------------------------
// Observation — One priced flight seen during a run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(flatten)]
    pub route: Route,
    /// Local departure time as quoted by the fare source.
    #[serde(rename = "DateTime")]
    pub flight_date_time: NaiveDateTime,
    #[serde(rename = "Price")]
    pub price: Decimal,
}

impl Observation {
    pub fn new(route: Route, flight_date_time: NaiveDateTime, price: Decimal) -> Self {
        Self {
            route,
            flight_date_time,
            price,
        }
    }

    /// Calendar date of departure.
    pub fn flight_date(&self) -> NaiveDate {
        self.flight_date_time.date()
    }
}

// ---------------------------------------------------------------------------
// Snapshot — All observations of a single run
// ---------------------------------------------------------------------------

/// Immutable table of one run's observations.
///
/// At most one observation exists per (origin, destination, flight time);
/// duplicates passed to [`Snapshot::captured`] are resolved last-wins. Rows
/// are kept ordered by flight time, then route, then price.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    observations: Vec<Observation>,
    captured_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// A snapshot with no observations and no capture time (first run).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the snapshot of a run captured at `captured_at`.
    pub fn captured(observations: Vec<Observation>, captured_at: DateTime<Utc>) -> Self {
        Self {
            observations: normalize(observations),
            captured_at: Some(captured_at),
        }
    }

    /// Rebuild a snapshot from persisted rows; the capture time is not stored.
    pub fn restored(observations: Vec<Observation>) -> Self {
        Self {
            observations: normalize(observations),
            captured_at: None,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Serialize as a JSON array of `{From, To, DateTime, Price}` records.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.observations)?)
    }

    /// Parse a snapshot previously written by [`Snapshot::to_json`].
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let observations: Vec<Observation> = serde_json::from_slice(data)?;
        Ok(Self::restored(observations))
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

fn normalize(observations: Vec<Observation>) -> Vec<Observation> {
    let mut unique: BTreeMap<(Route, NaiveDateTime), Observation> = BTreeMap::new();
    for obs in observations {
        unique.insert((obs.route.clone(), obs.flight_date_time), obs);
    }
    let mut rows: Vec<Observation> = unique.into_values().collect();
    rows.sort_by(|a, b| {
        a.flight_date_time
            .cmp(&b.flight_date_time)
            .then_with(|| a.route.cmp(&b.route))
            .then_with(|| a.price.cmp(&b.price))
    });
    rows
}
