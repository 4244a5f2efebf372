//! Price-evolution series extracted from the history ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{History, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPoint {
    pub check_time: DateTime<Utc>,
    pub price: Decimal,
}

/// Every recorded price of one flight, oldest check first.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub label: String,
    pub route: Route,
    pub flight_date_time: NaiveDateTime,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendChart {
    pub series: Vec<TrendSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrendOutcome {
    Chart(TrendChart),
    /// No flight has been observed on two or more runs yet.
    InsufficientData,
}

pub fn series_label(route: &Route, flight_date_time: NaiveDateTime) -> String {
    format!(
        "{} to {} on {}",
        route.origin,
        route.destination,
        flight_date_time.format("%Y-%m-%d %H:%M")
    )
}

/// Group `history` by (route, departure time) and keep series with at least
/// two points.
///
/// Series are ordered by departure time, then route. Points with equal check
/// times keep their ledger order.
pub fn build_trend(history: &History) -> TrendOutcome {
    let mut groups: BTreeMap<(NaiveDateTime, &Route), Vec<TrendPoint>> = BTreeMap::new();
    for row in history.rows() {
        groups
            .entry((row.flight_date_time, &row.route))
            .or_default()
            .push(TrendPoint {
                check_time: row.check_time,
                price: row.price,
            });
    }

    let series: Vec<TrendSeries> = groups
        .into_iter()
        .filter(|(_, points)| points.len() >= 2)
        .map(|((flight_date_time, route), mut points)| {
            points.sort_by_key(|p| p.check_time);
            TrendSeries {
                label: series_label(route, flight_date_time),
                route: route.clone(),
                flight_date_time,
                points,
            }
        })
        .collect();

    if series.is_empty() {
        TrendOutcome::InsufficientData
    } else {
        TrendOutcome::Chart(TrendChart { series })
    }
}
