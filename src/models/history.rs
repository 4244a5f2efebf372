//! Append-only price history ledger and its row-oriented text encoding.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FareError, Result};
use crate::models::{Route, Snapshot};

pub const HISTORY_HEADER: &str = "CheckTime,FlightDateTime,From,To,Price";

const FLIGHT_TIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

// ---------------------------------------------------------------------------
// HistoryRow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub check_time: DateTime<Utc>,
    pub flight_date_time: NaiveDateTime,
    pub route: Route,
    pub price: Decimal,
}

impl HistoryRow {
    fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.check_time.to_rfc3339(),
            self.flight_date_time.format("%Y-%m-%dT%H:%M:%S"),
            self.route.origin,
            self.route.destination,
            self.price
        )
    }

    fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 5 {
            return Err(FareError::Parse(format!(
                "history line {}: expected 5 fields, found {}",
                line_no,
                fields.len()
            )));
        }
        let check_time = DateTime::parse_from_rfc3339(fields[0])?.with_timezone(&Utc);
        let flight_date_time = parse_flight_time(fields[1]).ok_or_else(|| {
            FareError::Parse(format!(
                "history line {}: bad flight time '{}'",
                line_no, fields[1]
            ))
        })?;
        let price: Decimal = fields[4].parse()?;
        Ok(Self {
            check_time,
            flight_date_time,
            route: Route::new(fields[2], fields[3]),
            price,
        })
    }
}

fn parse_flight_time(raw: &str) -> Option<NaiveDateTime> {
    FLIGHT_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Every observation ever recorded, oldest first.
///
/// Rows are never removed or modified; [`History::with_snapshot`] produces a
/// new ledger with the run's rows appended.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct History {
    rows: Vec<HistoryRow>,
}

impl History {
    pub fn new(rows: Vec<HistoryRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Return this ledger extended by one row per observation of `snapshot`,
    /// each stamped with `check_time`.
    ///
    /// No deduplication is done: seeing the same fare again on a later run is
    /// what gives a series its trend.
    pub fn with_snapshot(&self, snapshot: &Snapshot, check_time: DateTime<Utc>) -> History {
        let mut rows = Vec::with_capacity(self.rows.len() + snapshot.len());
        rows.extend_from_slice(&self.rows);
        rows.extend(snapshot.iter().map(|obs| HistoryRow {
            check_time,
            flight_date_time: obs.flight_date_time,
            route: obs.route.clone(),
            price: obs.price,
        }));
        History { rows }
    }

    /// Encode as a header-first comma-separated table.
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(HISTORY_HEADER.len() + 1 + self.rows.len() * 64);
        out.push_str(HISTORY_HEADER);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.to_line());
            out.push('\n');
        }
        out
    }

    /// Decode a table written by [`History::to_csv`].
    ///
    /// Blank lines are skipped. The header line is optional.
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || (idx == 0 && line.starts_with("CheckTime")) {
                continue;
            }
            rows.push(HistoryRow::parse_line(line, idx + 1)?);
        }
        Ok(Self { rows })
    }
}
