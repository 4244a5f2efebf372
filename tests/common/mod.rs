//! Shared fixtures for the fareboard integration tests.
//!
//! Provides a scriptable fare source, a recording notifier, and helpers for
//! building observations and timestamps tersely.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use fareboard::models::{Observation, Route};
use fareboard::notify::{Delivery, Notifier};
use fareboard::source::{FareQuery, PriceSource};
use fareboard::{FareError, Result, Settings};
use rust_decimal::Decimal;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn flight_time(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).unwrap()
}

pub fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn price(raw: &str) -> Decimal {
    raw.parse().unwrap()
}

pub fn obs(from: &str, to: &str, when: NaiveDateTime, amount: &str) -> Observation {
    Observation::new(Route::new(from, to), when, price(amount))
}

/// Small search plan: two weeks, DUB <-> VIE only.
pub fn test_settings() -> Settings {
    Settings {
        destinations: vec!["VIE".to_string()],
        search_weeks: 2,
        ..Settings::default()
    }
}

// ---------------------------------------------------------------------------
// StubSource
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StubState {
    fares: Vec<Observation>,
    failing_routes: HashSet<Route>,
    calls: usize,
}

/// Fare source answering from an in-memory fare list. Clones share state so
/// tests can reprice fares between runs.
#[derive(Clone, Default)]
pub struct StubSource {
    state: Arc<Mutex<StubState>>,
}

impl StubSource {
    pub fn with_fares(fares: Vec<Observation>) -> Self {
        let source = Self::default();
        source.set_fares(fares);
        source
    }

    pub fn set_fares(&self, fares: Vec<Observation>) {
        self.state.lock().unwrap().fares = fares;
    }

    pub fn fail_route(&self, from: &str, to: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_routes
            .insert(Route::new(from, to));
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

impl PriceSource for StubSource {
    fn fetch_prices(&self, query: &FareQuery) -> Result<Vec<Observation>> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.failing_routes.contains(&query.route) {
            return Err(FareError::SourceUnavailable(format!("{} is down", query.route)));
        }
        Ok(state
            .fares
            .iter()
            .filter(|o| {
                o.route == query.route
                    && o.flight_date() >= query.date_from
                    && o.flight_date() <= query.date_to
            })
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub subject: String,
    pub body: String,
}

/// Notifier that keeps every message; optionally fails every send.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentMail>>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.subject).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, subject: &str, html_body: &str) -> Result<Delivery> {
        if self.failing {
            return Err(FareError::Notification("mail relay offline".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(Delivery::Sent)
    }
}
