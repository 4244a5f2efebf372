//! Change detection between two consecutive snapshots.
//!
//! Rows are aligned on the departure *date* (not the full timestamp) plus the
//! route, so small time normalization differences between runs never break
//! the alignment.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{FareError, Result};
use crate::models::{Observation, PriceChange, Route, Snapshot};

type ChangeKey<'a> = (NaiveDate, &'a Route);

/// Compare `current` against `previous` and return the new or re-priced rows.
///
/// Every returned change refers to a row of `current`; rows that disappeared
/// since `previous` are not reported. Output follows the order of `current`.
///
/// Fails with [`FareError::DuplicateKey`] when either snapshot carries two
/// rows for the same (date, route).
pub fn detect_changes(current: &Snapshot, previous: &Snapshot) -> Result<Vec<PriceChange>> {
    if current.is_empty() {
        return Ok(Vec::new());
    }
    ensure_unique_keys(current, "current")?;
    let previous_prices = index_prices(previous)?;

    let changes = current
        .iter()
        .filter_map(|obs| {
            let previous_price = previous_prices.get(&key_of(obs)).copied();
            match previous_price {
                Some(prev) if prev == obs.price => None,
                _ => Some(PriceChange {
                    route: obs.route.clone(),
                    flight_date_time: obs.flight_date_time,
                    previous_price,
                    current_price: obs.price,
                    is_new: previous_price.is_none(),
                }),
            }
        })
        .collect();
    Ok(changes)
}

fn key_of(obs: &Observation) -> ChangeKey<'_> {
    (obs.flight_date(), &obs.route)
}

fn index_prices(snapshot: &Snapshot) -> Result<HashMap<ChangeKey<'_>, Decimal>> {
    let mut prices = HashMap::with_capacity(snapshot.len());
    for obs in snapshot {
        if prices.insert(key_of(obs), obs.price).is_some() {
            return Err(duplicate(obs, "previous"));
        }
    }
    Ok(prices)
}

fn ensure_unique_keys(snapshot: &Snapshot, which: &str) -> Result<()> {
    let mut seen = HashSet::with_capacity(snapshot.len());
    for obs in snapshot {
        if !seen.insert(key_of(obs)) {
            return Err(duplicate(obs, which));
        }
    }
    Ok(())
}

fn duplicate(obs: &Observation, which: &str) -> FareError {
    FareError::DuplicateKey(format!(
        "{} snapshot has more than one {} flight on {}",
        which,
        obs.route,
        obs.flight_date()
    ))
}
