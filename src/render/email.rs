//! HTML bodies for the change alert and the periodic summary emails.

use crate::models::{PriceChange, Snapshot};
use crate::render::html_table;

const DATE_FORMAT: &str = "%A, %Y-%m-%d";

/// Table of new and re-priced flights, or `None` when nothing changed.
pub fn change_alert_html(changes: &[PriceChange]) -> Option<String> {
    if changes.is_empty() {
        return None;
    }
    let rows: Vec<Vec<String>> = changes
        .iter()
        .map(|c| {
            vec![
                c.flight_date_time.format(DATE_FORMAT).to_string(),
                c.route.origin.clone(),
                c.route.destination.clone(),
                c.current_price.to_string(),
                c.previous_price
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "New Flight".to_string()),
            ]
        })
        .collect();
    Some(html_table(
        &["Date", "From", "To", "Price", "Previous Price"],
        &rows,
    ))
}

/// Every current fare ordered by departure time.
pub fn summary_html(snapshot: &Snapshot) -> String {
    if snapshot.is_empty() {
        return "<p>No flights found on this run.</p>".to_string();
    }
    let rows: Vec<Vec<String>> = snapshot
        .iter()
        .map(|obs| {
            vec![
                obs.flight_date_time.format(DATE_FORMAT).to_string(),
                obs.route.origin.clone(),
                obs.route.destination.clone(),
                obs.price.to_string(),
            ]
        })
        .collect();
    html_table(&["Date", "From", "To", "Price"], &rows)
}
