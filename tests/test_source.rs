//! Search planning and snapshot collection.

mod common;

use chrono::Weekday;
use common::{date, flight_time, obs, price, test_settings, utc, StubSource};
use fareboard::models::Route;
use fareboard::source::ryanair::parse_fares;
use fareboard::source::{collect_snapshot, next_weekday, plan_queries};
use fareboard::Settings;

// ---------------------------------------------------------------------------
// next_weekday
// ---------------------------------------------------------------------------

#[test]
fn next_weekday_includes_today() {
    // 2026-10-17 is a Saturday.
    assert_eq!(next_weekday(date(2026, 10, 17), Weekday::Sat), date(2026, 10, 17));
    assert_eq!(next_weekday(date(2026, 10, 17), Weekday::Sun), date(2026, 10, 18));
    assert_eq!(next_weekday(date(2026, 10, 17), Weekday::Fri), date(2026, 10, 23));
}

// ---------------------------------------------------------------------------
// plan_queries
// ---------------------------------------------------------------------------

#[test]
fn default_plan_covers_a_year_of_weekends() {
    let queries = plan_queries(&Settings::default(), date(2026, 10, 17));
    // 52 weeks x (2 outbound days x 2 destinations + 1 return day x 2 destinations)
    assert_eq!(queries.len(), 52 * 6);
}

#[test]
fn plan_has_outbound_and_return_legs() {
    let queries = plan_queries(&test_settings(), date(2026, 10, 17));
    let first_week: Vec<_> = queries
        .iter()
        .take(3)
        .map(|q| (q.route.clone(), q.date_from))
        .collect();
    assert_eq!(
        first_week,
        vec![
            (Route::new("DUB", "VIE"), date(2026, 10, 19)),
            (Route::new("DUB", "VIE"), date(2026, 10, 18)),
            (Route::new("VIE", "DUB"), date(2026, 10, 23)),
        ]
    );
    assert_eq!(queries[3].date_from, date(2026, 10, 26));
    assert!(queries.iter().all(|q| q.date_from == q.date_to));
}

// ---------------------------------------------------------------------------
// collect_snapshot
// ---------------------------------------------------------------------------

#[test]
fn failed_lookups_degrade_to_zero_rows() {
    let source = StubSource::with_fares(vec![
        obs("DUB", "VIE", flight_time(2026, 10, 19, 6, 30), "29.99"),
        obs("VIE", "DUB", flight_time(2026, 10, 23, 18, 0), "45"),
    ]);
    source.fail_route("VIE", "DUB");

    let queries = plan_queries(&test_settings(), date(2026, 10, 17));
    let collected = collect_snapshot(&source, &queries, utc(2026, 10, 17, 9));
    assert_eq!(source.calls(), queries.len());
    assert_eq!(collected.failed_calls, 2);
    assert_eq!(collected.snapshot.len(), 1);
    assert_eq!(collected.snapshot.captured_at(), Some(utc(2026, 10, 17, 9)));
}

// ---------------------------------------------------------------------------
// Ryanair response decoding
// ---------------------------------------------------------------------------

#[test]
fn fares_response_decodes_and_skips_unpriced() {
    let body = br#"{
        "fares": [
            {"outbound": {
                "departureAirport": {"iataCode": "DUB", "name": "Dublin"},
                "arrivalAirport": {"iataCode": "VIE", "name": "Vienna"},
                "departureDate": "2026-10-19T06:30:00",
                "price": {"value": 29.99, "currencyCode": "EUR"}
            }},
            {"outbound": {
                "departureAirport": {"iataCode": "DUB"},
                "arrivalAirport": {"iataCode": "VIE"},
                "departureDate": "2026-10-26T06:30:00",
                "price": null
            }}
        ]
    }"#;
    let fares = parse_fares(body).unwrap();
    assert_eq!(fares.len(), 1);
    assert_eq!(fares[0].route, Route::new("DUB", "VIE"));
    assert_eq!(fares[0].flight_date_time, flight_time(2026, 10, 19, 6, 30));
    assert_eq!(fares[0].price, price("29.99"));
}

#[test]
fn missing_fares_list_is_empty() {
    assert!(parse_fares(b"{}").unwrap().is_empty());
    assert!(parse_fares(b"not json").is_err());
}
