//! End-to-end runs against in-memory collaborators.

mod common;

use common::{flight_time, obs, test_settings, utc, RecordingNotifier, StubSource};
use fareboard::config::{
    summary_subject, ALERT_SUBJECT, CHART_KEY, HISTORY_KEY, REPORT_KEY, RUN_COUNT_KEY, SNAPSHOT_KEY,
};
use fareboard::models::History;
use fareboard::render::report::{NO_CHART_HTML, NO_FLIGHTS_HTML};
use fareboard::render::{ChartImage, ChartRenderer, TrendChart};
use fareboard::store::MemoryBlobStore;
use fareboard::{FareError, Fareboard, Result, Settings};

fn fares() -> Vec<fareboard::models::Observation> {
    vec![
        obs("DUB", "VIE", flight_time(2026, 10, 19, 6, 30), "29.99"),
        obs("VIE", "DUB", flight_time(2026, 10, 23, 18, 0), "45"),
    ]
}

fn board(store: &MemoryBlobStore, source: &StubSource, notifier: &RecordingNotifier) -> Fareboard {
    Fareboard::builder()
        .settings(test_settings())
        .store(store.clone())
        .source(source.clone())
        .notifier(notifier.clone())
        .build()
        .unwrap()
}

fn history_rows(store: &MemoryBlobStore) -> usize {
    History::from_csv(&store.get_text(HISTORY_KEY).unwrap())
        .unwrap()
        .len()
}

struct BrokenChart;

impl ChartRenderer for BrokenChart {
    fn render(&self, _chart: &TrendChart) -> Result<ChartImage> {
        Err(FareError::Rendering("plotting backend crashed".into()))
    }
}

// ---------------------------------------------------------------------------
// Normal runs
// ---------------------------------------------------------------------------

#[test]
fn first_run_alerts_on_all_new_fares() {
    let (store, source, notifier) = (MemoryBlobStore::new(), StubSource::with_fares(fares()), RecordingNotifier::default());
    let outcome = board(&store, &source, &notifier).run_at(utc(2026, 10, 17, 9)).unwrap();

    assert_eq!(outcome.observations, 2);
    assert_eq!(outcome.changes, 2);
    assert!(outcome.alert_sent);
    assert!(!outcome.summary_sent);
    assert_eq!(outcome.counter, 1);
    assert!(!outcome.chart_published);
    assert!(outcome.report_published);

    assert_eq!(notifier.subjects(), vec![ALERT_SUBJECT.to_string()]);
    assert!(notifier.sent()[0].body.contains("New Flight"));
    assert_eq!(history_rows(&store), 2);
    assert_eq!(store.get_text(RUN_COUNT_KEY).unwrap(), "1");
    assert!(store.get(SNAPSHOT_KEY).is_some());
    assert!(store.get(CHART_KEY).is_none());

    let report = store.get(REPORT_KEY).unwrap();
    assert_eq!(report.content_type, "text/html");
    assert!(store.is_public(REPORT_KEY));
    assert!(String::from_utf8(report.data).unwrap().contains(NO_CHART_HTML));
}

#[test]
fn unchanged_second_run_is_quiet_but_grows_history() {
    let (store, source, notifier) = (MemoryBlobStore::new(), StubSource::with_fares(fares()), RecordingNotifier::default());
    let board = board(&store, &source, &notifier);
    board.run_at(utc(2026, 10, 17, 9)).unwrap();
    let outcome = board.run_at(utc(2026, 10, 17, 10)).unwrap();

    assert_eq!(outcome.changes, 0);
    assert!(!outcome.alert_sent);
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(history_rows(&store), 4);
    assert_eq!(outcome.counter, 2);

    assert!(outcome.chart_published);
    assert!(store.is_public(CHART_KEY));
    assert_eq!(store.get(CHART_KEY).unwrap().content_type, "image/svg+xml");
    let report = store.get_text(REPORT_KEY).unwrap();
    assert!(report.contains("memory://price_history_graph.svg?t="));
}

#[test]
fn repriced_fare_triggers_alert_with_previous_price() {
    let (store, source, notifier) = (MemoryBlobStore::new(), StubSource::with_fares(fares()), RecordingNotifier::default());
    let board = board(&store, &source, &notifier);
    board.run_at(utc(2026, 10, 17, 9)).unwrap();

    source.set_fares(vec![
        obs("DUB", "VIE", flight_time(2026, 10, 19, 6, 30), "24.99"),
        obs("VIE", "DUB", flight_time(2026, 10, 23, 18, 0), "45"),
    ]);
    let outcome = board.run_at(utc(2026, 10, 17, 10)).unwrap();

    assert_eq!(outcome.changes, 1);
    let alert = &notifier.sent()[1];
    assert!(alert.body.contains("<td>24.99</td>"));
    assert!(alert.body.contains("<td>29.99</td>"));
    assert!(!alert.body.contains("New Flight"));
}

#[test]
fn sixth_run_sends_summary_and_resets_counter() {
    let (store, source, notifier) = (MemoryBlobStore::new(), StubSource::with_fares(fares()), RecordingNotifier::default());
    store.insert(RUN_COUNT_KEY, "5");
    let outcome = board(&store, &source, &notifier).run_at(utc(2026, 10, 17, 9)).unwrap();

    assert!(outcome.summary_sent);
    assert_eq!(outcome.counter, 0);
    assert_eq!(store.get_text(RUN_COUNT_KEY).unwrap(), "0");
    assert!(notifier.subjects().contains(&summary_subject(6)));
}

#[test]
fn empty_search_keeps_previous_state_and_renders_fallback() {
    let (store, source, notifier) = (MemoryBlobStore::new(), StubSource::default(), RecordingNotifier::default());
    store.insert(SNAPSHOT_KEY, "[]");
    let outcome = board(&store, &source, &notifier).run_at(utc(2026, 10, 17, 9)).unwrap();

    assert_eq!(outcome.observations, 0);
    assert_eq!(outcome.changes, 0);
    assert!(notifier.sent().is_empty());
    assert_eq!(store.get_text(SNAPSHOT_KEY).unwrap(), "[]");
    assert!(store.get(HISTORY_KEY).is_none());
    assert_eq!(outcome.counter, 1);
    assert!(store.get_text(REPORT_KEY).unwrap().contains(NO_FLIGHTS_HTML));
}

#[test]
fn render_report_uses_stored_state_only() {
    let (store, source, notifier) = (MemoryBlobStore::new(), StubSource::with_fares(fares()), RecordingNotifier::default());
    let board = board(&store, &source, &notifier);
    board.run_at(utc(2026, 10, 17, 9)).unwrap();
    let calls = source.calls();

    assert!(board.render_report(utc(2026, 10, 17, 12)).unwrap());
    assert_eq!(source.calls(), calls);
    assert_eq!(store.get_text(RUN_COUNT_KEY).unwrap(), "1");
    assert_eq!(notifier.sent().len(), 1);
}

// ---------------------------------------------------------------------------
// Degraded runs
// ---------------------------------------------------------------------------

#[test]
fn history_write_failure_aborts_before_counter() {
    let (store, source, notifier) = (MemoryBlobStore::new(), StubSource::with_fares(fares()), RecordingNotifier::default());
    store.insert(RUN_COUNT_KEY, "2");
    store.fail_writes_to(HISTORY_KEY);

    let err = board(&store, &source, &notifier).run_at(utc(2026, 10, 17, 9)).unwrap_err();
    assert!(matches!(err, FareError::Persistence { ref key, .. } if key == HISTORY_KEY));
    assert_eq!(store.get_text(RUN_COUNT_KEY).unwrap(), "2");
    assert!(store.get(SNAPSHOT_KEY).is_none());
    assert!(store.get(REPORT_KEY).is_none());
}

#[test]
fn counter_at_limit_does_not_break_the_run() {
    let (store, source, notifier) = (MemoryBlobStore::new(), StubSource::with_fares(fares()), RecordingNotifier::default());
    store.insert(RUN_COUNT_KEY, u64::MAX.to_string());
    let outcome = board(&store, &source, &notifier).run_at(utc(2026, 10, 17, 9)).unwrap();
    assert_eq!(outcome.counter, 1);
    assert!(!outcome.summary_sent);
    assert_eq!(store.get_text(RUN_COUNT_KEY).unwrap(), "1");
}

#[test]
fn corrupt_history_is_never_overwritten() {
    let (store, source, notifier) = (MemoryBlobStore::new(), StubSource::with_fares(fares()), RecordingNotifier::default());
    store.insert(HISTORY_KEY, "garbage,row\n");

    let err = board(&store, &source, &notifier).run_at(utc(2026, 10, 17, 9)).unwrap_err();
    assert!(matches!(err, FareError::Parse(_)));
    assert_eq!(store.get_text(HISTORY_KEY).unwrap(), "garbage,row\n");
    assert!(store.get(RUN_COUNT_KEY).is_none());
}

#[test]
fn notification_failure_does_not_abort() {
    let (store, source) = (MemoryBlobStore::new(), StubSource::with_fares(fares()));
    let outcome = board(&store, &source, &RecordingNotifier::failing())
        .run_at(utc(2026, 10, 17, 9))
        .unwrap();
    assert_eq!(outcome.changes, 2);
    assert!(!outcome.alert_sent);
    assert_eq!(store.get_text(RUN_COUNT_KEY).unwrap(), "1");
    assert!(outcome.report_published);
}

#[test]
fn source_failures_are_partial() {
    let (store, source, notifier) = (MemoryBlobStore::new(), StubSource::with_fares(fares()), RecordingNotifier::default());
    source.fail_route("VIE", "DUB");
    let outcome = board(&store, &source, &notifier).run_at(utc(2026, 10, 17, 9)).unwrap();
    assert_eq!(outcome.failed_lookups, 2);
    assert_eq!(outcome.observations, 1);
    assert_eq!(history_rows(&store), 1);
}

#[test]
fn chart_failure_falls_back_to_placeholder() {
    let (store, source, notifier) = (MemoryBlobStore::new(), StubSource::with_fares(fares()), RecordingNotifier::default());
    let board = Fareboard::builder()
        .settings(test_settings())
        .store(store.clone())
        .source(source.clone())
        .notifier(notifier.clone())
        .chart_renderer(BrokenChart)
        .build()
        .unwrap();
    board.run_at(utc(2026, 10, 17, 9)).unwrap();
    let outcome = board.run_at(utc(2026, 10, 17, 10)).unwrap();

    assert!(!outcome.chart_published);
    assert!(outcome.report_published);
    assert!(store.get_text(REPORT_KEY).unwrap().contains(NO_CHART_HTML));
    assert_eq!(outcome.counter, 2);
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[test]
fn builder_rejects_zero_interval() {
    let result = Fareboard::builder()
        .settings(Settings {
            notify_interval: 0,
            ..test_settings()
        })
        .store(MemoryBlobStore::new())
        .source(StubSource::default())
        .notifier(RecordingNotifier::default())
        .build();
    assert!(matches!(result, Err(FareError::InvalidArgument(_))));
}

#[test]
fn display_names_route_and_store() {
    let board = board(&MemoryBlobStore::new(), &StubSource::default(), &RecordingNotifier::default());
    assert_eq!(
        board.to_string(),
        "Fareboard(origin=DUB, destinations=[VIE], store=memory://)"
    );
}
