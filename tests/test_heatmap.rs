//! Heatmap price styling.

use fareboard::render::heatmap::{CHEAP, EXPENSIVE, RAMP_HIGH, RAMP_MID};
use fareboard::render::{Heat, HeatmapScale, Rgb};
use fareboard::FareError;
use rust_decimal::Decimal;

fn scale() -> HeatmapScale {
    HeatmapScale::new(Decimal::from(10), Decimal::from(75)).unwrap()
}

#[test]
fn bounds_map_to_fixed_colors() {
    let s = scale();
    assert_eq!(s.color(Decimal::from(10)), CHEAP);
    assert_eq!(s.color(Decimal::from(3)), CHEAP);
    assert_eq!(s.color(Decimal::ZERO), CHEAP);
    assert_eq!(s.color(Decimal::from(75)), RAMP_HIGH);
    assert_eq!(s.color(Decimal::from(100)), EXPENSIVE);
    assert_eq!(s.color("75.01".parse().unwrap()), EXPENSIVE);
}

#[test]
fn ramp_midpoint_is_yellow() {
    assert_eq!(scale().color("42.5".parse().unwrap()), RAMP_MID);
}

#[test]
fn heat_is_monotonic_across_range() {
    let s = scale();
    let mut last = s.heat(Decimal::ZERO);
    let mut last_red = s.color(Decimal::ZERO).0;
    for cents in (0..=12_000).step_by(25) {
        let p = Decimal::new(cents, 2);
        let heat = s.heat(p);
        assert!(heat >= last, "heat decreased at {}", p);
        if p <= Decimal::from(75) {
            let red = s.color(p).0;
            assert!(red >= last_red, "red channel decreased at {}", p);
            last_red = red;
        }
        last = heat;
    }
}

#[test]
fn ramp_position_is_fraction_of_span() {
    match scale().heat(Decimal::from(23)) {
        Heat::Ramp(t) => assert!((t - 0.2).abs() < 1e-9),
        other => panic!("expected ramp, got {:?}", other),
    }
}

#[test]
fn degenerate_span_never_divides_by_zero() {
    let s = HeatmapScale::new(Decimal::from(50), Decimal::from(50)).unwrap();
    assert_eq!(s.color(Decimal::from(50)), CHEAP);
    assert_eq!(s.color(Decimal::from(51)), EXPENSIVE);
}

#[test]
fn inverted_bounds_are_rejected() {
    let err = HeatmapScale::new(Decimal::from(80), Decimal::from(10)).unwrap_err();
    assert!(matches!(err, FareError::InvalidArgument(_)));
}

#[test]
fn hex_is_lowercase_six_digit() {
    assert_eq!(Rgb(0x90, 0xee, 0x90).hex(), "#90ee90");
    assert_eq!(EXPENSIVE.to_string(), "#f08080");
}
