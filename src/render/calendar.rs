//! Compact multi-month price calendar.
//!
//! Each month is a Monday-first grid of full weeks. Days that belong to the
//! neighbouring months are shown as overflow cells carrying only their day
//! number, so a flight appears in exactly one cell: its own day in its own
//! month.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Month, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::config;
use crate::models::{Observation, Route, Snapshot};
use crate::render::escape_html;
use crate::render::heatmap::{HeatmapScale, Rgb};

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

/// One flight listed inside a day cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEntry {
    pub route: Route,
    pub flight_date_time: NaiveDateTime,
    pub price: Decimal,
    pub color: Rgb,
    pub booking_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// `false` for overflow days from the previous or next month.
    pub in_month: bool,
    pub entries: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthBlock {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<DayCell>>,
}

impl MonthBlock {
    pub fn title(&self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("?");
        format!("{} {}", name, self.year)
    }

    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten()
    }
}

pub fn booking_url(route: &Route, date: NaiveDate) -> String {
    format!(
        "{}?adults=1&dateOut={}&originIata={}&destinationIata={}&isReturn=false",
        config::BOOKING_URL_BASE,
        date.format("%Y-%m-%d"),
        route.origin,
        route.destination
    )
}

/// Monday-first weeks covering every day of `year`-`month`.
pub fn month_weeks(year: i32, month: u32) -> Vec<[NaiveDate; 7]> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next_first
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);

    let mut day = first - Duration::days(first.weekday().num_days_from_monday() as i64);
    let mut weeks = Vec::new();
    while day <= last {
        let mut week = [day; 7];
        for (i, slot) in week.iter_mut().enumerate() {
            *slot = day + Duration::days(i as i64);
        }
        weeks.push(week);
        day += Duration::weeks(1);
    }
    weeks
}

/// Group `snapshot` by departure date into `months` month blocks starting
/// with the month containing `start`.
///
/// Within a day, flights are ordered by route, then price, then departure time.
pub fn build_calendar(
    snapshot: &Snapshot,
    scale: &HeatmapScale,
    start: NaiveDate,
    months: u32,
) -> Vec<MonthBlock> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&Observation>> = BTreeMap::new();
    for obs in snapshot {
        by_date.entry(obs.flight_date()).or_default().push(obs);
    }
    for day in by_date.values_mut() {
        day.sort_by(|a, b| {
            a.route
                .cmp(&b.route)
                .then_with(|| a.price.cmp(&b.price))
                .then_with(|| a.flight_date_time.cmp(&b.flight_date_time))
        });
    }

    (0..months)
        .map(|i| {
            let idx = start.month0() + i;
            let year = start.year() + (idx / 12) as i32;
            let month = idx % 12 + 1;
            let weeks = month_weeks(year, month)
                .into_iter()
                .map(|week| {
                    week.iter()
                        .map(|&date| {
                            let in_month = date.month() == month;
                            let entries = if in_month {
                                by_date
                                    .get(&date)
                                    .map(|obs| obs.iter().map(|o| entry_for(o, scale)).collect::<Vec<_>>())
                                    .unwrap_or_default()
                            } else {
                                Vec::new()
                            };
                            DayCell {
                                date,
                                in_month,
                                entries,
                            }
                        })
                        .collect::<Vec<DayCell>>()
                })
                .collect();
            MonthBlock { year, month, weeks }
        })
        .collect()
}

fn entry_for(obs: &Observation, scale: &HeatmapScale) -> CalendarEntry {
    CalendarEntry {
        route: obs.route.clone(),
        flight_date_time: obs.flight_date_time,
        price: obs.price,
        color: scale.color(obs.price),
        booking_url: booking_url(&obs.route, obs.flight_date()),
    }
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

const WEEKDAY_HEADERS: [&str; 7] = ["M", "T", "W", "T", "F", "S", "S"];

pub fn render_calendar_html(blocks: &[MonthBlock]) -> String {
    let mut html = String::new();
    for block in blocks {
        html.push_str("<div class='month-block'>");
        html.push_str(&format!("<h4>{}</h4>", block.title()));
        html.push_str("<table class='compact-calendar'><thead><tr>");
        for day in WEEKDAY_HEADERS {
            html.push_str(&format!("<th>{}</th>", day));
        }
        html.push_str("</tr></thead><tbody>");
        for week in &block.weeks {
            html.push_str("<tr>");
            for cell in week {
                render_cell(&mut html, cell);
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table></div>");
    }
    html
}

fn render_cell(html: &mut String, cell: &DayCell) {
    let class = if cell.in_month { "" } else { "other-month" };
    html.push_str(&format!("<td class='{}'><table class='day-table'>", class));
    if cell.entries.is_empty() {
        html.push_str(&format!(
            "<tr><td class='date-cell'>{}</td></tr>",
            cell.date.day()
        ));
    }
    for (i, entry) in cell.entries.iter().enumerate() {
        let day_label = if i == 0 {
            cell.date.day().to_string()
        } else {
            String::new()
        };
        html.push_str(&format!(
            "<tr><td class='date-cell'>{}</td><td class='route-cell'>{}:</td>\
             <td class='price-cell'><a href='{}' target='_blank' class='booking-link'><b>B</b></a>\
             <span class='flight-price' style='background-color: {}'>€{}</span></td></tr>",
            day_label,
            escape_html(&entry.route.to_string()),
            escape_html(&entry.booking_url),
            entry.color,
            entry.price.round_dp(0)
        ));
    }
    html.push_str("</table></td>");
}
