//! HTML and chart rendering for the dashboard and notification emails.

pub mod calendar;
pub mod chart;
pub mod email;
pub mod heatmap;
pub mod report;
pub mod trend;

pub use calendar::{build_calendar, render_calendar_html, CalendarEntry, DayCell, MonthBlock};
pub use chart::{ChartImage, ChartRenderer, SvgChartRenderer};
pub use email::{change_alert_html, summary_html};
pub use heatmap::{Heat, HeatmapScale, Rgb};
pub use report::ReportAssembler;
pub use trend::{build_trend, TrendChart, TrendOutcome, TrendPoint, TrendSeries};

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a bordered HTML table; cells are escaped.
pub(crate) fn html_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n  <thead>\n    <tr>");
    for h in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(h)));
    }
    html.push_str("</tr>\n  </thead>\n  <tbody>\n");
    for row in rows {
        html.push_str("    <tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("  </tbody>\n</table>");
    html
}
