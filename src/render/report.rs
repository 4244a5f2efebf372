//! Assembles the self-contained dashboard page.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::Snapshot;
use crate::render::calendar::{build_calendar, render_calendar_html};
use crate::render::escape_html;
use crate::render::heatmap::HeatmapScale;

const STYLE: &str = "body{font-family:Arial,sans-serif;margin:20px}h1,.footer{text-align:center}\
.calendar-grid-container{display:flex;flex-wrap:wrap;justify-content:space-around}\
.month-block{width:32%;min-width:300px;margin-bottom:15px}\
.month-block h4{text-align:center;margin:5px 0;font-size:14px}\
.compact-calendar{width:100%;border-collapse:collapse}\
.compact-calendar th{background-color:#f7f7f7;text-align:center;font-size:10px;border:1px solid #e0e0e0;padding:3px}\
.compact-calendar td{border:1px solid #e0e0e0;padding:2px;vertical-align:top;text-align:left;height:auto}\
.other-month{background-color:#fcfcfc}.day-table{width:100%;border-collapse:collapse}\
.day-table td{border:none;padding:1px 0;font-size:9px;white-space:nowrap}\
.day-table .date-cell{width:15px;font-weight:bold}.day-table .route-cell{padding-left:3px}\
.day-table .price-cell{text-align:right;width:50px}\
.booking-link{text-decoration:none;color:#007bff;font-size:10px;margin-right:3px}\
.booking-link:hover{text-decoration:underline}\
.flight-price{padding:1px 3px;border-radius:3px;color:#000;font-weight:bold}";

pub const NO_FLIGHTS_HTML: &str = "<h2>No flights were found during the last check.</h2>";
pub const NO_CHART_HTML: &str =
    "<p>Graph will be generated once enough historical data is collected.</p>";

/// Builds the dashboard from the current snapshot and an optional chart link.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    pub scale: HeatmapScale,
    pub months: u32,
}

impl ReportAssembler {
    pub fn new(scale: HeatmapScale, months: u32) -> Self {
        Self { scale, months }
    }

    /// Render the page. `chart_url` is the public location of the chart
    /// image, or `None` to show the placeholder. Never fails: an empty
    /// snapshot renders the "no flights" message instead of a calendar.
    pub fn assemble(
        &self,
        snapshot: &Snapshot,
        today: NaiveDate,
        chart_url: Option<&str>,
        generated_at: DateTime<Utc>,
    ) -> String {
        let calendar_html = if snapshot.is_empty() {
            NO_FLIGHTS_HTML.to_string()
        } else {
            render_calendar_html(&build_calendar(snapshot, &self.scale, today, self.months))
        };

        let mut graph_html = String::from("<h2>Price History Graph</h2>");
        match chart_url {
            Some(url) => graph_html.push_str(&format!(
                "<img src='{}?t={}' alt='Price History Graph' style='width:100%; max-width:1000px;'>",
                escape_html(url),
                generated_at.timestamp()
            )),
            None => graph_html.push_str(NO_CHART_HTML),
        }

        format!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>Ryanair Flight Dashboard</title><style>{}</style>\n\
             </head><body><h1>Ryanair Live Flight Dashboard</h1>\
             <div class=\"calendar-grid-container\">{}</div><hr><div>{}</div>\n\
             <p class=\"footer\" style=\"font-size:12px;color:#888;\">Last updated: {}</p></body></html>\n",
            STYLE,
            calendar_html,
            graph_html,
            generated_at.format("%Y-%m-%d %I:%M:%S %p %Z")
        )
    }
}
