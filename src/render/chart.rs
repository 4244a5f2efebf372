//! Chart image rendering for the price-evolution section.

use rust_decimal::prelude::ToPrimitive;

use crate::error::{FareError, Result};
use crate::render::escape_html;
use crate::render::trend::TrendChart;

/// A rendered chart ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Turns grouped series into an image.
pub trait ChartRenderer: Send {
    fn render(&self, chart: &TrendChart) -> Result<ChartImage>;
}

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 280.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 110.0;
const TICKS: usize = 5;

/// Line chart of price against check time, one marked line per series.
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    pub width: u32,
    pub height: u32,
    pub currency: String,
}

impl SvgChartRenderer {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            width: 1200,
            height: 700,
            currency: currency.into(),
        }
    }
}

struct Axis {
    min: f64,
    max: f64,
    from: f64,
    to: f64,
}

impl Axis {
    fn new(min: f64, max: f64, pad: f64, from: f64, to: f64) -> Self {
        let (min, max) = if max - min <= f64::EPSILON {
            (min - pad, max + pad)
        } else {
            (min, max)
        };
        Self { min, max, from, to }
    }

    fn map(&self, v: f64) -> f64 {
        self.from + (v - self.min) / (self.max - self.min) * (self.to - self.from)
    }

    fn tick(&self, i: usize) -> f64 {
        self.min + (self.max - self.min) * i as f64 / (TICKS - 1) as f64
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, chart: &TrendChart) -> Result<ChartImage> {
        let points = chart.series.iter().flat_map(|s| s.points.iter());
        let (mut t_min, mut t_max) = (i64::MAX, i64::MIN);
        let (mut p_min, mut p_max) = (f64::MAX, f64::MIN);
        for p in points {
            let ts = p.check_time.timestamp();
            let price = p.price.to_f64().ok_or_else(|| {
                FareError::Rendering(format!("price {} is not plottable", p.price))
            })?;
            t_min = t_min.min(ts);
            t_max = t_max.max(ts);
            p_min = p_min.min(price);
            p_max = p_max.max(price);
        }
        if t_min > t_max {
            return Err(FareError::Rendering("chart has no points".into()));
        }

        let (w, h) = (self.width as f64, self.height as f64);
        let x = Axis::new(t_min as f64, t_max as f64, 3600.0, MARGIN_LEFT, w - MARGIN_RIGHT);
        let y = Axis::new(p_min, p_max, 1.0, h - MARGIN_BOTTOM, MARGIN_TOP);

        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
             viewBox=\"0 0 {w} {h}\" font-family=\"Arial, sans-serif\">\n\
             <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n\
             <text x=\"{}\" y=\"30\" font-size=\"20\" text-anchor=\"middle\">Flight Price Evolution</text>\n",
            (MARGIN_LEFT + w - MARGIN_RIGHT) / 2.0
        );

        for i in 0..TICKS {
            let pv = y.tick(i);
            let py = y.map(pv);
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{py:.1}\" x2=\"{:.1}\" y2=\"{py:.1}\" stroke=\"#e5e5e5\"/>\
                 <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"end\">{pv:.2}</text>\n",
                x.from,
                x.to,
                x.from - 6.0,
                py + 4.0
            ));
            let tv = x.tick(i);
            let px = x.map(tv);
            let label = chrono::DateTime::from_timestamp(tv as i64, 0)
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            svg.push_str(&format!(
                "<line x1=\"{px:.1}\" y1=\"{:.1}\" x2=\"{px:.1}\" y2=\"{:.1}\" stroke=\"#e5e5e5\"/>\
                 <text x=\"{px:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"end\" \
                 transform=\"rotate(-45 {px:.1} {:.1})\">{label}</text>\n",
                y.to,
                y.from,
                y.from + 16.0,
                y.from + 16.0
            ));
        }

        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\">Date of Price Check</text>\n\
             <text x=\"18\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\" \
             transform=\"rotate(-90 18 {:.1})\">Price ({})</text>\n",
            (x.from + x.to) / 2.0,
            h - 12.0,
            (y.from + y.to) / 2.0,
            (y.from + y.to) / 2.0,
            escape_html(&self.currency)
        ));

        for (idx, series) in chart.series.iter().enumerate() {
            let color = PALETTE[idx % PALETTE.len()];
            let coords: Vec<(f64, f64)> = series
                .points
                .iter()
                .map(|p| {
                    (
                        x.map(p.check_time.timestamp() as f64),
                        y.map(p.price.to_f64().unwrap_or(0.0)),
                    )
                })
                .collect();
            let path: Vec<String> = coords
                .iter()
                .map(|(cx, cy)| format!("{cx:.1},{cy:.1}"))
                .collect();
            svg.push_str(&format!(
                "<polyline fill=\"none\" stroke=\"{color}\" stroke-width=\"2\" points=\"{}\"/>\n",
                path.join(" ")
            ));
            for (cx, cy) in &coords {
                svg.push_str(&format!(
                    "<circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"3.5\" fill=\"{color}\"/>\n"
                ));
            }
            let ly = MARGIN_TOP + 18.0 * idx as f64;
            svg.push_str(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{color}\"/>\
                 <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{}</text>\n",
                x.to + 20.0,
                ly - 10.0,
                x.to + 38.0,
                ly,
                escape_html(&series.label)
            ));
        }
        svg.push_str("</svg>\n");

        Ok(ChartImage {
            bytes: svg.into_bytes(),
            content_type: "image/svg+xml".to_string(),
        })
    }
}
