//! Price -> color mapping used to tint price tags.
//!
//! Prices at or below the lower bound are cheap, prices above the upper bound
//! are expensive, and everything between is placed on a three-stop ramp
//! (light green -> yellow -> orange).

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{FareError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Lowercase `#rrggbb` form.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn lerp(self, to: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| -> u8 {
            let v = a as f64 + (b as f64 - a as f64) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb(mix(self.0, to.0), mix(self.1, to.1), mix(self.2, to.2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

pub const CHEAP: Rgb = Rgb(0x90, 0xee, 0x90);
pub const RAMP_MID: Rgb = Rgb(0xff, 0xff, 0x00);
pub const RAMP_HIGH: Rgb = Rgb(0xff, 0xa5, 0x00);
pub const EXPENSIVE: Rgb = Rgb(0xf0, 0x80, 0x80);

/// Position of a price on the heat scale. Variants order from coolest to hottest.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Heat {
    Cheap,
    /// Ramp position in `(0, 1]`.
    Ramp(f64),
    Expensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapScale {
    min_price: Decimal,
    max_price: Decimal,
}

impl HeatmapScale {
    pub fn new(min_price: Decimal, max_price: Decimal) -> Result<Self> {
        if min_price > max_price {
            return Err(FareError::InvalidArgument(format!(
                "heatmap lower bound {} exceeds upper bound {}",
                min_price, max_price
            )));
        }
        Ok(Self {
            min_price,
            max_price,
        })
    }

    pub fn min_price(&self) -> Decimal {
        self.min_price
    }

    pub fn max_price(&self) -> Decimal {
        self.max_price
    }

    pub fn heat(&self, price: Decimal) -> Heat {
        if price <= self.min_price {
            return Heat::Cheap;
        }
        if price > self.max_price {
            return Heat::Expensive;
        }
        // min < price <= max, so the span is non-zero here.
        let t = (price - self.min_price) / (self.max_price - self.min_price);
        Heat::Ramp(t.to_f64().unwrap_or(1.0).clamp(0.0, 1.0))
    }

    pub fn color(&self, price: Decimal) -> Rgb {
        match self.heat(price) {
            Heat::Cheap => CHEAP,
            Heat::Expensive => EXPENSIVE,
            Heat::Ramp(t) if t <= 0.5 => CHEAP.lerp(RAMP_MID, t / 0.5),
            Heat::Ramp(t) => RAMP_MID.lerp(RAMP_HIGH, (t - 0.5) / 0.5),
        }
    }
}
