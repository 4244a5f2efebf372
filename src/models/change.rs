use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Route;

// ---------------------------------------------------------------------------
// PriceChange — A new fare, or a fare that moved since the previous run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChange {
    pub route: Route,
    pub flight_date_time: NaiveDateTime,
    pub previous_price: Option<Decimal>,
    pub current_price: Decimal,
    pub is_new: bool,
}
