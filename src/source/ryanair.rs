//! Ryanair cheapest one-way fare lookups.

use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config;
use crate::error::{FareError, Result};
use crate::models::{Observation, Route};
use crate::source::{FareQuery, PriceSource};

#[derive(Debug, Deserialize)]
struct FaresResponse {
    #[serde(default)]
    fares: Vec<Fare>,
}

#[derive(Debug, Deserialize)]
struct Fare {
    outbound: Leg,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Leg {
    departure_airport: Airport,
    arrival_airport: Airport,
    departure_date: NaiveDateTime,
    price: Option<FarePrice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Airport {
    iata_code: String,
}

#[derive(Debug, Deserialize)]
struct FarePrice {
    value: Decimal,
}

/// Queries the public Ryanair fare finder for the cheapest fare per day.
pub struct RyanairSource {
    client: Client,
    base: String,
    currency: String,
}

impl RyanairSource {
    pub fn new(currency: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            base: config::FARE_API_BASE.to_string(),
            currency: currency.into(),
        })
    }

    /// Point the source at a different API host.
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base = base.into().trim_end_matches('/').to_string();
        self
    }
}

impl PriceSource for RyanairSource {
    fn fetch_prices(&self, query: &FareQuery) -> Result<Vec<Observation>> {
        let url = format!("{}/oneWayFares", self.base);
        let date_from = query.date_from.format("%Y-%m-%d").to_string();
        let date_to = query.date_to.format("%Y-%m-%d").to_string();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("departureAirportIataCode", query.route.origin.as_str()),
                ("arrivalAirportIataCode", query.route.destination.as_str()),
                ("outboundDepartureDateFrom", date_from.as_str()),
                ("outboundDepartureDateTo", date_to.as_str()),
                ("currency", self.currency.as_str()),
                ("adultPaxCount", "1"),
                ("outboundDepartureTimeFrom", "00:00"),
                ("outboundDepartureTimeTo", "23:59"),
            ])
            .send()
            .map_err(|e| FareError::SourceUnavailable(e.to_string()))?;

        let resp = resp
            .error_for_status()
            .map_err(|e| FareError::SourceUnavailable(e.to_string()))?;
        parse_fares(&resp.bytes()?)
    }
}

/// Decode a `oneWayFares` response body. Fares without a price are dropped.
pub fn parse_fares(body: &[u8]) -> Result<Vec<Observation>> {
    let body: FaresResponse = serde_json::from_slice(body)?;
    Ok(body
        .fares
        .into_iter()
        .filter_map(|fare| {
            let leg = fare.outbound;
            let price = leg.price?.value;
            Some(Observation::new(
                Route::new(leg.departure_airport.iata_code, leg.arrival_airport.iata_code),
                leg.departure_date,
                price,
            ))
        })
        .collect())
}
