//! SendGrid v3 mail API notifier.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::json;
use tracing::{info, warn};

use crate::config;
use crate::error::{FareError, Result};
use crate::notify::{Delivery, Notifier};

#[derive(Debug, Clone)]
struct Credentials {
    api_key: String,
    to: String,
    from: String,
}

/// Sends HTML email through SendGrid.
///
/// Without an API key and both addresses the notifier stays disabled and
/// every send is skipped.
pub struct SendGridNotifier {
    credentials: Option<Credentials>,
    endpoint: String,
    client: Client,
}

impl SendGridNotifier {
    pub fn new(
        api_key: Option<String>,
        to: Option<String>,
        from: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let credentials = match (api_key, to, from) {
            (Some(api_key), Some(to), Some(from))
                if !api_key.is_empty() && !to.is_empty() && !from.is_empty() =>
            {
                Some(Credentials { api_key, to, from })
            }
            _ => None,
        };
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            credentials,
            endpoint: config::SENDGRID_URL.to_string(),
            client,
        })
    }

    /// Read `SENDGRID_API_KEY`, `EMAIL_TO` and `EMAIL_FROM`.
    pub fn from_env(timeout: Duration) -> Result<Self> {
        Self::new(
            std::env::var("SENDGRID_API_KEY").ok(),
            std::env::var("EMAIL_TO").ok(),
            std::env::var("EMAIL_FROM").ok(),
            timeout,
        )
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

impl Notifier for SendGridNotifier {
    fn send(&self, subject: &str, html_body: &str) -> Result<Delivery> {
        let Some(creds) = &self.credentials else {
            warn!(subject, "email credentials not configured, skipping email");
            return Ok(Delivery::Skipped);
        };
        let payload = json!({
            "personalizations": [{ "to": [{ "email": creds.to }] }],
            "from": { "email": creds.from },
            "subject": subject,
            "content": [{ "type": "text/html", "value": html_body }],
        });
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&creds.api_key)
            .json(&payload)
            .send()
            .map_err(|e| FareError::Notification(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FareError::Notification(format!(
                "SendGrid responded with status {}",
                status
            )));
        }
        info!(subject, status = status.as_u16(), "email sent");
        Ok(Delivery::Sent)
    }
}
