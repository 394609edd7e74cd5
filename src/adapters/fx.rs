//! Live USD→EUR rate source.
//!
//! Tries a chain of free providers in order and returns the first positive
//! rate; a provider that errors, times out or answers garbage is skipped.
//! When the whole chain declines, callers fall back to [`DEFAULT_USD_EUR`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::ports::{RateQuote, RateSource};

/// Fallback rate when no provider is reachable.
pub const DEFAULT_USD_EUR: f64 = 0.92;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Debug, Clone)]
pub struct LiveRates {
    client: Client,
    providers: Vec<(String, String)>,
}

impl LiveRates {
    pub fn new() -> Self {
        Self::with_providers(vec![
            (
                "exchangerate.host".to_string(),
                "https://api.exchangerate.host/latest?base=USD&symbols=EUR".to_string(),
            ),
            (
                "open.er-api.com".to_string(),
                "https://open.er-api.com/v6/latest/USD".to_string(),
            ),
            (
                "frankfurter.app".to_string(),
                "https://api.frankfurter.app/latest?from=USD&to=EUR".to_string(),
            ),
        ])
    }

    /// Custom provider chain as `(label, url)` pairs; every provider is
    /// expected to answer `{"rates": {"EUR": <rate>}}`.
    pub fn with_providers(providers: Vec<(String, String)>) -> Self {
        let client = Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, providers }
    }

    async fn try_provider(&self, url: &str) -> Option<f64> {
        let response = self.client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body: serde_json::Value = response.json().await.ok()?;
        let rate = body.get("rates")?.get("EUR")?.as_f64()?;
        (rate > 0.0).then_some(rate)
    }
}

impl Default for LiveRates {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateSource for LiveRates {
    async fn usd_eur(&self) -> Option<RateQuote> {
        for (name, url) in &self.providers {
            match self.try_provider(url).await {
                Some(rate) => {
                    tracing::debug!("USD→EUR {} from {}", rate, name);
                    return Some(RateQuote {
                        rate,
                        source: name.clone(),
                    });
                }
                None => tracing::debug!("rate provider {} declined", name),
            }
        }
        None
    }
}

/// Fixed rate for offline runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedRate(pub f64);

#[async_trait]
impl RateSource for FixedRate {
    async fn usd_eur(&self) -> Option<RateQuote> {
        Some(RateQuote {
            rate: self.0,
            source: "fixed".to_string(),
        })
    }
}
