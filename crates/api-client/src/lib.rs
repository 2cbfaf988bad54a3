use crate::responses::ChartResponse;
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use configuration::ProviderConfig;
use core_types::PriceSeries;
use std::time::Duration;

pub mod error;
pub mod responses;

// --- Public API ---
pub use error::FetchError;
pub use responses::ApiErrorResponse;

/// The abstract source of historical prices.
///
/// The engine only talks to this trait, so a live client and an in-memory
/// stand-in used by tests are interchangeable.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetches the daily adjusted-close series for `symbol` between `start`
    /// and `end`, both inclusive.
    async fn fetch_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, FetchError>;
}

/// A concrete implementation of the `PriceProvider` for the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Converts the inclusive date range into the `period1`/`period2` unix
    /// timestamps the API expects. `period2` is midnight after `end`.
    fn period_bounds(start: NaiveDate, end: NaiveDate) -> Result<(i64, i64), FetchError> {
        if start > end {
            return Err(FetchError::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        let after_end = end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| FetchError::InvalidRange(format!("end date {} is out of range", end)))?;

        Ok((
            start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp(),
            after_end.and_time(chrono::NaiveTime::MIN).and_utc().timestamp(),
        ))
    }
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn fetch_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, FetchError> {
        let (period1, period2) = Self::period_bounds(start, end)?;
        let url = format!("{}/{}", self.base_url, symbol);

        tracing::debug!(%symbol, %start, %end, "Requesting chart data");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("includeAdjustedClose", "true".to_string()),
                ("events", "div,splits".to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        // Unknown symbols come back as a 404 that still carries a JSON error
        // object, so try to decode the body before looking at the status.
        let chart = match serde_json::from_str::<ChartResponse>(&text) {
            Ok(parsed) => parsed.chart,
            Err(_) if !status.is_success() => return Err(FetchError::Status(status.as_u16())),
            Err(e) => return Err(FetchError::Deserialization(e.to_string())),
        };

        if let Some(error) = chart.error {
            return Err(FetchError::Api {
                code: error.code,
                description: error.description,
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let points = chart
            .result
            .as_ref()
            .and_then(|results| results.first())
            .map(|data| data.price_points())
            .unwrap_or_default();

        if points.is_empty() {
            return Err(FetchError::EmptyRange {
                symbol: symbol.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let series = PriceSeries::new(symbol, points)?;
        tracing::debug!(%symbol, points = series.len(), "Chart data received");

        Ok(series)
    }
}
