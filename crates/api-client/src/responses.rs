use chrono::{DateTime, NaiveDate};
use core_types::PricePoint;
use serde::Deserialize;

// Yahoo's `/v8/finance/chart` payload. Only the fields we read are modelled;
// everything else in the response is ignored by serde.

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartData>>,
    pub error: Option<ApiErrorResponse>,
}

/// Represents an error object returned by the chart API (e.g. an unknown symbol).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub meta: Option<ChartMeta>,
    // Absent when the requested range contains no bars.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    /// Offset of the exchange's timezone from UTC, in seconds.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteIndicator>,
    pub adjclose: Option<Vec<AdjCloseIndicator>>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteIndicator {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct AdjCloseIndicator {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartData {
    /// Extracts (date, price) pairs, preferring the adjusted close.
    ///
    /// Bars with a missing price are skipped. Timestamps are shifted into the
    /// exchange's local time before taking the calendar date, and when two bars
    /// fall on the same date the later one wins.
    pub fn price_points(&self) -> Vec<PricePoint> {
        let offset = self.meta.as_ref().map_or(0, |m| m.gmtoffset);

        let prices: &[Option<f64>] = match self.indicators.adjclose.as_ref().and_then(|a| a.first()) {
            Some(adj) => adj.adjclose.as_slice(),
            None => self
                .indicators
                .quote
                .first()
                .map(|q| q.close.as_slice())
                .unwrap_or(&[]),
        };

        let mut points: Vec<PricePoint> = Vec::with_capacity(self.timestamp.len());
        for (ts, price) in self.timestamp.iter().zip(prices) {
            let (Some(price), Some(date)) = (*price, local_date(*ts, offset)) else {
                continue;
            };
            if !price.is_finite() {
                continue;
            }
            match points.last_mut() {
                Some(last) if last.date == date => last.price = price,
                _ => points.push(PricePoint::new(date, price)),
            }
        }

        points
    }
}

fn local_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp + gmtoffset, 0).map(|dt| dt.date_naive())
}
