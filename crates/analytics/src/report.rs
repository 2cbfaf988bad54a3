use chrono::NaiveDate;
use serde::Serialize;

/// The risk/return summary for one symbol.
///
/// This struct is the final output of the `MetricEngine`. The cumulative curve
/// has one value per price observation and starts at exactly 1.0 on the first
/// price date, so curves of different symbols line up on the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRecord {
    pub symbol: String,
    pub annualised_return: f64,
    pub annualised_volatility: f64,
    pub sharpe_ratio: f64,
    /// Number of period returns the statistics were computed from.
    pub observations: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub cumulative_returns: Vec<(NaiveDate, f64)>,
}

impl MetricsRecord {
    /// Growth of one unit over the whole range.
    pub fn total_growth(&self) -> f64 {
        self.cumulative_returns.last().map_or(1.0, |(_, v)| *v)
    }
}
