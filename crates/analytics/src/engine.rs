use crate::error::AnalyticsError;
use crate::report::MetricsRecord;
use chrono::NaiveDate;
use configuration::AnalysisConfig;
use core_types::{PriceSeries, ReturnSeries};

/// A stateless calculator for deriving risk/return metrics from a price history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricEngine {
    periods_per_year: u32,
    risk_free_rate: f64,
}

impl MetricEngine {
    pub fn new(periods_per_year: u32, risk_free_rate: f64) -> Self {
        Self {
            periods_per_year,
            risk_free_rate,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.periods_per_year, config.risk_free_rate)
    }

    /// The main entry point for calculating metrics.
    ///
    /// # Arguments
    ///
    /// * `series` - The validated price history of one symbol.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `MetricsRecord` or an `AnalyticsError`.
    pub fn evaluate(&self, series: &PriceSeries) -> Result<MetricsRecord, AnalyticsError> {
        let returns = compute_returns(series)?;

        let ann_return = annualised_return(&returns, self.periods_per_year)?;
        let ann_volatility = annualised_volatility(&returns, self.periods_per_year)?;
        let sharpe = sharpe_ratio(ann_return, ann_volatility, self.risk_free_rate)?;

        // compute_returns guarantees at least two points.
        let (first_date, last_date) = match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(insufficient(series.symbol(), series.len())),
        };

        tracing::debug!(
            symbol = series.symbol(),
            ann_return,
            ann_volatility,
            sharpe,
            "Metrics computed"
        );

        Ok(MetricsRecord {
            symbol: series.symbol().to_string(),
            annualised_return: ann_return,
            annualised_volatility: ann_volatility,
            sharpe_ratio: sharpe,
            observations: returns.len(),
            first_date,
            last_date,
            cumulative_returns: cumulative_return(first_date, &returns),
        })
    }
}

fn insufficient(symbol: &str, points: usize) -> AnalyticsError {
    AnalyticsError::InsufficientData(format!(
        "{} has {} price point(s), at least 2 are required",
        symbol, points
    ))
}

/// Simple period returns `p[i] / p[i-1] - 1`, one fewer than the input.
pub fn compute_returns(series: &PriceSeries) -> Result<ReturnSeries, AnalyticsError> {
    if series.len() < 2 {
        return Err(insufficient(series.symbol(), series.len()));
    }

    Ok(series
        .points()
        .windows(2)
        .map(|w| (w[1].date, w[1].price / w[0].price - 1.0))
        .collect())
}

/// Geometric annualised return: `(Π(1 + r))^(periods_per_year / n) - 1`.
///
/// A cumulative loss of 100% or more annualises to -1.0.
pub fn annualised_return(
    returns: &[(NaiveDate, f64)],
    periods_per_year: u32,
) -> Result<f64, AnalyticsError> {
    if returns.is_empty() {
        return Err(AnalyticsError::InsufficientData(
            "annualised return needs at least one period return".to_string(),
        ));
    }

    let growth: f64 = returns.iter().map(|(_, r)| 1.0 + r).product();
    if growth <= 0.0 {
        return Ok(-1.0);
    }

    let exponent = f64::from(periods_per_year) / returns.len() as f64;
    let ann_return = growth.powf(exponent) - 1.0;
    if !ann_return.is_finite() {
        return Err(AnalyticsError::NonFinite("annualised return"));
    }
    Ok(ann_return)
}

/// Sample standard deviation (n - 1) of the returns scaled by `sqrt(periods_per_year)`.
pub fn annualised_volatility(
    returns: &[(NaiveDate, f64)],
    periods_per_year: u32,
) -> Result<f64, AnalyticsError> {
    let n = returns.len();
    if n < 2 {
        return Err(AnalyticsError::InsufficientData(format!(
            "sample volatility needs at least 2 period returns, got {}",
            n
        )));
    }

    // Exact zero for a constant series; summing identical values would
    // otherwise leave rounding noise in the mean.
    let first = returns[0].1;
    if returns.iter().all(|(_, r)| *r == first) {
        return Ok(0.0);
    }

    let mean = returns.iter().map(|(_, r)| r).sum::<f64>() / n as f64;
    let variance = returns
        .iter()
        .map(|(_, r)| (r - mean) * (r - mean))
        .sum::<f64>()
        / (n - 1) as f64;

    Ok(variance.sqrt() * f64::from(periods_per_year).sqrt())
}

/// Excess return per unit of volatility.
///
/// Zero volatility has no meaningful ratio and is reported as
/// `AnalyticsError::ZeroVolatility` rather than an infinite or NaN value.
pub fn sharpe_ratio(
    ann_return: f64,
    ann_volatility: f64,
    risk_free_rate: f64,
) -> Result<f64, AnalyticsError> {
    if !ann_volatility.is_finite() || ann_volatility <= 0.0 {
        return Err(AnalyticsError::ZeroVolatility);
    }
    let sharpe = (ann_return - risk_free_rate) / ann_volatility;
    if !sharpe.is_finite() {
        return Err(AnalyticsError::NonFinite("Sharpe ratio"));
    }
    Ok(sharpe)
}

/// Running product of `(1 + r)`, led by 1.0 at `start`.
///
/// The output has one value per price observation: `start` is the first
/// price date and every following value carries its return's date.
pub fn cumulative_return(start: NaiveDate, returns: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    let mut curve = Vec::with_capacity(returns.len() + 1);
    curve.push((start, 1.0));

    let mut growth = 1.0;
    for (date, r) in returns {
        growth *= 1.0 + r;
        curve.push((*date, growth));
    }

    curve
}
