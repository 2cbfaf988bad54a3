use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single adjusted-close observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Simple period returns, each stamped with the date of the later price of its pair.
pub type ReturnSeries = Vec<(NaiveDate, f64)>;

/// An ordered, validated price history for one symbol.
///
/// Construction guarantees that dates are strictly increasing (no duplicates)
/// and that every price is finite and positive, so downstream calculations
/// never see a NaN or a division by zero coming from the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, CoreError> {
        let symbol = symbol.into();

        for point in &points {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(CoreError::InvalidPrice {
                    symbol,
                    date: point.date,
                    price: point.price,
                });
            }
        }

        if let Some(w) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(CoreError::UnorderedDates {
                symbol,
                date: w[1].date,
            });
        }

        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Keeps only the observations whose date is in `dates`.
    ///
    /// Filtering an ordered series keeps it ordered, so no re-validation is needed.
    pub fn restrict_to(&self, dates: &BTreeSet<NaiveDate>) -> Self {
        Self {
            symbol: self.symbol.clone(),
            points: self
                .points
                .iter()
                .filter(|p| dates.contains(&p.date))
                .copied()
                .collect(),
        }
    }
}
