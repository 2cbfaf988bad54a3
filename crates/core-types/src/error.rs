use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid price {price} for {symbol} on {date}")]
    InvalidPrice {
        symbol: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("Price dates for {symbol} are not strictly increasing at {date}")]
    UnorderedDates { symbol: String, date: NaiveDate },
}
