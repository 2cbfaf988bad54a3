use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    InsufficientData(String),

    #[error("Sharpe ratio is undefined: annualised volatility is zero")]
    ZeroVolatility,

    #[error("{0} is not a finite number; the price moves are too large to annualise")]
    NonFinite(&'static str),
}
