//! # Risk/Return Metric Engine
//!
//! Turns a validated `PriceSeries` into a `MetricsRecord`: annualised return,
//! annualised volatility, Sharpe ratio and the cumulative-return curve.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of external systems. It depends
//!   only on `core-types` and the analysis settings from `configuration`.
//! - **Stateless Calculation:** The `MetricEngine` holds two constants and nothing
//!   else, so evaluating the same series twice yields bit-identical records.
//! - **No silent NaN:** degenerate inputs surface as `AnalyticsError` variants
//!   instead of NaN or infinite values.
//!
//! ## Public API
//!
//! - `MetricEngine`: runs the whole pipeline for one series.
//! - The individual steps (`compute_returns`, `annualised_return`, ...) are
//!   exposed as free functions.
//! - `MetricsRecord`: the per-symbol result.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{
    annualised_return, annualised_volatility, compute_returns, cumulative_return, sharpe_ratio,
    MetricEngine,
};
pub use error::AnalyticsError;
pub use report::MetricsRecord;
