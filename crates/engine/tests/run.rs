//! End-to-end runs of the engine against an in-memory price provider.

use analytics::AnalyticsError;
use api_client::{FetchError, PriceProvider};
use async_trait::async_trait;
use chrono::NaiveDate;
use configuration::{AnalysisConfig, Calendar};
use core_types::{PricePoint, PriceSeries};
use engine::{Engine, EngineError};
use std::collections::HashMap;
use std::sync::Mutex;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

/// Serves canned prices; symbols it does not know fail like an unknown ticker.
#[derive(Default)]
struct StubProvider {
    prices: HashMap<String, Vec<(u32, f64)>>,
    calls: Mutex<Vec<String>>,
}

impl StubProvider {
    fn with(mut self, symbol: &str, prices: &[(u32, f64)]) -> Self {
        self.prices.insert(symbol.to_string(), prices.to_vec());
        self
    }
}

#[async_trait]
impl PriceProvider for StubProvider {
    async fn fetch_prices(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<PriceSeries, FetchError> {
        self.calls.lock().unwrap().push(symbol.to_string());

        let prices = self.prices.get(symbol).ok_or_else(|| FetchError::Api {
            code: "Not Found".to_string(),
            description: format!("No data found for {symbol}"),
        })?;
        let points = prices
            .iter()
            .map(|(d, p)| PricePoint::new(day(*d), *p))
            .collect();
        Ok(PriceSeries::new(symbol, points)?)
    }
}

fn analysis(symbols: &[&str]) -> AnalysisConfig {
    AnalysisConfig {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        start_date: day(1),
        end_date: day(31),
        ..AnalysisConfig::default()
    }
}

const SPY: &[(u32, f64)] = &[(2, 100.0), (3, 110.0), (4, 99.0), (5, 101.0)];
const QQQ: &[(u32, f64)] = &[(2, 400.0), (3, 404.0), (4, 398.0), (5, 410.0)];

#[tokio::test]
async fn failed_fetch_is_skipped_and_others_complete() {
    let provider = StubProvider::default().with("SPY", SPY).with("QQQ", QQQ);
    let engine = Engine::new(provider, analysis(&["SPY", "NOPE", "QQQ"]));

    let outcome = engine.run().await;

    assert_eq!(outcome.table.len(), 2);
    assert!(outcome.table.contains("SPY"));
    assert!(outcome.table.contains("QQQ"));
    assert!(!outcome.table.contains("NOPE"));
    assert!(!outcome.is_total_failure());

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].symbol, "NOPE");
    assert!(matches!(outcome.failures[0].error, EngineError::Fetch(FetchError::Api { .. })));
}

#[tokio::test]
async fn single_point_series_is_excluded() {
    let provider = StubProvider::default().with("SPY", SPY).with("EEM", &[(2, 40.0)]);
    let engine = Engine::new(provider, analysis(&["SPY", "EEM"]));

    let outcome = engine.run().await;

    assert_eq!(outcome.table.symbols().collect::<Vec<_>>(), vec!["SPY"]);
    assert_eq!(outcome.failures.len(), 1);
    assert!(matches!(
        outcome.failures[0].error,
        EngineError::Analytics(AnalyticsError::InsufficientData(_))
    ));
}

#[tokio::test]
async fn flat_series_is_excluded_with_zero_volatility() {
    let provider = StubProvider::default()
        .with("SPY", SPY)
        .with("CASH", &[(2, 1.0), (3, 1.0), (4, 1.0)]);
    let engine = Engine::new(provider, analysis(&["CASH", "SPY"]));

    let outcome = engine.run().await;

    assert!(outcome.table.contains("SPY"));
    assert!(matches!(
        outcome.failures[0].error,
        EngineError::Analytics(AnalyticsError::ZeroVolatility)
    ));
}

#[tokio::test]
async fn every_symbol_failing_is_total_failure() {
    let engine = Engine::new(StubProvider::default(), analysis(&["A", "B"]));

    let outcome = engine.run().await;

    assert!(outcome.is_total_failure());
    assert_eq!(outcome.failures.len(), 2);
}

#[tokio::test]
async fn symbols_are_fetched_in_order_once() {
    let provider = StubProvider::default().with("SPY", SPY).with("QQQ", QQQ);
    let engine = Engine::new(provider, analysis(&["QQQ", " SPY ", "QQQ", ""]));

    let outcome = engine.run().await;

    assert_eq!(outcome.table.len(), 2);
    assert!(outcome.failures.is_empty());
    assert_eq!(*engine.provider().calls.lock().unwrap(), vec!["QQQ", "SPY"]);
}

#[tokio::test]
async fn three_point_scenario_curve() {
    let provider = StubProvider::default().with("SPY", &[(2, 100.0), (3, 110.0), (4, 99.0)]);
    let engine = Engine::new(provider, analysis(&["SPY"]));

    let outcome = engine.run().await;
    let record = outcome.table.get("SPY").unwrap();

    let values: Vec<f64> = record.cumulative_returns.iter().map(|(_, v)| *v).collect();
    for (got, want) in values.iter().zip([1.0, 1.10, 0.99]) {
        assert!((got - want).abs() < 1e-12);
    }
    assert_eq!(record.cumulative_returns[0], (day(2), 1.0));
    assert_eq!(record.observations, 2);
}

#[tokio::test]
async fn common_calendar_aligns_dates() {
    // VUKE.L trades on day 2 while SPY does not; SPY trades on day 5 while VUKE.L does not.
    let provider = StubProvider::default()
        .with("SPY", &[(3, 100.0), (4, 102.0), (5, 101.0), (8, 103.0)])
        .with("VUKE.L", &[(2, 30.0), (3, 30.3), (4, 30.1), (8, 30.6)]);
    let mut config = analysis(&["SPY", "VUKE.L"]);
    config.calendar = Calendar::Common;

    let outcome = Engine::new(provider, config).run().await;

    let spy = outcome.table.get("SPY").unwrap();
    let vuke = outcome.table.get("VUKE.L").unwrap();
    let dates = |r: &analytics::MetricsRecord| -> Vec<NaiveDate> {
        r.cumulative_returns.iter().map(|(d, _)| *d).collect()
    };
    assert_eq!(dates(spy), vec![day(3), day(4), day(8)]);
    assert_eq!(dates(spy), dates(vuke));
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let provider = StubProvider::default().with("SPY", SPY).with("QQQ", QQQ);
    let engine = Engine::new(provider, analysis(&["SPY", "QQQ"]));

    let first = engine.run().await;
    let second = engine.run().await;

    assert_eq!(first.table, second.table);
}
