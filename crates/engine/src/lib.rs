use analytics::MetricEngine;
use api_client::PriceProvider;
use chrono::NaiveDate;
use configuration::{AnalysisConfig, Calendar};
use core_types::PriceSeries;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;

pub mod comparison;
pub mod error;

pub use comparison::{ComparisonTable, RunOutcome, SymbolFailure};
pub use error::EngineError;

/// Drives one analysis run: fetch -> compute -> collect, one symbol at a time.
///
/// Every per-symbol failure is recorded in the `RunOutcome` and the run moves
/// on to the next symbol; nothing here aborts the whole run.
pub struct Engine<P> {
    provider: P,
    metrics: MetricEngine,
    analysis: AnalysisConfig,
}

impl<P: PriceProvider> Engine<P> {
    pub fn new(provider: P, analysis: AnalysisConfig) -> Self {
        Self {
            provider,
            metrics: MetricEngine::from_config(&analysis),
            analysis,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn run(&self) -> RunOutcome {
        let symbols = self.unique_symbols();
        let mut outcome = RunOutcome::default();

        tracing::info!(
            symbols = symbols.len(),
            start = %self.analysis.start_date,
            end = %self.analysis.end_date,
            calendar = ?self.analysis.calendar,
            "Starting analysis run"
        );

        let progress = ProgressBar::new(symbols.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut fetched = Vec::new();
        for symbol in &symbols {
            progress.set_message(format!("Fetching {}...", symbol));

            match self.fetch(symbol).await {
                Ok(series) if self.analysis.calendar == Calendar::Own => {
                    self.evaluate_into(&series, &mut outcome);
                }
                Ok(series) => fetched.push(series),
                Err(e) => outcome.fail(symbol, e),
            }

            progress.inc(1);
        }

        if !fetched.is_empty() {
            let common = common_dates(&fetched);
            tracing::info!(dates = common.len(), "Aligned series to the common calendar");
            for series in &fetched {
                self.evaluate_into(&series.restrict_to(&common), &mut outcome);
            }
        }

        progress.finish_and_clear();
        tracing::info!(
            succeeded = outcome.table.len(),
            skipped = outcome.failures.len(),
            "Analysis run finished"
        );

        outcome
    }

    async fn fetch(&self, symbol: &str) -> Result<PriceSeries, EngineError> {
        let series = self
            .provider
            .fetch_prices(symbol, self.analysis.start_date, self.analysis.end_date)
            .await?;
        tracing::debug!(%symbol, points = series.len(), "Fetched price series");
        Ok(series)
    }

    fn evaluate_into(&self, series: &PriceSeries, outcome: &mut RunOutcome) {
        let result = self
            .metrics
            .evaluate(series)
            .map_err(EngineError::from)
            .and_then(|record| outcome.table.insert(record));

        if let Err(e) = result {
            outcome.fail(series.symbol(), e);
        }
    }

    /// Configured symbols, trimmed, in order, with blanks and repeats dropped.
    fn unique_symbols(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut symbols = Vec::new();
        for raw in &self.analysis.symbols {
            let symbol = raw.trim();
            if symbol.is_empty() {
                continue;
            }
            if !seen.insert(symbol.to_string()) {
                tracing::warn!(%symbol, "Symbol listed more than once, ignoring the repeat");
                continue;
            }
            symbols.push(symbol.to_string());
        }
        symbols
    }
}

/// Dates on which every series has an observation.
fn common_dates(series: &[PriceSeries]) -> BTreeSet<NaiveDate> {
    let mut iter = series.iter();
    let Some(first) = iter.next() else {
        return BTreeSet::new();
    };

    let mut common: BTreeSet<NaiveDate> = first.dates().collect();
    for s in iter {
        let dates: BTreeSet<NaiveDate> = s.dates().collect();
        common.retain(|d| dates.contains(d));
    }
    common
}
