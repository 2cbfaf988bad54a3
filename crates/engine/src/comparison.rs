use crate::error::EngineError;
use analytics::MetricsRecord;
use std::collections::BTreeMap;

/// Symbol -> metrics, filled once per symbol and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonTable {
    records: BTreeMap<String, MetricsRecord>,
}

impl ComparisonTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record. A symbol that is already present is rejected and the
    /// existing entry is left untouched.
    pub fn insert(&mut self, record: MetricsRecord) -> Result<(), EngineError> {
        if self.records.contains_key(&record.symbol) {
            return Err(EngineError::DuplicateSymbol(record.symbol));
        }
        self.records.insert(record.symbol.clone(), record);
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Option<&MetricsRecord> {
        self.records.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.records.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Records in symbol order.
    pub fn records(&self) -> impl Iterator<Item = &MetricsRecord> {
        self.records.values()
    }
}

/// A symbol that was skipped, and why.
#[derive(Debug)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: EngineError,
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub table: ComparisonTable,
    pub failures: Vec<SymbolFailure>,
}

impl RunOutcome {
    /// True when not a single symbol made it into the table.
    pub fn is_total_failure(&self) -> bool {
        self.table.is_empty()
    }

    pub(crate) fn fail(&mut self, symbol: &str, error: EngineError) {
        tracing::warn!(%symbol, %error, "Skipping symbol");
        self.failures.push(SymbolFailure {
            symbol: symbol.to_string(),
            error,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(symbol: &str, sharpe: f64) -> MetricsRecord {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        MetricsRecord {
            symbol: symbol.to_string(),
            annualised_return: 0.1,
            annualised_volatility: 0.2,
            sharpe_ratio: sharpe,
            observations: 1,
            first_date: date,
            last_date: date,
            cumulative_returns: vec![(date, 1.0)],
        }
    }

    #[test]
    fn insert_never_overwrites() {
        let mut table = ComparisonTable::new();
        table.insert(record("SPY", 0.4)).unwrap();

        let err = table.insert(record("SPY", 9.9)).unwrap_err();

        assert!(matches!(err, EngineError::DuplicateSymbol(ref s) if s == "SPY"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("SPY").unwrap().sharpe_ratio, 0.4);
    }

    #[test]
    fn records_are_ordered_by_symbol() {
        let mut table = ComparisonTable::new();
        table.insert(record("QQQ", 0.1)).unwrap();
        table.insert(record("EEM", 0.2)).unwrap();
        table.insert(record("SPY", 0.3)).unwrap();

        assert_eq!(table.symbols().collect::<Vec<_>>(), vec!["EEM", "QQQ", "SPY"]);
        assert!(table.contains("QQQ"));
        assert!(!table.contains("VUKE.L"));
    }

    #[test]
    fn empty_outcome_is_total_failure() {
        let mut outcome = RunOutcome::default();
        assert!(outcome.is_total_failure());

        outcome.table.insert(record("SPY", 0.4)).unwrap();
        assert!(!outcome.is_total_failure());
    }
}
