use analytics::MetricsRecord;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};

/// Builds the per-symbol risk/return summary, rounded to three decimals.
pub fn summary_table<'a>(records: impl IntoIterator<Item = &'a MetricsRecord>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Symbol", "Annual Return", "Volatility", "Sharpe Ratio", "From", "To"]);

    for record in records {
        table.add_row(vec![
            Cell::new(&record.symbol),
            Cell::new(format!("{:.3}", record.annualised_return)),
            Cell::new(format!("{:.3}", record.annualised_volatility)),
            Cell::new(format!("{:.3}", record.sharpe_ratio)),
            Cell::new(record.first_date),
            Cell::new(record.last_date),
        ]);
    }

    for index in 1..=3 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(symbol: &str, ret: f64, vol: f64, sharpe: f64) -> MetricsRecord {
        let first = NaiveDate::from_ymd_opt(2018, 1, 2).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        MetricsRecord {
            symbol: symbol.to_string(),
            annualised_return: ret,
            annualised_volatility: vol,
            sharpe_ratio: sharpe,
            observations: 1760,
            first_date: first,
            last_date: last,
            cumulative_returns: vec![(first, 1.0), (last, 2.0)],
        }
    }

    #[test]
    fn rows_are_rounded_to_three_decimals() {
        let records = [record("SPY", 0.12345, 0.19876, 0.5206), record("EEM", -0.0104, 0.2049, -0.1483)];
        let rendered = summary_table(&records).to_string();

        assert!(rendered.contains("Annual Return"));
        assert!(rendered.contains("SPY"));
        assert!(rendered.contains("0.123"));
        assert!(rendered.contains("0.199"));
        assert!(rendered.contains("0.521"));
        assert!(rendered.contains("-0.010"));
        assert!(rendered.contains("2024-12-31"));
        assert_eq!(summary_table(&records).row_iter().count(), 2);
    }
}
