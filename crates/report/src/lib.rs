//! Output side of a run: the cumulative-return chart and the console summary.

pub mod chart;
pub mod error;
pub mod table;

pub use chart::{ChartSeries, ReportRenderer, SvgChartRenderer};
pub use error::RenderError;
pub use table::summary_table;
