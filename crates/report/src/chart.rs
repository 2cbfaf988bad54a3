use crate::error::RenderError;
use analytics::MetricsRecord;
use chrono::{Datelike, NaiveDate};
use configuration::OutputConfig;
use std::fs;
use std::path::PathBuf;

// Roughly the 10x6 inch figure of a typical matplotlib chart at 100 dpi.
const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 28.0;
const MARGIN_TOP: f64 = 52.0;
const MARGIN_BOTTOM: f64 = 64.0;
const Y_TICKS: usize = 6;
const GRID_COLOR: &str = "#e0e0e0";
const AXIS_COLOR: &str = "#333333";
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// One labelled line on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl From<&MetricsRecord> for ChartSeries {
    fn from(record: &MetricsRecord) -> Self {
        Self {
            label: record.symbol.clone(),
            points: record.cumulative_returns.clone(),
        }
    }
}

/// Turns a set of dated series into a saved chart artifact.
pub trait ReportRenderer {
    /// Renders every series into one chart and returns the path written.
    fn render(&self, series: &[ChartSeries]) -> Result<PathBuf, RenderError>;
}

/// Writes the cumulative-return comparison as a standalone SVG file.
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    directory: PathBuf,
    file_name: String,
}

impl SvgChartRenderer {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            file_name: config.chart_file.clone(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

impl ReportRenderer for SvgChartRenderer {
    fn render(&self, series: &[ChartSeries]) -> Result<PathBuf, RenderError> {
        let svg = render_svg(series)?;

        fs::create_dir_all(&self.directory).map_err(|source| RenderError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let path = self.path();
        fs::write(&path, svg).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), series = series.len(), "Chart written");
        Ok(path)
    }
}

/// Bounds of everything that gets drawn.
struct Extent {
    min_date: NaiveDate,
    max_date: NaiveDate,
    min_v: f64,
    max_v: f64,
}

impl Extent {
    fn of(series: &[&ChartSeries]) -> Option<Self> {
        let mut points = series
            .iter()
            .flat_map(|s| s.points.iter())
            .filter(|(_, v)| v.is_finite());

        let &(first_date, first_v) = points.next()?;
        let mut extent = Self {
            min_date: first_date,
            max_date: first_date,
            min_v: first_v,
            max_v: first_v,
        };
        for &(date, v) in points {
            extent.min_date = extent.min_date.min(date);
            extent.max_date = extent.max_date.max(date);
            extent.min_v = extent.min_v.min(v);
            extent.max_v = extent.max_v.max(v);
        }

        if extent.min_v == extent.max_v {
            // widen flat ranges
            let adjust = if extent.min_v == 0.0 { 1.0 } else { extent.min_v.abs() * 0.1 };
            extent.min_v -= adjust;
            extent.max_v += adjust;
        } else {
            let pad = (extent.max_v - extent.min_v) * 0.05;
            extent.min_v -= pad;
            extent.max_v += pad;
        }

        Some(extent)
    }

    fn x(&self, date: NaiveDate) -> f64 {
        let inner = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let span = (self.max_date - self.min_date).num_days();
        if span == 0 {
            return MARGIN_LEFT + inner / 2.0;
        }
        let offset = (date - self.min_date).num_days() as f64;
        MARGIN_LEFT + offset / span as f64 * inner
    }

    fn y(&self, value: f64) -> f64 {
        let inner = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let norm = (value - self.min_v) / (self.max_v - self.min_v);
        MARGIN_TOP + (1.0 - norm) * inner
    }
}

/// Builds the SVG document for the given series.
///
/// Series are placed on a shared date axis, so symbols traded on different
/// exchange calendars still line up by date.
pub fn render_svg(series: &[ChartSeries]) -> Result<String, RenderError> {
    let drawable: Vec<&ChartSeries> = series
        .iter()
        .filter(|s| s.points.iter().any(|(_, v)| v.is_finite()))
        .collect();
    let extent = Extent::of(&drawable).ok_or(RenderError::NoData)?;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:12px;fill:#333}}</style>"#,
        w = WIDTH,
        h = HEIGHT
    ));
    svg.push_str(&format!(
        r##"<rect x="0" y="0" width="{w}" height="{h}" fill="#ffffff" />"##,
        w = WIDTH,
        h = HEIGHT
    ));

    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="16">Cumulative Returns ({from}–{to})</text>"#,
        x = WIDTH / 2.0,
        y = MARGIN_TOP / 2.0 + 6.0,
        from = extent.min_date.year(),
        to = extent.max_date.year()
    ));

    draw_value_axis(&mut svg, &extent);
    draw_time_axis(&mut svg, &extent);

    for (idx, s) in drawable.iter().enumerate() {
        let points_attr = s
            .points
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(date, v)| format!("{:.2},{:.2}", extent.x(*date), extent.y(*v)))
            .collect::<Vec<_>>()
            .join(" ");
        svg.push_str(&format!(
            r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{points}" />"#,
            color = PALETTE[idx % PALETTE.len()],
            points = points_attr
        ));
    }

    draw_legend(&mut svg, &drawable);

    svg.push_str("</svg>");
    Ok(svg)
}

fn draw_value_axis(svg: &mut String, extent: &Extent) {
    let left = MARGIN_LEFT;
    let right = WIDTH - MARGIN_RIGHT;

    for i in 0..Y_TICKS {
        let value = extent.min_v + (extent.max_v - extent.min_v) * i as f64 / (Y_TICKS - 1) as f64;
        let y = extent.y(value);
        svg.push_str(&format!(
            r#"<line x1="{left:.2}" y1="{y:.2}" x2="{right:.2}" y2="{y:.2}" stroke="{GRID_COLOR}" stroke-width="1" />"#
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{ty:.2}" text-anchor="end">{value:.2}</text>"#,
            x = left - 8.0,
            ty = y + 4.0
        ));
    }

    svg.push_str(&format!(
        r#"<line x1="{left:.2}" y1="{top:.2}" x2="{left:.2}" y2="{bottom:.2}" stroke="{AXIS_COLOR}" stroke-width="1" />"#,
        top = MARGIN_TOP,
        bottom = HEIGHT - MARGIN_BOTTOM
    ));

    let cy = (MARGIN_TOP + HEIGHT - MARGIN_BOTTOM) / 2.0;
    svg.push_str(&format!(
        r#"<text x="18" y="{cy:.2}" text-anchor="middle" transform="rotate(-90 18 {cy:.2})">Growth of $1</text>"#
    ));
}

fn draw_time_axis(svg: &mut String, extent: &Extent) {
    let axis_y = HEIGHT - MARGIN_BOTTOM;

    svg.push_str(&format!(
        r#"<line x1="{x1:.2}" y1="{axis_y:.2}" x2="{x2:.2}" y2="{axis_y:.2}" stroke="{AXIS_COLOR}" stroke-width="1" />"#,
        x1 = MARGIN_LEFT,
        x2 = WIDTH - MARGIN_RIGHT
    ));

    for (date, label) in time_ticks(extent.min_date, extent.max_date) {
        let x = extent.x(date);
        svg.push_str(&format!(
            r#"<line x1="{x:.2}" y1="{top:.2}" x2="{x:.2}" y2="{axis_y:.2}" stroke="{GRID_COLOR}" stroke-width="1" />"#,
            top = MARGIN_TOP
        ));
        svg.push_str(&format!(
            r#"<line x1="{x:.2}" y1="{axis_y:.2}" x2="{x:.2}" y2="{tick:.2}" stroke="{AXIS_COLOR}" stroke-width="1" />"#,
            tick = axis_y + 5.0
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            y = axis_y + 20.0
        ));
    }

    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">Date</text>"#,
        x = (MARGIN_LEFT + WIDTH - MARGIN_RIGHT) / 2.0,
        y = HEIGHT - 14.0
    ));
}

/// Year starts for multi-year ranges, month starts otherwise.
fn time_ticks(min: NaiveDate, max: NaiveDate) -> Vec<(NaiveDate, String)> {
    let in_range = |d: &NaiveDate| *d >= min && *d <= max;

    if max.year() - min.year() >= 2 {
        return (min.year()..=max.year())
            .filter_map(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .filter(in_range)
            .map(|d| (d, d.year().to_string()))
            .collect();
    }

    let mut ticks = Vec::new();
    let mut cursor = NaiveDate::from_ymd_opt(min.year(), min.month(), 1);
    while let Some(d) = cursor {
        if d > max {
            break;
        }
        if in_range(&d) {
            ticks.push((d, d.format("%Y-%m").to_string()));
        }
        cursor = d.checked_add_months(chrono::Months::new(1));
    }

    if ticks.is_empty() {
        ticks.push((min, min.format("%Y-%m-%d").to_string()));
        if max != min {
            ticks.push((max, max.format("%Y-%m-%d").to_string()));
        }
    }
    ticks
}

fn draw_legend(svg: &mut String, series: &[&ChartSeries]) {
    let x = MARGIN_LEFT + 14.0;
    let mut y = MARGIN_TOP + 18.0;

    svg.push_str(&format!(
        r##"<rect x="{rx:.2}" y="{ry:.2}" width="120" height="{h:.2}" fill="#ffffff" fill-opacity="0.85" stroke="#cccccc" />"##,
        rx = x - 8.0,
        ry = y - 14.0,
        h = series.len() as f64 * 18.0 + 8.0
    ));

    for (idx, s) in series.iter().enumerate() {
        svg.push_str(&format!(
            r#"<line x1="{x:.2}" y1="{ly:.2}" x2="{x2:.2}" y2="{ly:.2}" stroke="{color}" stroke-width="2" />"#,
            ly = y - 4.0,
            x2 = x + 22.0,
            color = PALETTE[idx % PALETTE.len()]
        ));
        svg.push_str(&format!(
            r#"<text x="{tx:.2}" y="{y:.2}" text-anchor="start">{label}</text>"#,
            tx = x + 28.0,
            label = escape(&s.label)
        ));
        y += 18.0;
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<ChartSeries> {
        vec![
            ChartSeries {
                label: "SPY".to_string(),
                points: vec![
                    (date(2018, 1, 2), 1.0),
                    (date(2021, 6, 1), 1.6),
                    (date(2024, 12, 31), 2.4),
                ],
            },
            ChartSeries {
                label: "VUKE.L".to_string(),
                points: vec![(date(2018, 1, 2), 1.0), (date(2024, 12, 30), 1.3)],
            },
        ]
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("etf-risk-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn svg_contains_one_line_per_series() {
        let svg = render_svg(&sample()).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(">SPY</text>"));
        assert!(svg.contains(">VUKE.L</text>"));
        assert!(svg.contains("Cumulative Returns (2018–2024)"));
        assert!(svg.contains("Growth of $1"));
        assert!(svg.contains(">2020</text>"));
    }

    #[test]
    fn series_without_points_are_skipped() {
        let mut series = sample();
        series.push(ChartSeries {
            label: "EMPTY".to_string(),
            points: Vec::new(),
        });

        let svg = render_svg(&series).unwrap();
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(!svg.contains("EMPTY"));
    }

    #[test]
    fn nothing_to_draw_is_an_error() {
        assert!(matches!(render_svg(&[]), Err(RenderError::NoData)));
    }

    #[test]
    fn labels_are_escaped() {
        let series = vec![ChartSeries {
            label: "A&B".to_string(),
            points: vec![(date(2024, 1, 2), 1.0), (date(2024, 3, 1), 1.1)],
        }];
        let svg = render_svg(&series).unwrap();
        assert!(svg.contains(">A&amp;B</text>"));
        assert!(svg.contains(">2024-02</text>"));
    }

    #[test]
    fn short_ranges_fall_back_to_day_labels() {
        let ticks = time_ticks(date(2024, 1, 2), date(2024, 1, 19));
        assert_eq!(
            ticks,
            vec![
                (date(2024, 1, 2), "2024-01-02".to_string()),
                (date(2024, 1, 19), "2024-01-19".to_string()),
            ]
        );
    }

    #[test]
    fn render_creates_directory_and_file() {
        let dir = scratch_dir("render");
        let renderer = SvgChartRenderer::new(&OutputConfig {
            directory: dir.join("charts"),
            chart_file: "cumulative_returns.svg".to_string(),
        });

        let path = renderer.render(&sample()).unwrap();

        assert_eq!(path, dir.join("charts").join("cumulative_returns.svg"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("<polyline"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unwritable_directory_is_a_render_error() {
        let dir = scratch_dir("blocked");
        fs::create_dir_all(&dir).unwrap();
        // A regular file where the output directory should go.
        let blocker = dir.join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();

        let renderer = SvgChartRenderer::new(&OutputConfig {
            directory: blocker.join("charts"),
            chart_file: "out.svg".to_string(),
        });

        let err = renderer.render(&sample()).unwrap_err();
        assert!(matches!(err, RenderError::Io { ref path, .. } if path.starts_with(Path::new(&blocker))));
        let _ = fs::remove_dir_all(&dir);
    }
}
