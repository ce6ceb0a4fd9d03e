use std::fmt;

use roster_core::config::DEFAULT_CHART_ROW_LIMIT;
use roster_core::{stringify, Record};
use serde::{Deserialize, Serialize};

use crate::normalize::{PointFilter, SeriesPoint, TabularNormalizer, DEFAULT_HINTS};

/// Rows of one completed query together with the query text that produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub generated_query: String,
    pub rows: Vec<Record>,
}

impl QueryResult {
    pub fn new(generated_query: impl Into<String>, rows: Vec<Record>) -> Self {
        Self {
            generated_query: generated_query.into(),
            rows,
        }
    }
}

/// Chart flavours the presenter can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
}

impl ChartKind {
    /// Pie slices must be positive; bars may sit at zero or below.
    pub fn point_filter(self) -> PointFilter {
        match self {
            ChartKind::Bar => PointFilter::FiniteOnly,
            ChartKind::Pie => PointFilter::PositiveOnly,
        }
    }
}

/// Chart input, or an explicit "nothing to draw".
#[derive(Debug, Clone, PartialEq)]
pub enum ChartView {
    NoData,
    Series { kind: ChartKind, points: Vec<SeriesPoint> },
}

/// What the tabular view should show for the current result.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView<'a> {
    /// The query ran but returned no rows.
    Empty { generated_query: &'a str },
    Table { generated_query: &'a str, table: TableView },
}

/// Header-derived table. Headers are human-cased column names of the first row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    columns: Vec<String>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableView {
    /// Build from rows. Columns come from the first row; cells of later rows
    /// are looked up by those column names (missing cells render empty).
    pub fn from_rows(rows: &[Record]) -> Option<Self> {
        let first = rows.first()?;
        let columns: Vec<String> = first.keys().cloned().collect();
        let headers = columns.iter().map(|c| human_case(c)).collect();
        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(c).map(stringify).unwrap_or_default())
                    .collect()
            })
            .collect();
        Some(Self { columns, headers, rows })
    }

    /// Raw column names, in first-row order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Rendered cells; every row has one cell per column.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Column widths (minimum = header length), counted in chars.
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        for (i, header) in self.headers.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{:<width$}", header, width = widths[i])?;
        }
        writeln!(f)?;

        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                write!(f, "-+-")?;
            }
            write!(f, "{}", "-".repeat(*w))?;
        }
        writeln!(f)?;

        for row in &self.rows {
            for (i, (cell, width)) in row.iter().zip(&widths).enumerate() {
                if i > 0 {
                    write!(f, " | ")?;
                }
                write!(f, "{:<width$}", cell, width = *width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// `expired_count` → `EXPIRED COUNT`.
pub fn human_case(column: &str) -> String {
    column.replace('_', " ").to_uppercase()
}

/// Exposes one query result to both the table and the chart path.
#[derive(Debug, Clone)]
pub struct ResultPresenter {
    result: QueryResult,
    chart_row_limit: usize,
}

impl ResultPresenter {
    pub fn new(result: QueryResult) -> Self {
        Self {
            result,
            chart_row_limit: DEFAULT_CHART_ROW_LIMIT,
        }
    }

    pub fn with_chart_row_limit(mut self, limit: usize) -> Self {
        self.chart_row_limit = limit;
        self
    }

    pub fn generated_query(&self) -> &str {
        &self.result.generated_query
    }

    pub fn rows(&self) -> &[Record] {
        &self.result.rows
    }

    pub fn is_empty(&self) -> bool {
        self.result.rows.is_empty()
    }

    pub fn view(&self) -> ResultView<'_> {
        let generated_query = self.result.generated_query.as_str();
        match TableView::from_rows(&self.result.rows) {
            Some(table) => ResultView::Table { generated_query, table },
            None => ResultView::Empty { generated_query },
        }
    }

    /// The leading rows forwarded to charting.
    pub fn chart_rows(&self) -> &[Record] {
        let end = self.chart_row_limit.min(self.result.rows.len());
        &self.result.rows[..end]
    }

    pub fn chart(&self, kind: ChartKind) -> ChartView {
        let points = TabularNormalizer::new(kind.point_filter())
            .with_hints(DEFAULT_HINTS)
            .normalize(self.chart_rows());
        if points.is_empty() {
            ChartView::NoData
        } else {
            ChartView::Series { kind, points }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(rows: serde_json::Value) -> QueryResult {
        QueryResult::new("SELECT ...", serde_json::from_value(rows).unwrap())
    }

    #[test]
    fn human_case_headers() {
        assert_eq!(human_case("expired_count"), "EXPIRED COUNT");
        assert_eq!(human_case("npi"), "NPI");
        assert_eq!(human_case("a__b"), "A  B");
    }

    #[test]
    fn empty_rows_signal_empty_state() {
        let presenter = ResultPresenter::new(result(json!([])));
        assert!(presenter.is_empty());
        assert_eq!(presenter.view(), ResultView::Empty { generated_query: "SELECT ..." });
        assert_eq!(presenter.chart(ChartKind::Bar), ChartView::NoData);
    }

    #[test]
    fn table_uses_first_row_columns() {
        let presenter = ResultPresenter::new(result(json!([
            {"full_name": "Ann Lee", "npi": null},
            {"npi": "123", "full_name": "Bo Chen", "extra": 1},
            {"full_name": {"first": "Cy"}}
        ])));
        let ResultView::Table { table, .. } = presenter.view() else {
            panic!("expected a table");
        };
        assert_eq!(table.columns(), ["full_name", "npi"]);
        assert_eq!(table.headers(), ["FULL NAME", "NPI"]);
        assert_eq!(
            table.rows(),
            vec![
                vec!["Ann Lee".to_string(), String::new()],
                vec!["Bo Chen".to_string(), "123".to_string()],
                vec![r#"{"first":"Cy"}"#.to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn chart_is_capped() {
        let rows: Vec<serde_json::Value> = (1..=25)
            .map(|i| json!({"license_state": format!("S{i}"), "provider_count": i}))
            .collect();
        let presenter = ResultPresenter::new(result(json!(rows)));
        assert_eq!(presenter.chart_rows().len(), 10);

        let ChartView::Series { points, .. } = presenter.chart(ChartKind::Bar) else {
            panic!("expected a series");
        };
        assert_eq!(points.len(), 10);
        assert_eq!(points[0], SeriesPoint::new("S1", 1.0));

        let presenter = presenter.with_chart_row_limit(3);
        assert_eq!(presenter.chart_rows().len(), 3);
    }

    #[test]
    fn pie_drops_zero_slices() {
        let presenter = ResultPresenter::new(result(json!([
            {"status": "valid", "n": 0},
            {"status": "expired", "n": 4}
        ])));
        let ChartView::Series { points, kind } = presenter.chart(ChartKind::Pie) else {
            panic!("expected a series");
        };
        assert_eq!(kind, ChartKind::Pie);
        assert_eq!(points, vec![SeriesPoint::new("expired", 4.0)]);

        let ChartView::Series { points, .. } = presenter.chart(ChartKind::Bar) else {
            panic!("expected a series");
        };
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn chart_labels_match_table_cells() {
        let presenter = ResultPresenter::new(result(json!([
            {"is_active": true, "n": 3},
            {"is_active": null, "n": 1}
        ])));
        let ResultView::Table { table, .. } = presenter.view() else {
            panic!("expected a table");
        };
        let ChartView::Series { points, .. } = presenter.chart(ChartKind::Bar) else {
            panic!("expected a series");
        };
        let labels: Vec<&str> = points.iter().map(|p| p.name.as_str()).collect();
        let cells: Vec<&str> = table.rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(labels, cells);
    }

    #[test]
    fn display_renders_header_separator_and_rows() {
        let table = TableView::from_rows(&result(json!([{"expired_count": 5}])).rows).unwrap();
        let out = table.to_string();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "EXPIRED COUNT");
        assert_eq!(lines[1], "-------------");
        assert_eq!(lines[2], "5            ");
    }

    #[test]
    fn display_ignores_columns_missing_from_first_row() {
        let table = TableView::from_rows(
            &result(json!([
                {"npi": "1"},
                {"npi": "22", "full_name": "A much longer value than the header"}
            ]))
            .rows,
        )
        .unwrap();
        assert!(table.rows().iter().all(|r| r.len() == table.headers().len()));

        let out = table.to_string();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["NPI", "---", "1  ", "22 "]);
    }
}
