//! Reshape arbitrary result rows into a `{name, value}` series for charts.
//!
//! Column selection per record:
//! 1. The first hint whose two columns are both present in the record.
//! 2. Otherwise the record's first two columns in declaration order
//!    (first = label, second = value).
//! 3. A single-column record uses the column name as label and its cell as
//!    value, so `{"expired_count": 5}` charts as `expired_count = 5`.
//! 4. A record with no columns yields no point.
//!
//! Labels go through [`stringify`], values through [`as_number`]. Points
//! without a finite value are always dropped; [`PointFilter::PositiveOnly`]
//! additionally drops zero and negative values. Output keeps input order.

use roster_core::{as_number, stringify, Record};
use serde::Serialize;
use tracing::debug;

/// One chart-ready point. `value` is always finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub name: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), value }
    }
}

/// Which points survive normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointFilter {
    /// Drop only points whose value is not a finite number.
    FiniteOnly,
    /// Also drop zero and negative values (proportion charts).
    PositiveOnly,
}

impl PointFilter {
    fn admits(self, value: f64) -> bool {
        match self {
            PointFilter::FiniteOnly => true,
            PointFilter::PositiveOnly => value > 0.0,
        }
    }
}

/// Preferred `(label column, value column)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldHint<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// Group-by shapes the roster queries commonly produce.
pub const DEFAULT_HINTS: &[FieldHint<'static>] = &[
    FieldHint { name: "primary_specialty", value: "provider_count" },
    FieldHint { name: "license_state", value: "provider_count" },
    FieldHint { name: "specialty", value: "provider_count" },
];

#[derive(Debug, Clone, Copy)]
pub struct TabularNormalizer<'h> {
    hints: &'h [FieldHint<'h>],
    filter: PointFilter,
}

impl<'h> TabularNormalizer<'h> {
    /// A normalizer with no hints (positional selection only).
    pub fn new(filter: PointFilter) -> Self {
        Self { hints: &[], filter }
    }

    pub fn with_hints(mut self, hints: &'h [FieldHint<'h>]) -> Self {
        self.hints = hints;
        self
    }

    pub fn filter(&self) -> PointFilter {
        self.filter
    }

    /// Normalize `records` into at most `records.len()` points.
    pub fn normalize(&self, records: &[Record]) -> Vec<SeriesPoint> {
        if records.is_empty() {
            return Vec::new();
        }

        let points: Vec<SeriesPoint> = records
            .iter()
            .filter_map(|record| self.point_for(record))
            .collect();

        debug!(
            records = records.len(),
            points = points.len(),
            filter = ?self.filter,
            "normalized result rows"
        );
        points
    }

    fn point_for(&self, record: &Record) -> Option<SeriesPoint> {
        let (name, value) = self.select(record)?;
        let value = as_number(value)?;
        self.filter.admits(value).then(|| SeriesPoint { name, value })
    }

    /// Pick the label text and the raw value cell for one record.
    fn select<'r>(&self, record: &'r Record) -> Option<(String, &'r roster_core::Value)> {
        for hint in self.hints {
            if let (Some(name), Some(value)) = (record.get(hint.name), record.get(hint.value)) {
                return Some((stringify(name), value));
            }
        }

        let mut columns = record.iter();
        match (columns.next(), columns.next()) {
            (Some((_, name)), Some((_, value))) => Some((stringify(name), value)),
            (Some((column, value)), None) => Some((column.clone(), value)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let n = TabularNormalizer::new(PointFilter::FiniteOnly);
        assert!(n.normalize(&[]).is_empty());
        assert!(n.normalize(&[]).is_empty());
    }

    #[test]
    fn positional_selection_uses_first_two_columns() {
        let records = rows(json!([
            {"license_state": "NY", "provider_count": 12, "avg_quality_score": 80.5},
            {"license_state": "CA", "provider_count": "7", "avg_quality_score": 60.0}
        ]));
        let series = TabularNormalizer::new(PointFilter::FiniteOnly).normalize(&records);
        assert_eq!(series, vec![SeriesPoint::new("NY", 12.0), SeriesPoint::new("CA", 7.0)]);
    }

    #[test]
    fn hints_win_over_position() {
        let records = rows(json!([
            {"avg_quality_score": 55.0, "specialty": "Cardiology", "provider_count": 4}
        ]));
        let series = TabularNormalizer::new(PointFilter::FiniteOnly)
            .with_hints(DEFAULT_HINTS)
            .normalize(&records);
        assert_eq!(series, vec![SeriesPoint::new("Cardiology", 4.0)]);
    }

    #[test]
    fn hint_requires_both_columns() {
        let records = rows(json!([{"specialty": "Oncology", "total": 9}]));
        let series = TabularNormalizer::new(PointFilter::FiniteOnly)
            .with_hints(DEFAULT_HINTS)
            .normalize(&records);
        assert_eq!(series, vec![SeriesPoint::new("Oncology", 9.0)]);
    }

    #[test]
    fn hints_are_tried_per_record() {
        let records = rows(json!([
            {"license_state": "NY", "provider_count": 3},
            {"label": "other", "n": 2}
        ]));
        let series = TabularNormalizer::new(PointFilter::FiniteOnly)
            .with_hints(DEFAULT_HINTS)
            .normalize(&records);
        assert_eq!(series, vec![SeriesPoint::new("NY", 3.0), SeriesPoint::new("other", 2.0)]);
    }

    #[test]
    fn single_column_uses_column_name() {
        let records = rows(json!([{"expired_count": 5}]));
        let series = TabularNormalizer::new(PointFilter::FiniteOnly).normalize(&records);
        assert_eq!(series, vec![SeriesPoint::new("expired_count", 5.0)]);
    }

    #[test]
    fn empty_record_is_skipped() {
        let records = rows(json!([{}, {"a": "x", "b": 1}]));
        let series = TabularNormalizer::new(PointFilter::FiniteOnly).normalize(&records);
        assert_eq!(series, vec![SeriesPoint::new("x", 1.0)]);
    }

    #[test]
    fn non_numeric_values_are_dropped_not_zeroed() {
        let records = rows(json!([
            {"name": "a", "v": "n/a"},
            {"name": "b", "v": null},
            {"name": "c", "v": true},
            {"name": "d", "v": 0}
        ]));
        let series = TabularNormalizer::new(PointFilter::FiniteOnly).normalize(&records);
        assert_eq!(series, vec![SeriesPoint::new("d", 0.0)]);
    }

    #[test]
    fn positive_only_drops_zero_and_negative() {
        let records = rows(json!([
            {"name": "zero", "v": 0},
            {"name": "neg", "v": -2},
            {"name": "pos", "v": 3.5}
        ]));
        let finite = TabularNormalizer::new(PointFilter::FiniteOnly).normalize(&records);
        assert_eq!(finite.len(), 3);

        let positive = TabularNormalizer::new(PointFilter::PositiveOnly).normalize(&records);
        assert_eq!(positive, vec![SeriesPoint::new("pos", 3.5)]);
    }

    #[test]
    fn labels_are_stringified() {
        let records = rows(json!([
            {"k": null, "v": 1},
            {"k": 2024, "v": 2},
            {"k": false, "v": 3},
            {"k": {"a": 1}, "v": 4}
        ]));
        let names: Vec<String> = TabularNormalizer::new(PointFilter::FiniteOnly)
            .normalize(&records)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["", "2024", "false", r#"{"a":1}"#]);
    }

    #[test]
    fn output_never_longer_than_input_and_always_finite() {
        let records = rows(json!([
            {"a": "x", "b": "1e400"},
            {"a": "y", "b": "-0.5"},
            {"a": "z", "b": [1, 2]},
            {"a": "w", "b": "42"}
        ]));
        for filter in [PointFilter::FiniteOnly, PointFilter::PositiveOnly] {
            let series = TabularNormalizer::new(filter).normalize(&records);
            assert!(series.len() <= records.len());
            assert!(series.iter().all(|p| p.value.is_finite()));
        }
    }
}
