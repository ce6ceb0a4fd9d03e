use std::sync::Arc;

use roster_client::QueryBackend;
use roster_core::Record;
use roster_viz::{ChartKind, ChartView, FieldHint, PointFilter, SeriesPoint, TabularNormalizer};
use serde_json::json;
use tracing::info;

use crate::catalog::{names, AggregateQuery, DASHBOARD_CATALOG};
use crate::fanout::{NamedResultBundle, QueryFanoutExecutor};
use crate::metrics::{DashboardAggregator, DerivedMetrics};

const STATE_HINTS: &[FieldHint<'static>] =
    &[FieldHint { name: "license_state", value: "provider_count" }];
const SPECIALTY_HINTS: &[FieldHint<'static>] =
    &[FieldHint { name: "specialty", value: "provider_count" }];

/// Headline figure.
#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardMetric {
    pub label: &'static str,
    pub value: String,
}

/// One data-quality problem area with its figures and chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemCard {
    pub title: &'static str,
    pub description: &'static str,
    pub metrics: Vec<CardMetric>,
    pub chart: ChartView,
}

/// A canned question the dashboard hands to the chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    pub label: &'static str,
    pub question: &'static str,
}

pub const QUICK_ACTIONS: &[QuickAction] = &[
    QuickAction {
        label: "View Expired Licenses",
        question: "Show me all providers with expired licenses",
    },
    QuickAction {
        label: "Find NPI Issues",
        question: "Show me providers with missing NPI numbers",
    },
    QuickAction {
        label: "Contact Issues",
        question: "Show me providers with missing contact information",
    },
];

/// Everything one dashboard load produced. Replaced wholesale on refresh.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub metrics: DerivedMetrics,
    pub state_breakdown: Vec<SeriesPoint>,
    pub specialty_quality: Vec<SeriesPoint>,
    pub bundle: NamedResultBundle,
}

impl DashboardSnapshot {
    pub fn from_bundle(bundle: NamedResultBundle) -> Self {
        let metrics = DashboardAggregator::derive(&bundle);
        let state_breakdown = TabularNormalizer::new(PointFilter::FiniteOnly)
            .with_hints(STATE_HINTS)
            .normalize(bundle.get(names::STATE_BREAKDOWN).unwrap_or_default());
        let specialty_quality = TabularNormalizer::new(PointFilter::FiniteOnly)
            .with_hints(SPECIALTY_HINTS)
            .normalize(bundle.get(names::SPECIALTY_QUALITY).unwrap_or_default());
        Self {
            metrics,
            state_breakdown,
            specialty_quality,
            bundle,
        }
    }

    pub fn stat_cards(&self) -> Vec<StatCard> {
        let m = &self.metrics;
        vec![
            StatCard {
                title: "Total Providers",
                value: group_thousands(m.total_providers),
                subtitle: "Active provider records".to_string(),
            },
            StatCard {
                title: "Valid Licenses",
                value: format_percent(m.valid_license_percentage),
                subtitle: format!("{} of {} providers", m.valid_licenses, m.total_providers),
            },
            StatCard {
                title: "Data Issues",
                value: format_percent(m.data_issues_percentage),
                subtitle: format!("{} providers need attention", m.providers_needing_attention),
            },
            StatCard {
                title: "Quality Score",
                value: format!("{:.1}%", m.quality_score),
                subtitle: "Overall data quality".to_string(),
            },
        ]
    }

    pub fn problem_cards(&self) -> Vec<ProblemCard> {
        let m = &self.metrics;
        let dup = m.potential_duplicates;
        vec![
            ProblemCard {
                title: "Provider Entity Resolution & Deduplication",
                description: "Duplicate provider records despite name variations, spelling differences, or formatting inconsistencies.",
                metrics: vec![
                    CardMetric { label: "Potential Duplicates", value: dup.to_string() },
                    CardMetric { label: "Name Variations", value: m.name_variations.to_string() },
                    CardMetric {
                        label: "Resolved Matches",
                        value: format_percent(m.resolved_matches_percentage),
                    },
                ],
                chart: card_chart(
                    ChartKind::Pie,
                    &[
                        ("Exact Match", m.total_providers.saturating_sub(dup)),
                        ("Fuzzy Match", (dup as f64 * 0.6).floor() as u64),
                        ("No Match", (dup as f64 * 0.4).floor() as u64),
                    ],
                ),
            },
            ProblemCard {
                title: "License Validation & Compliance Tracking",
                description: "Expired credentials, invalid license numbers, and missing license data.",
                metrics: vec![
                    CardMetric { label: "Expired Licenses", value: m.expired_licenses.to_string() },
                    CardMetric { label: "Invalid Numbers", value: m.invalid_licenses.to_string() },
                    CardMetric {
                        label: "Missing Numbers",
                        value: m.missing_license_numbers.to_string(),
                    },
                ],
                chart: card_chart(
                    ChartKind::Bar,
                    &[
                        ("Valid", m.valid_licenses),
                        ("Expired", m.expired_licenses),
                        ("Invalid", m.invalid_licenses),
                    ],
                ),
            },
            ProblemCard {
                title: "Data Quality Assessment & Standardization",
                description: "Missing information and formatting anomalies in key provider fields.",
                metrics: vec![
                    CardMetric { label: "NPI Issues", value: m.missing_npi.to_string() },
                    CardMetric { label: "Phone Issues", value: m.missing_phone.to_string() },
                    CardMetric { label: "Address Issues", value: m.missing_address.to_string() },
                ],
                chart: card_chart(
                    ChartKind::Bar,
                    &[
                        ("Missing NPI", m.missing_npi),
                        ("Missing Phone", m.missing_phone),
                        ("Missing Address", m.missing_address),
                        ("Missing Specialty", m.missing_specialty),
                    ],
                ),
            },
        ]
    }
}

/// Build a card chart through the normalizer so the same point rules apply.
fn card_chart(kind: ChartKind, slices: &[(&str, u64)]) -> ChartView {
    let rows: Vec<Record> = slices
        .iter()
        .map(|(name, value)| {
            let mut row = Record::new();
            row.insert("name".to_string(), json!(name));
            row.insert("value".to_string(), json!(value));
            row
        })
        .collect();
    let points = TabularNormalizer::new(kind.point_filter()).normalize(&rows);
    if points.is_empty() {
        ChartView::NoData
    } else {
        ChartView::Series { kind, points }
    }
}

/// Whole-number percentage for display.
pub fn format_percent(value: f64) -> String {
    format!("{}%", value.round() as i64)
}

/// `1234567` → `1,234,567`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// The dashboard component: owns the executor and the latest snapshot.
pub struct Dashboard {
    executor: QueryFanoutExecutor,
    catalog: &'static [AggregateQuery],
    snapshot: Option<DashboardSnapshot>,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            executor: QueryFanoutExecutor::new(backend),
            catalog: DASHBOARD_CATALOG,
            snapshot: None,
        }
    }

    /// Run the catalog and replace the snapshot.
    pub async fn refresh(&mut self) -> &DashboardSnapshot {
        let bundle = self.executor.run(self.catalog).await;
        let snapshot = DashboardSnapshot::from_bundle(bundle);
        info!(
            total_providers = snapshot.metrics.total_providers,
            quality_score = snapshot.metrics.quality_score,
            "dashboard refreshed"
        );
        self.snapshot.insert(snapshot)
    }

    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_half_away_from_zero() {
        assert_eq!(format_percent(0.0), "0%");
        assert_eq!(format_percent(66.5), "67%");
        assert_eq!(format_percent(33.333), "33%");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn pie_card_drops_empty_slices() {
        let chart = card_chart(ChartKind::Pie, &[("Exact Match", 10), ("Fuzzy Match", 0)]);
        assert_eq!(
            chart,
            ChartView::Series {
                kind: ChartKind::Pie,
                points: vec![SeriesPoint::new("Exact Match", 10.0)]
            }
        );
        assert_eq!(card_chart(ChartKind::Pie, &[("Fuzzy Match", 0)]), ChartView::NoData);
    }

    #[test]
    fn bar_card_keeps_zero_bars() {
        let chart = card_chart(ChartKind::Bar, &[("Valid", 0), ("Expired", 2)]);
        let ChartView::Series { points, .. } = chart else {
            panic!("expected a series");
        };
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn empty_snapshot_still_renders() {
        let snapshot = DashboardSnapshot::from_bundle(NamedResultBundle::default());
        let cards = snapshot.stat_cards();
        assert_eq!(cards[0].value, "0");
        assert_eq!(cards[1].value, "0%");
        assert_eq!(cards[1].subtitle, "0 of 0 providers");
        assert_eq!(cards[3].value, "0.0%");
        assert!(snapshot.state_breakdown.is_empty());
        assert_eq!(snapshot.problem_cards()[0].chart, ChartView::NoData);
    }
}
