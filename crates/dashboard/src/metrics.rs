//! Dashboard figures derived from one [`NamedResultBundle`].
//!
//! Every figure falls back to zero when its query produced no row, the
//! column is missing, or the cell is not numeric. Percentages are stored at
//! full precision; rounding belongs to the view.

use roster_core::{number_at, Record};
use serde::Serialize;

use crate::catalog::names;
use crate::fanout::NamedResultBundle;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    // summary
    pub total_providers: u64,
    pub expired_licenses: u64,
    pub npi_issues: u64,
    /// Mean of the three validation flags, 0–100.
    pub quality_score: f64,

    // duplicates
    /// Sourced from `name_variations`, the same column as `name_variations`
    /// below. The two are not yet distinguished upstream.
    pub potential_duplicates: u64,
    pub unique_names: u64,
    pub name_variations: u64,

    // license_validation
    pub valid_licenses: u64,
    /// Licenses found but inactive (the summary's `expired_licenses` also
    /// counts licenses that were never found).
    pub license_expired: u64,
    pub invalid_licenses: u64,
    pub missing_license_numbers: u64,

    // data_quality
    pub missing_npi: u64,
    pub missing_phone: u64,
    pub missing_address: u64,
    pub missing_specialty: u64,

    // derived
    pub providers_needing_attention: u64,
    pub valid_license_percentage: f64,
    pub data_issues_percentage: f64,
    pub resolved_matches_percentage: f64,
}

/// Pure reduction from query results to [`DerivedMetrics`].
pub struct DashboardAggregator;

impl DashboardAggregator {
    pub fn derive(bundle: &NamedResultBundle) -> DerivedMetrics {
        let summary = bundle.first_row(names::SUMMARY);
        let duplicates = bundle.first_row(names::DUPLICATES);
        let licenses = bundle.first_row(names::LICENSE_VALIDATION);
        let quality = bundle.first_row(names::DATA_QUALITY);

        let total_providers = count(summary, "total_providers");
        let expired_licenses = count(summary, "expired_licenses");
        let npi_issues = count(summary, "npi_issues");
        let name_variations = count(duplicates, "name_variations");
        let potential_duplicates = name_variations;
        let valid_licenses = count(licenses, "valid_licenses");
        let providers_needing_attention = expired_licenses.saturating_add(npi_issues);

        let total = total_providers as f64;

        DerivedMetrics {
            total_providers,
            expired_licenses,
            npi_issues,
            quality_score: figure(summary, "overall_quality_score"),

            potential_duplicates,
            unique_names: count(duplicates, "unique_names"),
            name_variations,

            valid_licenses,
            license_expired: count(licenses, "expired_licenses"),
            invalid_licenses: count(licenses, "invalid_licenses"),
            missing_license_numbers: count(licenses, "missing_license_numbers"),

            missing_npi: count(quality, "missing_npi"),
            missing_phone: count(quality, "missing_phone"),
            missing_address: count(quality, "missing_address"),
            missing_specialty: count(quality, "missing_specialty"),

            providers_needing_attention,
            valid_license_percentage: percentage(valid_licenses as f64, total),
            data_issues_percentage: percentage(providers_needing_attention as f64, total),
            resolved_matches_percentage: percentage(
                total - potential_duplicates as f64,
                total,
            ),
        }
    }
}

/// Non-negative whole count from a cell, 0 when absent or not numeric.
fn count(row: Option<&Record>, column: &str) -> u64 {
    row.and_then(|r| number_at(r, column))
        .filter(|n| *n > 0.0)
        .map(|n| n.round() as u64)
        .unwrap_or(0)
}

/// Raw figure from a cell, 0.0 when absent or not numeric.
fn figure(row: Option<&Record>, column: &str) -> f64 {
    row.and_then(|r| number_at(r, column)).unwrap_or(0.0)
}

/// `part / total * 100`, or 0 when `total` is not positive.
pub(crate) fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}
