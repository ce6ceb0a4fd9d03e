use serde::Serialize;

/// A named aggregate query. The SQL is opaque here: it is passed to the
/// query service verbatim and its rows are filed under `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregateQuery {
    pub name: &'static str,
    pub sql: &'static str,
}

/// Catalog entry names.
pub mod names {
    pub const SUMMARY: &str = "summary";
    pub const DUPLICATES: &str = "duplicates";
    pub const LICENSE_VALIDATION: &str = "license_validation";
    pub const DATA_QUALITY: &str = "data_quality";
    pub const STATE_BREAKDOWN: &str = "state_breakdown";
    pub const SPECIALTY_QUALITY: &str = "specialty_quality";
}

/// Every query the dashboard runs on load, in display order.
pub const DASHBOARD_CATALOG: &[AggregateQuery] = &[
    AggregateQuery {
        name: names::SUMMARY,
        sql: "SELECT \
            COUNT(*) AS total_providers, \
            SUM(CASE WHEN is_license_active = 0 THEN 1 ELSE 0 END) AS expired_licenses, \
            SUM(CASE WHEN is_npi_found = 0 THEN 1 ELSE 0 END) AS npi_issues, \
            AVG((is_license_found + is_license_active + is_npi_found) / 3.0) * 100 AS overall_quality_score \
            FROM provider_roster",
    },
    AggregateQuery {
        name: names::DUPLICATES,
        sql: "SELECT \
            COUNT(*) AS potential_duplicates, \
            COUNT(DISTINCT full_name) AS unique_names, \
            COUNT(*) - COUNT(DISTINCT full_name) AS name_variations \
            FROM provider_roster",
    },
    AggregateQuery {
        name: names::LICENSE_VALIDATION,
        sql: "SELECT \
            SUM(CASE WHEN is_license_found = 1 AND is_license_active = 1 THEN 1 ELSE 0 END) AS valid_licenses, \
            SUM(CASE WHEN is_license_found = 1 AND is_license_active = 0 THEN 1 ELSE 0 END) AS expired_licenses, \
            SUM(CASE WHEN is_license_found = 0 THEN 1 ELSE 0 END) AS invalid_licenses, \
            SUM(CASE WHEN license_number IS NULL OR license_number = '' THEN 1 ELSE 0 END) AS missing_license_numbers \
            FROM provider_roster",
    },
    AggregateQuery {
        name: names::DATA_QUALITY,
        sql: "SELECT \
            SUM(CASE WHEN npi IS NULL OR npi = '' THEN 1 ELSE 0 END) AS missing_npi, \
            SUM(CASE WHEN phone IS NULL OR phone = '' THEN 1 ELSE 0 END) AS missing_phone, \
            SUM(CASE WHEN address IS NULL OR address = '' THEN 1 ELSE 0 END) AS missing_address, \
            SUM(CASE WHEN specialty IS NULL OR specialty = '' THEN 1 ELSE 0 END) AS missing_specialty \
            FROM provider_roster",
    },
    AggregateQuery {
        name: names::STATE_BREAKDOWN,
        sql: "SELECT \
            license_state, \
            COUNT(*) AS provider_count, \
            AVG((is_license_found + is_license_active + is_npi_found) / 3.0) * 100 AS avg_quality_score \
            FROM provider_roster \
            GROUP BY license_state",
    },
    AggregateQuery {
        name: names::SPECIALTY_QUALITY,
        sql: "SELECT \
            specialty, \
            COUNT(*) AS provider_count, \
            AVG((is_license_found + is_license_active + is_npi_found) / 3.0) * 100 AS avg_quality_score \
            FROM provider_roster \
            WHERE specialty IS NOT NULL AND specialty != '' \
            GROUP BY specialty \
            ORDER BY avg_quality_score ASC \
            LIMIT 5",
    },
];

/// Look up a catalog entry by name.
pub fn find(name: &str) -> Option<&'static AggregateQuery> {
    DASHBOARD_CATALOG.iter().find(|q| q.name == name)
}
