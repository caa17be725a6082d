//! Backend API contract.
//!
//! These types mirror the JSON bodies of the three read endpoints. Every
//! field is optional on the way in: a response missing a field is still a
//! successful response, and the display layer renders the gap explicitly.

use serde::{Deserialize, Serialize};

/// Endpoint paths, relative to the API base URL.
pub const MIGRATION_ENDPOINT: &str = "/api/migration";
/// Peri-urban growth endpoint path.
pub const PERI_URBAN_ENDPOINT: &str = "/api/peri-urban";
/// Digital exclusion risk endpoint path.
pub const DIGITAL_RISK_ENDPOINT: &str = "/api/digital-risk";

/// Query parameters accepted by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequestParams {
    /// District identifier.
    pub district: Option<String>,
    /// Period identifier (`7d`, `30d`, `90d`, `1y`).
    pub period: Option<String>,
}

/// `GET /api/migration?district={district}&period={period}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MigrationApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_migration_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outflow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_source_district: Option<String>,
}

/// Alert flag reported by the peri-urban endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiAlertStatus {
    /// Elevated growth detected.
    Alert,
    /// Nothing detected.
    None,
    /// Any value outside the contract.
    #[serde(other)]
    Unrecognized,
}

/// `GET /api/peri-urban?district={district}&period={period}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PeriUrbanApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_status: Option<ApiAlertStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_index: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_zones: Option<u32>,
}

/// Risk level reported by the digital-risk endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiRiskLevel {
    Low,
    Medium,
    High,
    /// Any value outside the contract.
    #[serde(other)]
    Unrecognized,
}

/// `GET /api/digital-risk?district={district}&period={period}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DigitalRiskApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aadhaar_coverage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_usability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<ApiRiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_risk_population: Option<f64>,
}

/// JSON error body returned for non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_migration_body() {
        let body = serde_json::json!({
            "district": "patna",
            "netMigrationPercent": 12.4,
            "inflow": 15000,
            "outflow": 9580,
            "topSourceDistrict": "Gaya"
        });
        let parsed: MigrationApiResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.net_migration_percent, Some(12.4));
        assert_eq!(parsed.inflow, Some(15000.0));
        assert_eq!(parsed.top_source_district.as_deref(), Some("Gaya"));
    }

    #[test]
    fn missing_fields_are_absent_not_errors() {
        let parsed: PeriUrbanApiResponse =
            serde_json::from_value(serde_json::json!({ "district": "Gaya" })).unwrap();
        assert_eq!(parsed.district.as_deref(), Some("Gaya"));
        assert!(parsed.alert_status.is_none());
        assert!(parsed.growth_index.is_none());
    }

    #[test]
    fn unknown_risk_level_is_tolerated() {
        let parsed: DigitalRiskApiResponse =
            serde_json::from_value(serde_json::json!({ "riskLevel": "SEVERE" })).unwrap();
        assert_eq!(parsed.risk_level, Some(ApiRiskLevel::Unrecognized));
    }

    #[test]
    fn alert_status_uses_screaming_case() {
        let parsed: PeriUrbanApiResponse =
            serde_json::from_value(serde_json::json!({ "alertStatus": "ALERT" })).unwrap();
        assert_eq!(parsed.alert_status, Some(ApiAlertStatus::Alert));
    }
}
