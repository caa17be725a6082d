//! Insight records displayed by the dashboard cards.
//!
//! Conversions from the [`crate::api`] responses only rename and format
//! fields. The two derived values are total movement (`inflow + outflow`)
//! and the trend direction (sign of the net migration percentage).

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::api::{
    ApiAlertStatus, ApiRiskLevel, DigitalRiskApiResponse, MigrationApiResponse,
    PeriUrbanApiResponse,
};
use crate::format::group_thousands;

/// Direction of net migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// `Up` for a non-negative percentage, `Down` otherwise.
    #[must_use]
    pub fn from_net_percent(percent: f64) -> Self {
        if percent >= 0.0 { Self::Up } else { Self::Down }
    }
}

/// Peri-urban alert as shown on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
pub enum AlertStatus {
    Detected,
    #[strum(serialize = "None")]
    NotDetected,
}

/// Digital exclusion risk level as shown on the card.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Maps the API enum; values outside the fixed table yield `None`.
    #[must_use]
    pub const fn from_api(level: ApiRiskLevel) -> Option<Self> {
        match level {
            ApiRiskLevel::Low => Some(Self::Low),
            ApiRiskLevel::Medium => Some(Self::Medium),
            ApiRiskLevel::High => Some(Self::High),
            ApiRiskLevel::Unrecognized => None,
        }
    }
}

/// Migration card data. The all-`None` [`Default`] is the fallback record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationData {
    pub net_migration_percent: Option<f64>,
    pub trend: Option<Trend>,
    pub top_source_district: Option<String>,
    /// `inflow + outflow`, grouped (`"24,580"`).
    pub total_movement: Option<String>,
    pub inflow: Option<f64>,
    pub outflow: Option<f64>,
}

impl From<MigrationApiResponse> for MigrationData {
    fn from(response: MigrationApiResponse) -> Self {
        let total_movement = match (response.inflow, response.outflow) {
            (Some(inflow), Some(outflow)) => Some(group_thousands(inflow + outflow)),
            _ => None,
        };

        Self {
            net_migration_percent: response.net_migration_percent,
            trend: response.net_migration_percent.map(Trend::from_net_percent),
            top_source_district: response.top_source_district,
            total_movement,
            inflow: response.inflow,
            outflow: response.outflow,
        }
    }
}

/// Peri-urban card data. The all-`None` [`Default`] is the fallback record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriUrbanData {
    pub alert_status: Option<AlertStatus>,
    pub growth_index: Option<f64>,
    pub affected_zones: Option<u32>,
    /// Only present while an alert is raised.
    pub explanation: Option<String>,
}

impl From<PeriUrbanApiResponse> for PeriUrbanData {
    fn from(response: PeriUrbanApiResponse) -> Self {
        let alert_status = match response.alert_status {
            Some(ApiAlertStatus::Alert) => Some(AlertStatus::Detected),
            Some(ApiAlertStatus::None) => Some(AlertStatus::NotDetected),
            Some(ApiAlertStatus::Unrecognized) | None => None,
        };

        let explanation = if alert_status == Some(AlertStatus::Detected) {
            Some(alert_explanation(
                response.affected_zones,
                response.district.as_deref(),
            ))
        } else {
            None
        };

        Self {
            alert_status,
            growth_index: response.growth_index,
            affected_zones: response.affected_zones,
            explanation,
        }
    }
}

/// Builds the alert sentence, e.g. "Elevated growth pattern identified in
/// 3 peripheral zones of Patna district."
#[must_use]
pub fn alert_explanation(affected_zones: Option<u32>, district: Option<&str>) -> String {
    let district = district.unwrap_or("the selected");
    match affected_zones {
        Some(zones) => {
            let plural = if zones > 1 { "s" } else { "" };
            format!(
                "Elevated growth pattern identified in {zones} peripheral zone{plural} of {district} district."
            )
        }
        None => format!("Elevated growth pattern identified in peripheral zones of {district} district."),
    }
}

/// Digital exclusion card data. The all-`None` [`Default`] is the fallback
/// record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalExclusionData {
    pub aadhaar_coverage: Option<f64>,
    pub digital_usability: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    /// Grouped population count (`"182,400"`).
    pub at_risk_population: Option<String>,
}

impl From<DigitalRiskApiResponse> for DigitalExclusionData {
    fn from(response: DigitalRiskApiResponse) -> Self {
        Self {
            aadhaar_coverage: response.aadhaar_coverage,
            digital_usability: response.digital_usability,
            risk_level: response.risk_level.and_then(RiskLevel::from_api),
            at_risk_population: response.at_risk_population.map(group_thousands),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patna_migration_scenario() {
        let data = MigrationData::from(MigrationApiResponse {
            district: Some("patna".to_string()),
            net_migration_percent: Some(12.4),
            inflow: Some(15_000.0),
            outflow: Some(9_580.0),
            top_source_district: Some("Gaya".to_string()),
        });

        assert_eq!(data.trend, Some(Trend::Up));
        assert_eq!(data.total_movement.as_deref(), Some("24,580"));
        assert_eq!(data.top_source_district.as_deref(), Some("Gaya"));
    }

    #[test]
    fn negative_net_migration_trends_down() {
        let data = MigrationData::from(MigrationApiResponse {
            net_migration_percent: Some(-3.0),
            ..MigrationApiResponse::default()
        });
        assert_eq!(data.trend, Some(Trend::Down));
        assert!(data.total_movement.is_none());
    }

    #[test]
    fn alert_explanation_pluralizes_zones() {
        let data = PeriUrbanData::from(PeriUrbanApiResponse {
            district: Some("Patna".to_string()),
            alert_status: Some(ApiAlertStatus::Alert),
            growth_index: Some(0.73),
            affected_zones: Some(3),
        });
        assert_eq!(data.alert_status, Some(AlertStatus::Detected));
        assert_eq!(
            data.explanation.as_deref(),
            Some("Elevated growth pattern identified in 3 peripheral zones of Patna district.")
        );

        assert_eq!(
            alert_explanation(Some(1), Some("Gaya")),
            "Elevated growth pattern identified in 1 peripheral zone of Gaya district."
        );
    }

    #[test]
    fn no_explanation_without_alert() {
        let data = PeriUrbanData::from(PeriUrbanApiResponse {
            district: Some("Gaya".to_string()),
            alert_status: Some(ApiAlertStatus::None),
            growth_index: Some(0.2),
            affected_zones: Some(0),
        });
        assert_eq!(data.alert_status, Some(AlertStatus::NotDetected));
        assert!(data.explanation.is_none());
        assert_eq!(AlertStatus::NotDetected.to_string(), "None");
    }

    #[test]
    fn risk_level_table() {
        assert_eq!(RiskLevel::from_api(ApiRiskLevel::Low), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::from_api(ApiRiskLevel::High), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_api(ApiRiskLevel::Unrecognized), None);

        let data = DigitalExclusionData::from(DigitalRiskApiResponse {
            risk_level: Some(ApiRiskLevel::Unrecognized),
            at_risk_population: Some(182_400.0),
            ..DigitalRiskApiResponse::default()
        });
        assert!(data.risk_level.is_none());
        assert_eq!(data.at_risk_population.as_deref(), Some("182,400"));
    }

    #[test]
    fn fallback_records_are_all_none() {
        assert_eq!(
            MigrationData::default(),
            MigrationData::from(MigrationApiResponse::default())
        );
        assert_eq!(
            DigitalExclusionData::default(),
            DigitalExclusionData::from(DigitalRiskApiResponse::default())
        );
    }
}
