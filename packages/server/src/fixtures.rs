//! District records embedded into the server binary.

use std::collections::BTreeMap;

use saarthi_net_dashboard_models::api::{
    DigitalRiskApiResponse, MigrationApiResponse, PeriUrbanApiResponse,
};
use serde::Deserialize;

const DISTRICTS_TOML: &str = include_str!("../fixtures/districts.toml");

/// The three dataset records of one district. A missing table serves an
/// empty record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DistrictRecord {
    pub migration: MigrationApiResponse,
    pub peri_urban: PeriUrbanApiResponse,
    pub digital_risk: DigitalRiskApiResponse,
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    districts: BTreeMap<String, DistrictRecord>,
}

/// Records keyed by lowercase district identifier.
#[derive(Debug, Clone, Default)]
pub struct DistrictFixtures {
    districts: BTreeMap<String, DistrictRecord>,
}

impl DistrictFixtures {
    /// Parses the fixtures compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns a [`toml::de::Error`] if the embedded file is malformed.
    pub fn embedded() -> Result<Self, toml::de::Error> {
        Self::parse(DISTRICTS_TOML)
    }

    /// Parses a fixture document.
    ///
    /// # Errors
    ///
    /// Returns a [`toml::de::Error`] if `text` is not valid TOML or does
    /// not match the record schema.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let file: FixtureFile = toml::de::from_str(text)?;
        let districts = file
            .districts
            .into_iter()
            .map(|(id, record)| (id.to_ascii_lowercase(), record))
            .collect();
        Ok(Self { districts })
    }

    /// Looks up a district, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, district: &str) -> Option<&DistrictRecord> {
        self.districts.get(&district.trim().to_ascii_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.districts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    pub fn district_ids(&self) -> impl Iterator<Item = &str> {
        self.districts.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saarthi_net_dashboard_models::DISTRICT_OPTIONS;
    use saarthi_net_dashboard_models::api::ApiAlertStatus;

    #[test]
    fn embedded_fixtures_cover_every_selectable_district() {
        let fixtures = DistrictFixtures::embedded().unwrap();
        for option in DISTRICT_OPTIONS {
            assert!(fixtures.get(option.value).is_some(), "{}", option.value);
        }
    }

    #[test]
    fn patna_record_matches_reference_values() {
        let fixtures = DistrictFixtures::embedded().unwrap();
        let patna = fixtures.get("Patna").unwrap();

        assert_eq!(patna.migration.net_migration_percent, Some(12.4));
        assert_eq!(patna.migration.inflow, Some(15_000.0));
        assert_eq!(patna.peri_urban.alert_status, Some(ApiAlertStatus::Alert));
        assert_eq!(patna.peri_urban.affected_zones, Some(3));
    }

    #[test]
    fn missing_tables_default_to_empty_records() {
        let fixtures = DistrictFixtures::embedded().unwrap();
        let darbhanga = fixtures.get("darbhanga").unwrap();
        assert_eq!(darbhanga.peri_urban, PeriUrbanApiResponse::default());
    }

    #[test]
    fn rejects_malformed_records() {
        let err = DistrictFixtures::parse("[districts.x.migration]\ninflow = \"many\"\n");
        assert!(err.is_err());
    }
}
