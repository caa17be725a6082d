//! Backend client.
//!
//! [`DashboardApi`] is the seam between the query layer and the network:
//! the dashboard uses [`HttpDashboardApi`], tests substitute in-memory
//! implementations. One call is one attempt; retries are applied by the
//! caller through [`crate::retry`].

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use saarthi_net_dashboard_models::RequestKey;
use saarthi_net_dashboard_models::api::{
    DIGITAL_RISK_ENDPOINT, DigitalRiskApiResponse, MIGRATION_ENDPOINT, MigrationApiResponse,
    PERI_URBAN_ENDPOINT, PeriUrbanApiResponse,
};
use serde::de::DeserializeOwned;

use crate::ApiError;
use crate::config::{ApiConfig, build_api_url};

/// Read access to the three dashboard datasets.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/migration`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the status is not 2xx.
    async fn fetch_migration(&self, key: &RequestKey) -> Result<MigrationApiResponse, ApiError>;

    /// `GET /api/peri-urban`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the status is not 2xx.
    async fn fetch_peri_urban(&self, key: &RequestKey) -> Result<PeriUrbanApiResponse, ApiError>;

    /// `GET /api/digital-risk`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the status is not 2xx.
    async fn fetch_digital_risk(
        &self,
        key: &RequestKey,
    ) -> Result<DigitalRiskApiResponse, ApiError>;
}

/// [`DashboardApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDashboardApi {
    /// Builds a client for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest` client cannot
    /// be constructed, or [`ApiError::InvalidUrl`] if the base URL does not
    /// parse.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        build_api_url(&config.base_url, MIGRATION_ENDPOINT, &[])?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        key: &RequestKey,
    ) -> Result<T, ApiError> {
        let period = key.period.to_string();
        let url = build_api_url(
            &self.base_url,
            endpoint,
            &[("district", key.district.as_str()), ("period", period.as_str())],
        )?;
        log::debug!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            log::warn!(
                "Failed to parse response from {url} ({} bytes): {e}",
                text.len()
            );
            ApiError::Json(e)
        })
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_migration(&self, key: &RequestKey) -> Result<MigrationApiResponse, ApiError> {
        self.get_json(MIGRATION_ENDPOINT, key).await
    }

    async fn fetch_peri_urban(&self, key: &RequestKey) -> Result<PeriUrbanApiResponse, ApiError> {
        self.get_json(PERI_URBAN_ENDPOINT, key).await
    }

    async fn fetch_digital_risk(
        &self,
        key: &RequestKey,
    ) -> Result<DigitalRiskApiResponse, ApiError> {
        self.get_json(DIGITAL_RISK_ENDPOINT, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_base_url() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(
            HttpDashboardApi::new(&config),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn keeps_configured_base_url() {
        let api = HttpDashboardApi::new(&ApiConfig::default()).unwrap();
        assert_eq!(api.base_url(), "http://127.0.0.1:8080");
    }
}
