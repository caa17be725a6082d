//! HTTP handler functions for the dashboard API.

use actix_web::{HttpResponse, web};
use saarthi_net_dashboard_models::Period;
use saarthi_net_dashboard_models::api::{ApiErrorBody, ApiRequestParams};
use serde::Serialize;

use crate::AppState;
use crate::fixtures::DistrictRecord;

#[derive(Debug, Serialize)]
pub struct ApiHealth {
    pub healthy: bool,
    pub version: String,
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/migration`
pub async fn migration(
    state: web::Data<AppState>,
    params: web::Query<ApiRequestParams>,
) -> HttpResponse {
    with_record(&state, &params, |record| {
        HttpResponse::Ok().json(&record.migration)
    })
}

/// `GET /api/peri-urban`
pub async fn peri_urban(
    state: web::Data<AppState>,
    params: web::Query<ApiRequestParams>,
) -> HttpResponse {
    with_record(&state, &params, |record| {
        HttpResponse::Ok().json(&record.peri_urban)
    })
}

/// `GET /api/digital-risk`
pub async fn digital_risk(
    state: web::Data<AppState>,
    params: web::Query<ApiRequestParams>,
) -> HttpResponse {
    with_record(&state, &params, |record| {
        HttpResponse::Ok().json(&record.digital_risk)
    })
}

/// Validates `district` and `period`, then answers from the district's
/// record.
fn with_record(
    state: &AppState,
    params: &ApiRequestParams,
    respond: impl FnOnce(&DistrictRecord) -> HttpResponse,
) -> HttpResponse {
    let Some(district) = non_blank(params.district.as_deref()) else {
        return bad_request("Missing required parameter: district", "MISSING_PARAMETER");
    };
    let Some(period) = non_blank(params.period.as_deref()) else {
        return bad_request("Missing required parameter: period", "MISSING_PARAMETER");
    };
    if !Period::is_valid(period) {
        return bad_request(
            &format!("Invalid period {period:?}, expected one of 7d, 30d, 90d, 1y"),
            "INVALID_PERIOD",
        );
    }

    match state.fixtures.get(district) {
        Some(record) => respond(record),
        None => {
            log::debug!("No fixture for district {district:?}");
            HttpResponse::NotFound().json(ApiErrorBody {
                message: format!("Unknown district: {district}"),
                code: Some("UNKNOWN_DISTRICT".to_string()),
            })
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn bad_request(message: &str, code: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiErrorBody {
        message: message.to_string(),
        code: Some(code.to_string()),
    })
}
