use crate::cms::validation::ValidationIssue;
use crate::middleware::RequireAdminSession;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;

pub mod admin;
pub mod assets;
pub mod cms;
pub mod leads;
pub mod marketing;
pub mod properties;
pub mod public;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

pub fn ok_json<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse { success: true, data: Some(data), error: None })
}

pub fn error_json(mut builder: actix_web::HttpResponseBuilder, message: impl Into<String>) -> HttpResponse {
    builder.json(json!({ "success": false, "error": message.into() }))
}

pub fn invalid_json(issues: &[ValidationIssue]) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "success": false, "error": "Validation failed.", "issues": issues }))
}

pub fn internal_error() -> HttpResponse {
    error_json(HttpResponse::InternalServerError(), "An internal error occurred.")
}

/// JSON API of the admin area, mounted at `/management/{prefix}/api`.
pub fn config_admin_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(RequireAdminSession)
            .configure(cms::config_cms_api)
            .configure(assets::config_assets_api)
            .configure(properties::config_properties_api)
            .configure(leads::config_leads_api)
            .configure(marketing::config_marketing_api)
            .configure(admin::config_analytics_api),
    );
}
