use crate::catalog::FilterSet;
use crate::helper::property_helpers;
use crate::models::PropertyInput;
use crate::routes::{error_json, internal_error, invalid_json, ok_json};
use crate::{AppState, DbPool};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct ActiveForm {
    is_active: bool,
}

pub fn config_properties_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/properties", web::get().to(list_properties))
        .route("/properties", web::post().to(create_property))
        .route("/properties/{id}", web::get().to(get_property))
        .route("/properties/{id}", web::put().to(update_property))
        .route("/properties/{id}", web::delete().to(delete_property))
        .route("/properties/{id}/active", web::post().to(set_active));
}

/// Same filters as the public catalog, inactive listings included.
async fn list_properties(req: HttpRequest, pool: web::Data<DbPool>, app_state: web::Data<AppState>) -> impl Responder {
    let filters = FilterSet::from_query_string(req.query_string());
    match property_helpers::search_all_properties(&pool, &filters, app_state.catalog_page_size) {
        Ok(page) => ok_json(page),
        Err(e) => {
            log::error!("Failed to list properties: {}", e);
            internal_error()
        }
    }
}

async fn get_property(id: web::Path<String>, pool: web::Data<DbPool>) -> impl Responder {
    match property_helpers::fetch_property(&pool, &id) {
        Ok(Some(property)) => ok_json(property),
        Ok(None) => error_json(HttpResponse::NotFound(), "Property not found."),
        Err(e) => {
            log::error!("Failed to fetch property {}: {}", id, e);
            internal_error()
        }
    }
}

async fn create_property(input: web::Json<PropertyInput>, pool: web::Data<DbPool>) -> impl Responder {
    let issues = property_helpers::validate_property_input(&input);
    if !issues.is_empty() {
        return invalid_json(&issues);
    }
    match property_helpers::create_property(&pool, &input) {
        Ok(id) => {
            log::info!("Created property {} ('{}')", id, input.title);
            HttpResponse::Created().json(json!({ "success": true, "data": { "id": id } }))
        }
        Err(e) => {
            log::error!("Failed to create property '{}': {}", input.title, e);
            internal_error()
        }
    }
}

async fn update_property(id: web::Path<String>, input: web::Json<PropertyInput>, pool: web::Data<DbPool>) -> impl Responder {
    let issues = property_helpers::validate_property_input(&input);
    if !issues.is_empty() {
        return invalid_json(&issues);
    }
    match property_helpers::update_property(&pool, &id, &input) {
        Ok(true) => {
            log::info!("Updated property {}", id);
            ok_json(json!({ "id": id.into_inner() }))
        }
        Ok(false) => error_json(HttpResponse::NotFound(), "Property not found."),
        Err(e) => {
            log::error!("Failed to update property {}: {}", id, e);
            internal_error()
        }
    }
}

async fn set_active(id: web::Path<String>, form: web::Json<ActiveForm>, pool: web::Data<DbPool>) -> impl Responder {
    match property_helpers::set_property_active(&pool, &id, form.is_active) {
        Ok(true) => ok_json(json!({ "id": id.into_inner(), "is_active": form.is_active })),
        Ok(false) => error_json(HttpResponse::NotFound(), "Property not found."),
        Err(e) => {
            log::error!("Failed to toggle property {}: {}", id, e);
            internal_error()
        }
    }
}

async fn delete_property(id: web::Path<String>, pool: web::Data<DbPool>) -> impl Responder {
    match property_helpers::delete_property(&pool, &id) {
        Ok(0) => error_json(HttpResponse::NotFound(), "Property not found."),
        Ok(_) => {
            log::info!("Deleted property {}", id);
            ok_json(json!({ "id": id.into_inner() }))
        }
        Err(e) => {
            log::error!("Failed to delete property {}: {}", id, e);
            internal_error()
        }
    }
}
