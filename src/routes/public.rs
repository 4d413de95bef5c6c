use crate::catalog::filters::{FilterSet, SortOrder, PRICE_PRESETS};
use crate::catalog::zones::ZONES;
use crate::helper::{cms_helpers, lead_helpers, public_helpers};
use crate::models::{AuctionModality, LeadInput, PropertyType};
use crate::routes::{error_json, internal_error, invalid_json, ok_json};
use crate::{AppState, DbPool};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use redb::Database;
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct Location {
    city: String,
    neighborhood: String,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/is_server_active", web::get().to(is_server_active))
            .route("/properties", web::get().to(search_properties))
            .route("/properties/{id}", web::get().to(get_property_by_id))
            .route("/catalog/zones", web::get().to(get_zones))
            .route("/catalog/filters", web::get().to(get_filter_options))
            .route("/pages/{page}/blocks", web::get().to(get_page_blocks))
            .route("/leads", web::post().to(submit_lead)),
    );
}

async fn is_server_active() -> impl Responder {
    HttpResponse::Ok().body("active")
}

/// Catalog search. The query string is the filter state; the response echoes
/// its canonical form so the client can keep the URL in sync.
async fn search_properties(req: HttpRequest, pool: web::Data<DbPool>, app_state: web::Data<AppState>) -> impl Responder {
    let filters = FilterSet::from_query_string(req.query_string());

    match public_helpers::search_public_catalog(&pool, &filters, app_state.catalog_page_size) {
        Ok(page) => ok_json(page),
        Err(e) => {
            log::error!("Failed to search catalog '{}': {}", req.query_string(), e);
            internal_error()
        }
    }
}

async fn get_property_by_id(id: web::Path<String>, pool: web::Data<DbPool>) -> impl Responder {
    match public_helpers::fetch_active_property(&pool, &id) {
        Ok(Some(property)) => ok_json(property),
        Ok(None) => error_json(HttpResponse::NotFound(), "Property not found."),
        Err(e) => {
            log::error!("Failed to fetch property {}: {}", id, e);
            internal_error()
        }
    }
}

async fn get_zones() -> impl Responder {
    ok_json(ZONES)
}

/// Dropdown options plus the canonical form of the given filters.
async fn get_filter_options(req: HttpRequest, pool: web::Data<DbPool>) -> impl Responder {
    let filters = FilterSet::from_query_string(req.query_string());

    let locations: Vec<Location> = match public_helpers::fetch_locations(&pool) {
        Ok(pairs) => pairs.into_iter().map(|(city, neighborhood)| Location { city, neighborhood }).collect(),
        Err(e) => {
            log::error!("Failed to fetch catalog locations: {}", e);
            return internal_error();
        }
    };

    let sort_orders: Vec<&str> = [SortOrder::AuctionDate, SortOrder::PriceAsc, SortOrder::PriceDesc, SortOrder::Newest]
        .into_iter()
        .map(SortOrder::as_str)
        .collect();

    ok_json(json!({
        "filters": filters,
        "query": filters.to_query_string(),
        "locations": locations,
        "property_types": PropertyType::ALL,
        "auction_types": AuctionModality::ALL,
        "price_ranges": PRICE_PRESETS.iter().map(|p| json!({"label": p.label, "min": p.range.min, "max": p.range.max})).collect::<Vec<_>>(),
        "sort_orders": sort_orders,
    }))
}

async fn get_page_blocks(page: web::Path<String>, db: web::Data<Database>) -> impl Responder {
    match cms_helpers::fetch_published_page(&db, &page) {
        Ok(blocks) => ok_json(blocks),
        Err(e) => {
            log::error!("Failed to load blocks of page '{}': {}", page, e);
            internal_error()
        }
    }
}

async fn submit_lead(pool: web::Data<DbPool>, input: web::Json<LeadInput>) -> impl Responder {
    let lead = match lead_helpers::validate_lead(&input) {
        Ok(lead) => lead,
        Err(issues) => return invalid_json(&issues),
    };

    match lead_helpers::record_lead(&pool, lead) {
        Ok(lead) => HttpResponse::Created().json(json!({ "success": true, "data": { "id": lead.id } })),
        Err(e) => {
            log::error!("Failed to record lead: {}", e);
            internal_error()
        }
    }
}
