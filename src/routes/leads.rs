use crate::helper::lead_helpers;
use crate::routes::{internal_error, ok_json};
use crate::DbPool;
use actix_web::{web, Responder};
use serde::Deserialize;

const LEADS_PER_PAGE: u32 = 50;

#[derive(Deserialize)]
struct LeadQuery {
    property_id: Option<String>,
    page: Option<u32>,
}

pub fn config_leads_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/leads", web::get().to(list_leads));
}

async fn list_leads(query: web::Query<LeadQuery>, pool: web::Data<DbPool>) -> impl Responder {
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1).saturating_mul(LEADS_PER_PAGE);
    let property_id = query.property_id.as_deref().map(str::trim).filter(|s| !s.is_empty());

    match lead_helpers::fetch_leads(&pool, property_id, LEADS_PER_PAGE, offset) {
        Ok(leads) => ok_json(leads),
        Err(e) => {
            log::error!("Failed to list leads: {}", e);
            internal_error()
        }
    }
}
