use crate::config::Config;
use crate::helper::asset_helpers::{self, AssetError, AssetSelection};
use crate::routes::{error_json, internal_error, ok_json};
use crate::DbPool;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

const ASSETS_PER_PAGE: u32 = 48;

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    page: Option<u32>,
}

#[derive(Deserialize)]
struct MetadataForm {
    #[serde(default)]
    alt_text: String,
    #[serde(default)]
    title: String,
}

pub fn config_assets_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/assets", web::get().to(list_assets))
        .route("/assets", web::post().to(upload_asset))
        .route("/assets/{id}", web::post().to(update_asset))
        .route("/assets/{id}", web::delete().to(delete_asset))
        .route("/assets/{id}/select", web::get().to(select_asset));
}

fn asset_error_response(action: &str, e: AssetError) -> HttpResponse {
    if e.is_rejection() {
        error_json(HttpResponse::BadRequest(), e.to_string())
    } else {
        log::error!("Failed to {} asset: {}", action, e);
        internal_error()
    }
}

async fn list_assets(query: web::Query<ListQuery>, pool: web::Data<DbPool>) -> impl Responder {
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1).saturating_mul(ASSETS_PER_PAGE);

    match asset_helpers::fetch_assets(&pool, ASSETS_PER_PAGE, offset) {
        Ok(assets) => ok_json(json!({ "items": assets, "page": page, "per_page": ASSETS_PER_PAGE })),
        Err(e) => asset_error_response("list", e),
    }
}

async fn upload_asset(payload: Multipart, pool: web::Data<DbPool>, config: web::Data<Config>) -> impl Responder {
    match asset_helpers::save_asset(&config.media_path, &pool, payload).await {
        Ok(asset) => HttpResponse::Created().json(json!({ "success": true, "data": asset })),
        Err(e) => asset_error_response("upload", e),
    }
}

async fn update_asset(id: web::Path<String>, form: web::Json<MetadataForm>, pool: web::Data<DbPool>) -> impl Responder {
    match asset_helpers::update_asset_metadata(&pool, &id, &form.alt_text, &form.title) {
        Ok(true) => match asset_helpers::fetch_asset(&pool, &id) {
            Ok(Some(asset)) => ok_json(asset),
            Ok(None) => error_json(HttpResponse::NotFound(), "Asset not found."),
            Err(e) => asset_error_response("reload", e),
        },
        Ok(false) => error_json(HttpResponse::NotFound(), "Asset not found."),
        Err(e) => asset_error_response("update", e),
    }
}

async fn delete_asset(id: web::Path<String>, pool: web::Data<DbPool>, config: web::Data<Config>) -> impl Responder {
    match asset_helpers::delete_asset(&config.media_path, &pool, &id).await {
        Ok(true) => ok_json(json!({ "id": id.into_inner() })),
        Ok(false) => error_json(HttpResponse::NotFound(), "Asset not found."),
        Err(e) => asset_error_response("delete", e),
    }
}

/// What the picker returns to an image block: id, url and alt text.
async fn select_asset(id: web::Path<String>, pool: web::Data<DbPool>) -> impl Responder {
    match asset_helpers::fetch_asset(&pool, &id) {
        Ok(Some(asset)) => ok_json(AssetSelection::from(&asset)),
        Ok(None) => error_json(HttpResponse::NotFound(), "Asset not found."),
        Err(e) => asset_error_response("select", e),
    }
}
