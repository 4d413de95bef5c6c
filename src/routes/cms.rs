use crate::cms::url_check::check_url;
use crate::cms::{BlockType, EditorOutcome};
use crate::helper::cms_helpers::{self, BlockAction, EditRequest, EditResult};
use crate::middleware::AuthenticatedAdmin;
use crate::routes::{error_json, internal_error, ok_json};
use crate::{AppState, DbPool};
use actix_web::{web, HttpResponse, Responder};
use redb::Database;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct PageQuery {
    page: String,
}

#[derive(Deserialize)]
struct UrlCheckQuery {
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
struct ImportPreviewRequest {
    block_type: String,
    text: String,
}

pub fn config_cms_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cms")
            .route("/blocks", web::get().to(list_page_blocks))
            .route("/blocks/{id}", web::get().to(get_block))
            .route("/blocks/{id}/draft", web::post().to(save_block_draft))
            .route("/blocks/{id}/publish", web::post().to(publish_block))
            .route("/import/preview", web::post().to(preview_import))
            .route("/url-check", web::get().to(url_check)),
    );
}

async fn list_page_blocks(query: web::Query<PageQuery>, db: web::Data<Database>) -> impl Responder {
    match cms_helpers::fetch_page_editors(&db, &query.page) {
        Ok(slots) => ok_json(slots),
        Err(e) => {
            log::error!("Failed to load editors of page '{}': {}", query.page, e);
            internal_error()
        }
    }
}

async fn get_block(id: web::Path<String>, db: web::Data<Database>) -> impl Responder {
    match cms_helpers::fetch_block_editor(&db, &id) {
        Ok(Some(slot)) => ok_json(slot),
        Ok(None) => error_json(HttpResponse::NotFound(), "Block not found."),
        Err(e) => {
            log::error!("Failed to load block {}: {}", id, e);
            internal_error()
        }
    }
}

async fn save_block_draft(
    auth_user: AuthenticatedAdmin,
    id: web::Path<String>,
    body: Option<web::Json<EditRequest>>,
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    run_edit(auth_user, id.into_inner(), body, db, pool, app_state, BlockAction::SaveDraft).await
}

async fn publish_block(
    auth_user: AuthenticatedAdmin,
    id: web::Path<String>,
    body: Option<web::Json<EditRequest>>,
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    run_edit(auth_user, id.into_inner(), body, db, pool, app_state, BlockAction::Publish).await
}

async fn run_edit(
    auth_user: AuthenticatedAdmin,
    block_id: String,
    body: Option<web::Json<EditRequest>>,
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    app_state: web::Data<AppState>,
    action: BlockAction,
) -> HttpResponse {
    let request = body.map(web::Json::into_inner).unwrap_or_default();

    let result = web::block({
        let block_id = block_id.clone();
        move || cms_helpers::edit_block(&db, &pool, &app_state.block_locks, &block_id, request, action)
    })
    .await;

    let result = match result {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            log::error!("Failed to {:?} block {}: {}", action, block_id, e);
            return internal_error();
        }
        Err(e) => {
            log::error!("Blocking task for block {} failed: {}", block_id, e);
            return internal_error();
        }
    };

    match result {
        EditResult::NotFound => error_json(HttpResponse::NotFound(), "Block not found."),
        EditResult::Busy => {
            log::warn!("Block {} is already being saved", block_id);
            error_json(HttpResponse::Conflict(), "This block is being saved by another request. Try again.")
        }
        EditResult::Unrecognized(slot) => {
            HttpResponse::UnprocessableEntity().json(json!({ "success": false, "error": "Unknown block type.", "data": slot }))
        }
        EditResult::Rejected { index, error } => HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": error.to_string(),
            "command_index": index,
        })),
        EditResult::Done(response) => {
            let mut builder = match &response.outcome {
                EditorOutcome::Saved | EditorOutcome::Published => {
                    log::info!("Admin '{}' {:?} block {}", auth_user.username, action, block_id);
                    HttpResponse::Ok()
                }
                EditorOutcome::Invalid { .. } | EditorOutcome::Disabled { .. } => HttpResponse::BadRequest(),
                EditorOutcome::Busy => HttpResponse::Conflict(),
                EditorOutcome::Failed { message } => {
                    log::error!("Storing block {} failed: {}", block_id, message);
                    HttpResponse::InternalServerError()
                }
            };
            let success = matches!(response.outcome, EditorOutcome::Saved | EditorOutcome::Published);
            builder.json(json!({ "success": success, "data": response }))
        }
    }
}

async fn preview_import(body: web::Json<ImportPreviewRequest>) -> impl Responder {
    let Some(block_type) = BlockType::parse(&body.block_type) else {
        return error_json(HttpResponse::BadRequest(), format!("Unknown block type: {}", body.block_type));
    };
    match cms_helpers::preview_import(block_type, &body.text) {
        Some(preview) => ok_json(preview),
        None => error_json(HttpResponse::BadRequest(), format!("{} blocks do not support import.", block_type)),
    }
}

async fn url_check(query: web::Query<UrlCheckQuery>) -> impl Responder {
    let check = check_url(&query.value);
    ok_json(json!({ "check": check, "apply": check.apply() }))
}
