use crate::helper::marketing_helpers::{self, CancelOutcome, ScheduleInput, ScheduleView};
use crate::cms::validation::ValidationIssue;
use crate::routes::{error_json, internal_error, invalid_json, ok_json};
use crate::DbPool;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

pub fn config_marketing_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/marketing")
            .route("/schedules", web::get().to(list_schedules))
            .route("/schedules", web::post().to(create_schedule))
            .route("/schedules/{id}/cancel", web::post().to(cancel_schedule))
            .route("/process-due", web::post().to(process_due)),
    );
}

async fn list_schedules(pool: web::Data<DbPool>) -> impl Responder {
    match marketing_helpers::fetch_schedules(&pool) {
        Ok(schedules) => ok_json(schedules),
        Err(e) => {
            log::error!("Failed to list schedules: {}", e);
            internal_error()
        }
    }
}

async fn create_schedule(input: web::Json<ScheduleInput>, pool: web::Data<DbPool>) -> impl Responder {
    let schedule = match marketing_helpers::build_schedule(&input, Utc::now()) {
        Ok(schedule) => schedule,
        Err(issues) => return invalid_json(&issues),
    };

    match marketing_helpers::save_schedule(&pool, &schedule) {
        Ok(true) => HttpResponse::Created().json(json!({ "success": true, "data": ScheduleView::from(schedule) })),
        Ok(false) => invalid_json(&[ValidationIssue::new("audience", "The selected property does not exist.")]),
        Err(e) => {
            log::error!("Failed to save schedule '{}': {}", schedule.name, e);
            internal_error()
        }
    }
}

async fn cancel_schedule(id: web::Path<String>, pool: web::Data<DbPool>) -> impl Responder {
    match marketing_helpers::cancel_schedule(&pool, &id) {
        Ok(CancelOutcome::Cancelled) => ok_json(json!({ "id": id.into_inner(), "status": "cancelled" })),
        Ok(CancelOutcome::NotFound) => error_json(HttpResponse::NotFound(), "Schedule not found."),
        Ok(CancelOutcome::NotPending(status)) => error_json(
            HttpResponse::Conflict(),
            format!("Only pending schedules can be cancelled (this one is {}).", status.as_str()),
        ),
        Err(e) => {
            log::error!("Failed to cancel schedule {}: {}", id, e);
            internal_error()
        }
    }
}

async fn process_due(pool: web::Data<DbPool>) -> impl Responder {
    let result = web::block({
        let pool = pool.clone();
        move || marketing_helpers::process_due(&pool, Utc::now())
    })
    .await;

    match result {
        Ok(Ok(dispatches)) => ok_json(dispatches),
        Ok(Err(e)) => {
            log::error!("Failed to process due schedules: {}", e);
            internal_error()
        }
        Err(e) => {
            log::error!("Blocking task for due schedules failed: {}", e);
            internal_error()
        }
    }
}
