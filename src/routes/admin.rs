use crate::config::Config;
use crate::helper::{admin_helpers, asset_helpers, public_helpers};
use crate::middleware::{AuthenticatedAdmin, ADMIN_ROLE};
use crate::models::Notification;
use crate::routes::{internal_error, ok_json};
use crate::DbPool;
use actix_csrf::extractor::{Csrf, CsrfGuarded, CsrfToken};
use actix_session::Session;
use actix_web::{web, HttpResponse, Responder};
use redb::Database;
use serde::Deserialize;
use tera::{Context, Tera};

#[derive(Deserialize)]
struct LoginForm {
    csrf_token: CsrfToken,
    username: String,
    password: String,
}

impl CsrfGuarded for LoginForm {
    fn csrf_token(&self) -> &CsrfToken {
        &self.csrf_token
    }
}

#[derive(Deserialize)]
struct SettingsForm {
    csrf_token: CsrfToken,
    max_file_upload_size_mb: String,
    #[serde(default)]
    allowed_mime_types: String,
}

impl CsrfGuarded for SettingsForm {
    fn csrf_token(&self) -> &CsrfToken {
        &self.csrf_token
    }
}

pub fn config_login(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::get().to(show_admin_login_form))
        .route("/login", web::post().to(handle_admin_login))
        .route("/logout", web::post().to(handle_admin_logout));
}

pub fn config_dashboard(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard", web::get().to(show_admin_dashboard))
        .route("/update_settings", web::post().to(update_settings_action));
}

pub fn config_analytics_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/analytics", web::get().to(get_analytics));
}

fn set_notification(session: &Session, message: &str, r#type: &str) {
    let notification = Notification { message: message.to_string(), r#type: r#type.to_string() };
    if let Err(e) = session.insert("notification", &notification) {
        log::error!("Failed to store notification in session: {}", e);
    }
}

fn redirect(location: String) -> HttpResponse {
    HttpResponse::Found().append_header(("location", location)).finish()
}

fn validate_settings(max_size: &str, mime_types: &str) -> Result<(), String> {
    match max_size.parse::<u64>() {
        Ok(size) if size > 0 && size <= admin_helpers::MAX_UPLOAD_MB_LIMIT => (),
        _ => {
            return Err(format!(
                "Invalid max file size. It must be a whole number from 1 to {}.",
                admin_helpers::MAX_UPLOAD_MB_LIMIT
            ))
        }
    }
    let unsupported: Vec<&str> = mime_types
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty() && !asset_helpers::is_storable_mime(&m.to_lowercase()))
        .collect();
    if !unsupported.is_empty() {
        return Err(format!("Unsupported MIME types: {}.", unsupported.join(", ")));
    }
    Ok(())
}

async fn update_settings_action(
    session: Session,
    pool: web::Data<DbPool>,
    form: Csrf<web::Form<SettingsForm>>,
    config: web::Data<Config>,
) -> impl Responder {
    let dashboard_url = config.admin_path("dashboard");
    let form = form.into_inner().into_inner();
    let max_size = form.max_file_upload_size_mb.trim();
    let mime_types = form.allowed_mime_types.trim();

    if let Err(message) = validate_settings(max_size, mime_types) {
        set_notification(&session, &message, "error");
        return redirect(dashboard_url);
    }

    let update_size_res = admin_helpers::update_setting(&pool, "max_file_upload_size_mb", max_size);
    let update_mimes_res = admin_helpers::update_setting(&pool, "allowed_mime_types", mime_types);

    match (update_size_res, update_mimes_res) {
        (Ok(_), Ok(_)) => set_notification(&session, "Settings updated successfully.", "success"),
        (size_res, mimes_res) => {
            log::error!("Failed to update settings: {:?} / {:?}", size_res.err(), mimes_res.err());
            set_notification(&session, "Failed to update settings in database.", "error");
        }
    }
    redirect(dashboard_url)
}

async fn show_admin_login_form(
    session: Session,
    tera: web::Data<Tera>,
    token: CsrfToken,
    config: web::Data<Config>,
) -> impl Responder {
    if session.get::<String>("role").unwrap_or(None).as_deref() == Some(ADMIN_ROLE) {
        return redirect(config.admin_path("dashboard"));
    }

    let mut ctx = Context::new();
    ctx.insert("admin_url_prefix", &config.admin_url_prefix);
    ctx.insert("csrf_token", token.get());

    if let Ok(Some(error)) = session.get::<String>("error") {
        ctx.insert("error", &error);
        session.remove("error");
    }

    match tera.render("admin/login.html", &ctx) {
        Ok(rendered) => HttpResponse::Ok().content_type("text/html; charset=utf-8").body(rendered),
        Err(e) => {
            log::error!("Template rendering error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

async fn handle_admin_login(
    session: Session,
    pool: web::Data<DbPool>,
    form: Csrf<web::Form<LoginForm>>,
    config: web::Data<Config>,
) -> impl Responder {
    let login_url = config.admin_path("login");
    let login_data = form.into_inner();

    let Some(username) = public_helpers::verify_admin_credentials(&pool, &login_data.username, &login_data.password) else {
        log::warn!("Failed admin login for '{}'", login_data.username);
        if let Err(e) = session.insert("error", "Invalid credentials or account suspended.") {
            log::error!("Failed to store login error in session: {}", e);
        }
        return redirect(login_url);
    };

    session.renew();
    if let Err(e) = session.insert("username", &username).and_then(|_| session.insert("role", ADMIN_ROLE)) {
        log::error!("Failed to start admin session for '{}': {}", username, e);
        return redirect(login_url);
    }
    session.remove("error");

    if let Err(e) = admin_helpers::record_login(&pool, &username) {
        log::warn!("Could not record login time for '{}': {}", username, e);
    }
    log::info!("Admin '{}' logged in", username);
    redirect(config.admin_path("dashboard"))
}

async fn handle_admin_logout(session: Session, config: web::Data<Config>) -> impl Responder {
    session.purge();
    redirect(config.admin_path("login"))
}

async fn show_admin_dashboard(
    auth_user: AuthenticatedAdmin,
    session: Session,
    tera: web::Data<Tera>,
    pool: web::Data<DbPool>,
    db: web::Data<Database>,
    token: CsrfToken,
    config: web::Data<Config>,
) -> impl Responder {
    let mut ctx = Context::new();
    ctx.insert("admin_url_prefix", &config.admin_url_prefix);
    ctx.insert("user", &auth_user);
    ctx.insert("csrf_token", token.get());

    if let Ok(Some(notification)) = session.get::<Notification>("notification") {
        ctx.insert("notification", &notification);
        session.remove("notification");
    }

    let settings = admin_helpers::fetch_settings(&pool).unwrap_or_else(|e| {
        log::error!("Could not load settings for dashboard: {}", e);
        admin_helpers::Settings {
            max_file_upload_size_mb: "0".to_string(),
            allowed_mime_types: "".to_string(),
        }
    });
    ctx.insert("settings", &settings);

    match admin_helpers::fetch_admins(&pool) {
        Ok(admins) => ctx.insert("admins", &admins),
        Err(e) => {
            log::error!("Failed to fetch admins for dashboard: {}", e);
            ctx.insert("admins", &Vec::<String>::new());
        }
    }

    match admin_helpers::collect_dashboard_stats(&pool, &db) {
        Ok(stats) => ctx.insert("stats", &stats),
        Err(e) => log::error!("Failed to collect dashboard stats: {}", e),
    }

    match tera.render("admin/dashboard.html", &ctx) {
        Ok(rendered) => HttpResponse::Ok().content_type("text/html; charset=utf-8").body(rendered),
        Err(err) => {
            log::error!("Template rendering error: {}", err);
            HttpResponse::InternalServerError().body("Error rendering admin dashboard.")
        }
    }
}

async fn get_analytics(pool: web::Data<DbPool>, db: web::Data<Database>) -> impl Responder {
    match admin_helpers::collect_dashboard_stats(&pool, &db) {
        Ok(stats) => ok_json(stats),
        Err(e) => {
            log::error!("Failed to collect analytics: {}", e);
            internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_need_positive_size_and_storable_mimes() {
        assert!(validate_settings("10", "image/jpeg, image/png").is_ok());
        assert!(validate_settings("10", "").is_ok());
        assert!(validate_settings("0", "image/png").is_err());
        assert!(validate_settings("ten", "image/png").is_err());
        assert!(validate_settings("2048", "image/png").is_ok());
        assert!(validate_settings("18000000000000", "image/png").is_err());
        let err = validate_settings("5", "image/png,text/html").unwrap_err();
        assert!(err.contains("text/html"));
    }
}
