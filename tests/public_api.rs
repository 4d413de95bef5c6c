mod common;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{http::StatusCode, test, web, App};
use auctionsite_backend::helper::property_helpers;
use auctionsite_backend::models::db_operations::blocks_db_operations;
use auctionsite_backend::{routes, AppState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::tempdir;

#[actix_web::test]
async fn catalog_search_returns_a_page_and_its_canonical_query() {
    let dir = tempdir().unwrap();
    let pool = common::site_pool(dir.path());
    let db = common::content_db(dir.path());
    for (title, neighborhood, price) in [
        ("Conjugado em Copacabana", "Copacabana", 250_000),
        ("Apartamento em Botafogo", "Botafogo", 380_000),
        ("Loja no Flamengo", "Flamengo", 610_000),
        ("Sala na Tijuca", "Tijuca", 150_000),
    ] {
        property_helpers::create_property(&pool, &common::property(title, neighborhood, price)).unwrap();
    }

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(db))
            .app_data(web::Data::new(AppState::new(2)))
            .configure(routes::public::config_api),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/properties?zone=zona-sul&sort=menor-preco&page=2&utm_source=x")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["items"][0]["title"], "Loja no Flamengo");
    assert_eq!(body["data"]["query"], "zones%5B%5D=zona-sul&sort=menor-preco&page=2");
}

#[actix_web::test]
async fn inactive_properties_are_hidden_from_detail_pages() {
    let dir = tempdir().unwrap();
    let pool = common::site_pool(dir.path());
    let db = common::content_db(dir.path());
    let mut listing = common::property("Casa em Bangu", "Bangu", 200_000);
    listing.is_active = false;
    let id = property_helpers::create_property(&pool, &listing).unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(db))
            .app_data(web::Data::new(AppState::new(12)))
            .configure(routes::public::config_api),
    )
    .await;

    let req = test::TestRequest::get().uri(&format!("/api/properties/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn leads_are_validated_before_they_are_stored() {
    let dir = tempdir().unwrap();
    let pool = common::site_pool(dir.path());
    let db = common::content_db(dir.path());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(db))
            .app_data(web::Data::new(AppState::new(12)))
            .configure(routes::public::config_api),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/leads")
        .set_json(json!({ "name": "Ana", "email": "ana@", "message": "Olá" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["issues"][0]["field"], "email");

    let req = test::TestRequest::post()
        .uri("/api/leads")
        .set_json(json!({ "name": "Ana", "phone": "(21) 99876-5432", "property_id": "unknown" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn pages_render_only_published_content() {
    let dir = tempdir().unwrap();
    let pool = common::site_pool(dir.path());
    let db = common::content_db(dir.path());
    let title = blocks_db_operations::create_block(&db, "faq", "title", "text").unwrap();
    blocks_db_operations::create_block(&db, "faq", "questions", "faq").unwrap();
    blocks_db_operations::save_draft(&db, &title.id, &json!({ "value": "Dúvidas <frequentes>" })).unwrap();
    blocks_db_operations::publish(&db, &title.id).unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(db))
            .app_data(web::Data::new(AppState::new(12)))
            .configure(routes::public::config_api),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/pages/faq/blocks").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let blocks = body["data"].as_array().expect("block list");

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["block_key"], "questions");
    assert_eq!(blocks[0]["status"], "empty");
    assert_eq!(blocks[1]["block_key"], "title");
    assert_eq!(blocks[1]["status"], "ready");
    assert!(blocks[1]["html"].as_str().unwrap().contains("&lt;frequentes&gt;"));
}

#[actix_web::test]
async fn admin_api_requires_a_session() {
    let dir = tempdir().unwrap();
    let pool = common::site_pool(dir.path());
    let db = common::content_db(dir.path());

    let app = test::init_service(
        App::new()
            .wrap(SessionMiddleware::new(CookieSessionStore::default(), Key::generate()))
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(db))
            .app_data(web::Data::new(AppState::new(12)))
            .configure(routes::config_admin_api),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/cms/blocks?page=home").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}
