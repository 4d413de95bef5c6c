#![allow(dead_code)]

use auctionsite_backend::models::{AuctionModality, PropertyInput, PropertyType};
use auctionsite_backend::setup::db_setup;
use auctionsite_backend::DbPool;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use redb::Database;
use std::path::Path;

pub fn site_pool(dir: &Path) -> DbPool {
    let manager = SqliteConnectionManager::file(dir.join("site.db"))
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = Pool::builder().max_size(4).build(manager).expect("pool");
    let mut conn = pool.get().expect("connection");
    db_setup::setup_site_db(&mut conn).expect("site schema");
    pool
}

pub fn content_db(dir: &Path) -> Database {
    let db = Database::create(dir.join("content.db")).expect("content db");
    db_setup::setup_content_db(&db).expect("content tables");
    db
}

pub fn property(title: &str, neighborhood: &str, first_price: i64) -> PropertyInput {
    PropertyInput {
        title: title.to_string(),
        description: String::new(),
        property_type: PropertyType::Apartamento,
        city: "Rio de Janeiro".to_string(),
        neighborhood: neighborhood.to_string(),
        address: String::new(),
        area_m2: None,
        bedrooms: Some(2),
        first_auction_price: first_price,
        second_auction_price: None,
        appraisal_value: None,
        auction_type: AuctionModality::Extrajudicial,
        first_auction_at: None,
        second_auction_at: None,
        image_urls: Vec::new(),
        notice_url: None,
        is_active: true,
    }
}
