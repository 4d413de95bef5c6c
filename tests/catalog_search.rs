mod common;

use auctionsite_backend::catalog::{FilterSet, SortOrder};
use auctionsite_backend::helper::{property_helpers, public_helpers};
use auctionsite_backend::models::PropertyInput;
use auctionsite_backend::DbPool;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn seed(pool: &DbPool) {
    let mut inactive = common::property("Cobertura no Leblon", "Leblon", 300_000);
    inactive.is_active = false;

    let listings: Vec<PropertyInput> = vec![
        common::property("Conjugado em Copacabana", "Copacabana", 250_000),
        common::property("Apartamento em Ipanema", "Ipanema", 450_000),
        common::property("Sala na Tijuca", "Tijuca", 150_000),
        common::property("Casa na Barra", "Barra da Tijuca", 900_000),
        inactive,
    ];
    for listing in &listings {
        property_helpers::create_property(pool, listing).expect("insert");
    }
}

fn titles(page: &auctionsite_backend::models::CatalogPage) -> Vec<&str> {
    page.items.iter().map(|p| p.title.as_str()).collect()
}

#[test]
fn zone_filter_matches_only_active_listings_in_the_zone() {
    let dir = tempdir().unwrap();
    let pool = common::site_pool(dir.path());
    seed(&pool);

    let filters = FilterSet::from_query_string("zones%5B%5D=zona-sul&sort=menor-preco");
    let page = public_helpers::search_public_catalog(&pool, &filters, 12).unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(titles(&page), vec!["Conjugado em Copacabana", "Apartamento em Ipanema"]);
    assert_eq!(page.query, "zones%5B%5D=zona-sul&sort=menor-preco");
}

#[test]
fn price_preset_bounds_the_minimum_bid() {
    let dir = tempdir().unwrap();
    let pool = common::site_pool(dir.path());
    seed(&pool);

    let filters = FilterSet::from_query_string("priceRange=100-300-mil&sort=maior-preco");
    let page = public_helpers::search_public_catalog(&pool, &filters, 12).unwrap();

    assert_eq!(titles(&page), vec!["Conjugado em Copacabana", "Sala na Tijuca"]);
}

#[test]
fn count_and_pages_agree() {
    let dir = tempdir().unwrap();
    let pool = common::site_pool(dir.path());
    seed(&pool);

    let base = FilterSet { sort: SortOrder::PriceAsc, ..FilterSet::default() };

    let first = public_helpers::search_public_catalog(&pool, &base, 3).unwrap();
    assert_eq!(first.total, 4);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items.len(), 3);

    let second = public_helpers::search_public_catalog(&pool, &base.with_page(2), 3).unwrap();
    assert_eq!(titles(&second), vec!["Casa na Barra"]);

    let beyond = public_helpers::search_public_catalog(&pool, &base.with_page(5), 3).unwrap();
    assert_eq!(beyond.total, 4);
    assert!(beyond.items.is_empty());
}

#[test]
fn keyword_wildcards_are_literal() {
    let dir = tempdir().unwrap();
    let pool = common::site_pool(dir.path());
    seed(&pool);

    let percent = FilterSet::from_query_string("keyword=%25");
    assert_eq!(public_helpers::search_public_catalog(&pool, &percent, 12).unwrap().total, 0);

    let word = FilterSet::from_query_string("keyword=tijuca");
    let page = public_helpers::search_public_catalog(&pool, &word, 12).unwrap();
    assert_eq!(page.total, 2);
}

#[test]
fn admin_listing_includes_inactive() {
    let dir = tempdir().unwrap();
    let pool = common::site_pool(dir.path());
    seed(&pool);

    let page = property_helpers::search_all_properties(&pool, &FilterSet::default(), 12).unwrap();
    assert_eq!(page.total, 5);
}
