use crate::catalog::query::PropertyQuery;
use crate::catalog::FilterSet;
use crate::cms::url_check::{check_url, UrlCheck};
use crate::cms::validation::ValidationIssue;
use crate::helper::{get_conn, public_helpers, SiteDbError};
use crate::models::db_operations::properties_db_operations;
use crate::models::{CatalogPage, Property, PropertyInput};
use crate::DbPool;

const MAX_TITLE_CHARS: usize = 200;
const MAX_IMAGES: usize = 30;

fn link_issue(field: String, value: &str) -> Option<ValidationIssue> {
    match check_url(value) {
        UrlCheck::Valid { .. } => None,
        UrlCheck::Empty => Some(ValidationIssue::new(field, "Link is empty.")),
        UrlCheck::Suggest { suggestion, .. } => {
            Some(ValidationIssue::new(field, format!("Invalid link. Did you mean {}?", suggestion)))
        }
        UrlCheck::Invalid { reason } => Some(ValidationIssue::new(field, reason)),
    }
}

pub fn validate_property_input(input: &PropertyInput) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (field, value, label) in [
        ("title", &input.title, "Title"),
        ("city", &input.city, "City"),
        ("neighborhood", &input.neighborhood, "Neighborhood"),
    ] {
        if value.trim().is_empty() {
            issues.push(ValidationIssue::new(field, format!("{} is required.", label)));
        }
    }
    if input.title.chars().count() > MAX_TITLE_CHARS {
        issues.push(ValidationIssue::new("title", format!("Must be at most {} characters.", MAX_TITLE_CHARS)));
    }

    if input.first_auction_price <= 0 {
        issues.push(ValidationIssue::new("first_auction_price", "Price must be greater than zero."));
    }
    match input.second_auction_price {
        Some(price) if price <= 0 => {
            issues.push(ValidationIssue::new("second_auction_price", "Price must be greater than zero."))
        }
        Some(price) if price > input.first_auction_price => issues.push(ValidationIssue::new(
            "second_auction_price",
            "The second auction price cannot exceed the first.",
        )),
        _ => {}
    }
    if matches!(input.appraisal_value, Some(v) if v <= 0) {
        issues.push(ValidationIssue::new("appraisal_value", "Appraisal must be greater than zero."));
    }
    if let (Some(first), Some(second)) = (input.first_auction_at, input.second_auction_at) {
        if second < first {
            issues.push(ValidationIssue::new("second_auction_at", "The second auction must come after the first."));
        }
    }

    if let Some(notice) = input.notice_url.as_deref().filter(|s| !s.trim().is_empty()) {
        issues.extend(link_issue("notice_url".to_string(), notice));
    }
    if input.image_urls.len() > MAX_IMAGES {
        issues.push(ValidationIssue::new("image_urls", format!("At most {} images are allowed.", MAX_IMAGES)));
    }
    for (i, url) in input.image_urls.iter().enumerate() {
        issues.extend(link_issue(format!("image_urls[{}]", i), url));
    }

    issues
}

pub fn create_property(pool: &DbPool, input: &PropertyInput) -> Result<String, SiteDbError> {
    let conn = get_conn(pool)?;
    Ok(properties_db_operations::create_property(&conn, input)?)
}

pub fn update_property(pool: &DbPool, id: &str, input: &PropertyInput) -> Result<bool, SiteDbError> {
    let conn = get_conn(pool)?;
    Ok(properties_db_operations::update_property(&conn, id, input)?)
}

pub fn set_property_active(pool: &DbPool, id: &str, is_active: bool) -> Result<bool, SiteDbError> {
    let conn = get_conn(pool)?;
    Ok(properties_db_operations::set_property_active(&conn, id, is_active)?)
}

pub fn delete_property(pool: &DbPool, id: &str) -> Result<usize, SiteDbError> {
    let conn = get_conn(pool)?;
    Ok(properties_db_operations::delete_property(&conn, id)?)
}

pub fn fetch_property(pool: &DbPool, id: &str) -> Result<Option<Property>, SiteDbError> {
    let conn = get_conn(pool)?;
    Ok(properties_db_operations::read_property(&conn, id)?)
}

/// Admin listing: the catalog filters, inactive listings included.
pub fn search_all_properties(pool: &DbPool, filters: &FilterSet, page_size: u32) -> Result<CatalogPage, SiteDbError> {
    public_helpers::search_catalog(pool, &PropertyQuery::including_inactive(filters), filters, page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuctionModality, PropertyType};

    fn input() -> PropertyInput {
        PropertyInput {
            title: "Apartamento 2 quartos".into(),
            description: String::new(),
            property_type: PropertyType::Apartamento,
            city: "Rio de Janeiro".into(),
            neighborhood: "Tijuca".into(),
            address: String::new(),
            area_m2: Some(68.0),
            bedrooms: Some(2),
            first_auction_price: 400_000,
            second_auction_price: Some(240_000),
            appraisal_value: None,
            auction_type: AuctionModality::Extrajudicial,
            first_auction_at: None,
            second_auction_at: None,
            image_urls: vec!["/media/assets/ab/cd/foto.jpg".into()],
            notice_url: Some("https://example.com/edital.pdf".into()),
            is_active: true,
        }
    }

    #[test]
    fn valid_input_has_no_issues() {
        assert!(validate_property_input(&input()).is_empty());
    }

    #[test]
    fn second_price_above_first_is_rejected() {
        let mut bad = input();
        bad.second_auction_price = Some(500_000);
        bad.city = "  ".into();
        let fields: Vec<String> = validate_property_input(&bad).into_iter().map(|i| i.field).collect();
        assert_eq!(fields, vec!["city".to_string(), "second_auction_price".to_string()]);
    }

    #[test]
    fn notice_link_typo_gets_suggestion() {
        let mut bad = input();
        bad.notice_url = Some("example.com/edital.pdf".into());
        let issues = validate_property_input(&bad);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("https://example.com/edital.pdf"));
    }
}
