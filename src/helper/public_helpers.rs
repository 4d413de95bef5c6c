use crate::catalog::query::{Page, PropertyQuery};
use crate::catalog::FilterSet;
use crate::helper::{get_conn, SiteDbError};
use crate::models::db_operations::{properties_db_operations, users_db_operations};
use crate::models::{CatalogPage, Property};
use crate::DbPool;

pub fn verify_admin_credentials(pool: &DbPool, username: &str, password: &str) -> Option<String> {
    if let Ok(conn) = pool.get() {
        users_db_operations::verify_credentials(&conn, username, password)
    } else {
        None
    }
}

/// Runs a filtered search: the count query first, then the page query, so
/// the returned page always agrees with `total`.
pub fn search_catalog(pool: &DbPool, query: &PropertyQuery, filters: &FilterSet, page_size: u32) -> Result<CatalogPage, SiteDbError> {
    let conn = get_conn(pool)?;
    let normalized = filters.normalized();
    let page = Page::new(normalized.page, page_size);

    let total = properties_db_operations::count_properties(&conn, query)?;
    let items = if page.offset() < total {
        properties_db_operations::search_properties(&conn, query, page)?
    } else {
        Vec::new()
    };

    Ok(CatalogPage {
        items,
        total,
        page: page.number,
        page_size: page.size,
        total_pages: page.total_pages(total),
        query: normalized.to_query_string(),
    })
}

/// Public catalog page: active listings only.
pub fn search_public_catalog(pool: &DbPool, filters: &FilterSet, page_size: u32) -> Result<CatalogPage, SiteDbError> {
    search_catalog(pool, &PropertyQuery::from_filters(filters), filters, page_size)
}

/// Detail page lookup. Inactive listings are hidden from the public.
pub fn fetch_active_property(pool: &DbPool, id: &str) -> Result<Option<Property>, SiteDbError> {
    let conn = get_conn(pool)?;
    Ok(properties_db_operations::read_property(&conn, id)?.filter(|p| p.is_active))
}

pub fn fetch_locations(pool: &DbPool) -> Result<Vec<(String, String)>, SiteDbError> {
    let conn = get_conn(pool)?;
    Ok(properties_db_operations::read_locations(&conn)?)
}
