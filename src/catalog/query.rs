use crate::catalog::dates::{end_of_local_day_utc, storage_timestamp};
use crate::catalog::filters::{FilterSet, SortOrder};
use rusqlite::types::Value;

/// Columns searched by the free-text keyword.
const KEYWORD_COLUMNS: &[&str] = &["title", "address", "neighborhood", "city"];

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(&'static str, Value),
    Gte(&'static str, Value),
    Lte(&'static str, Value),
    In(&'static str, Vec<Value>),
    /// `LIKE` against any of the columns; the pattern is already escaped.
    AnyLike(&'static [&'static str], String),
    IsNull(&'static str),
    IsNotNull(&'static str),
}

impl Predicate {
    fn push_sql(&self, sql: &mut Vec<String>, params: &mut Vec<Value>) {
        match self {
            Predicate::Eq(col, v) => {
                sql.push(format!("{} = ?", col));
                params.push(v.clone());
            }
            Predicate::Gte(col, v) => {
                sql.push(format!("{} >= ?", col));
                params.push(v.clone());
            }
            Predicate::Lte(col, v) => {
                sql.push(format!("{} <= ?", col));
                params.push(v.clone());
            }
            Predicate::In(col, values) => {
                let marks = vec!["?"; values.len()].join(", ");
                sql.push(format!("{} IN ({})", col, marks));
                params.extend(values.iter().cloned());
            }
            Predicate::AnyLike(cols, pattern) => {
                let ors: Vec<String> = cols.iter().map(|c| format!("{} LIKE ? ESCAPE '\\'", c)).collect();
                sql.push(format!("({})", ors.join(" OR ")));
                params.extend(cols.iter().map(|_| Value::Text(pattern.clone())));
            }
            Predicate::IsNull(col) => sql.push(format!("{} IS NULL", col)),
            Predicate::IsNotNull(col) => sql.push(format!("{} IS NOT NULL", col)),
        }
    }
}

fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// 1-based page of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Self {
        Self { number: number.max(1), size: size.max(1) }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.size)
    }

    pub fn total_pages(&self, count: u64) -> u32 {
        let pages = count.div_ceil(u64::from(self.size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone)]
pub struct PropertyQuery {
    pub predicates: Vec<Predicate>,
    pub sort: SortOrder,
}

impl PropertyQuery {
    /// Public catalog query: only active listings.
    pub fn from_filters(filters: &FilterSet) -> Self {
        let mut query = Self::including_inactive(filters);
        query.predicates.insert(0, Predicate::Eq("is_active", Value::Integer(1)));
        query
    }

    /// Admin listing query: same filters, inactive listings included.
    pub fn including_inactive(filters: &FilterSet) -> Self {
        let f = filters.normalized();
        let mut predicates = Vec::new();

        if let Some(city) = &f.city {
            predicates.push(Predicate::Eq("city", Value::Text(city.clone())));
        }
        let neighborhoods = f.effective_neighborhoods();
        if !neighborhoods.is_empty() {
            predicates.push(Predicate::In(
                "neighborhood",
                neighborhoods.into_iter().map(Value::Text).collect(),
            ));
        }
        if let Some(t) = f.property_type {
            predicates.push(Predicate::Eq("property_type", Value::Text(t.as_str().to_string())));
        }
        if let Some(range) = f.price_range {
            if let Some(min) = range.min {
                predicates.push(Predicate::Gte("min_bid", Value::Integer(clamp_i64(min))));
            }
            if let Some(max) = range.max {
                predicates.push(Predicate::Lte("min_bid", Value::Integer(clamp_i64(max))));
            }
        }
        if let Some(modality) = f.auction_type {
            predicates.push(Predicate::Eq("auction_type", Value::Text(modality.as_str().to_string())));
        }
        if let Some(keyword) = &f.keyword {
            predicates.push(Predicate::AnyLike(KEYWORD_COLUMNS, like_pattern(keyword)));
        }
        match f.has_second_auction {
            Some(true) => predicates.push(Predicate::IsNotNull("second_auction_at")),
            Some(false) => predicates.push(Predicate::IsNull("second_auction_at")),
            None => {}
        }
        if let Some(until) = f.second_auction_until.and_then(end_of_local_day_utc) {
            predicates.push(Predicate::Lte("second_auction_at", Value::Text(storage_timestamp(until))));
        }

        Self { predicates, sort: f.sort }
    }

    /// `WHERE ...` clause (empty when unconstrained) and its positional params.
    pub fn where_sql(&self) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        for predicate in &self.predicates {
            predicate.push_sql(&mut clauses, &mut params);
        }
        if clauses.is_empty() {
            (String::new(), params)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), params)
        }
    }

    pub fn order_sql(&self) -> &'static str {
        match self.sort {
            SortOrder::AuctionDate => {
                " ORDER BY COALESCE(second_auction_at, first_auction_at) IS NULL, COALESCE(second_auction_at, first_auction_at) ASC, id ASC"
            }
            SortOrder::PriceAsc => " ORDER BY min_bid ASC, id ASC",
            SortOrder::PriceDesc => " ORDER BY min_bid DESC, id ASC",
            SortOrder::Newest => " ORDER BY created_at DESC, id ASC",
        }
    }
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::filters::PriceRange;
    use crate::catalog::zones::ZONES;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn unconstrained_public_query_only_filters_active() {
        let (sql, params) = PropertyQuery::from_filters(&FilterSet::default()).where_sql();
        assert_eq!(sql, " WHERE is_active = ?");
        assert_eq!(params, vec![Value::Integer(1)]);
        let (sql, params) = PropertyQuery::including_inactive(&FilterSet::default()).where_sql();
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn zone_expands_into_neighborhood_list() {
        let filters = FilterSet { zones: vec!["zona-oeste".into()], ..FilterSet::default() };
        let query = PropertyQuery::including_inactive(&filters);
        let Predicate::In(col, values) = &query.predicates[0] else { panic!("expected IN") };
        assert_eq!(*col, "neighborhood");
        assert_eq!(values.len(), ZONES[3].neighborhoods.len());
    }

    #[test]
    fn keyword_wildcards_are_escaped() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
        let filters = FilterSet { keyword: Some("Leblon".into()), ..FilterSet::default() };
        let (sql, params) = PropertyQuery::including_inactive(&filters).where_sql();
        assert_eq!(sql.matches("LIKE ? ESCAPE").count(), 4);
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn price_and_second_auction_date_predicates() {
        let filters = FilterSet {
            price_range: Some(PriceRange { min: Some(100_000), max: Some(300_000) }),
            second_auction_until: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..FilterSet::default()
        };
        let (sql, params) = PropertyQuery::including_inactive(&filters).where_sql();
        assert_eq!(sql, " WHERE min_bid >= ? AND min_bid <= ? AND second_auction_at <= ?");
        assert_eq!(params[2], Value::Text("2025-01-01T02:59:59Z".into()));
    }

    #[test]
    fn page_math() {
        let page = Page::new(3, 12);
        assert_eq!(page.offset(), 24);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(25), 3);
        assert_eq!(Page::new(0, 0), Page { number: 1, size: 1 });
    }
}
