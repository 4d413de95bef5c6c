use crate::catalog::zones::{expand_zones, find_zone};
use crate::models::{AuctionModality, PropertyType};
use chrono::NaiveDate;
use serde::Serialize;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl PriceRange {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Labelled price buckets offered by the catalog dropdown.
#[derive(Debug, Clone, Copy)]
pub struct PricePreset {
    pub label: &'static str,
    pub range: PriceRange,
}

pub const PRICE_PRESETS: [PricePreset; 5] = [
    PricePreset { label: "ate-100-mil", range: PriceRange { min: None, max: Some(100_000) } },
    PricePreset { label: "100-300-mil", range: PriceRange { min: Some(100_000), max: Some(300_000) } },
    PricePreset { label: "300-500-mil", range: PriceRange { min: Some(300_000), max: Some(500_000) } },
    PricePreset { label: "500-mil-1-milhao", range: PriceRange { min: Some(500_000), max: Some(1_000_000) } },
    PricePreset { label: "acima-1-milhao", range: PriceRange { min: Some(1_000_000), max: None } },
];

fn preset_for_label(label: &str) -> Option<PriceRange> {
    PRICE_PRESETS.iter().find(|p| p.label == label).map(|p| p.range)
}

fn label_for_range(range: &PriceRange) -> Option<&'static str> {
    PRICE_PRESETS.iter().find(|p| p.range == *range).map(|p| p.label)
}

/// Accepts a preset label or an explicit `min-max` (either side may be empty).
fn parse_price_range(value: &str) -> Option<PriceRange> {
    if let Some(range) = preset_for_label(value) {
        return Some(range);
    }
    let (min, max) = value.split_once('-')?;
    let parse = |s: &str| -> Result<Option<u64>, ()> {
        let s = s.trim();
        if s.is_empty() {
            Ok(None)
        } else {
            s.parse::<u64>().map(Some).map_err(|_| ())
        }
    };
    let range = PriceRange { min: parse(min).ok()?, max: parse(max).ok()? };
    (!range.is_empty()).then_some(range)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    AuctionDate,
    PriceAsc,
    PriceDesc,
    Newest,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::AuctionDate => "data-leilao",
            SortOrder::PriceAsc => "menor-preco",
            SortOrder::PriceDesc => "maior-preco",
            SortOrder::Newest => "recentes",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [SortOrder::AuctionDate, SortOrder::PriceAsc, SortOrder::PriceDesc, SortOrder::Newest]
            .into_iter()
            .find(|s| s.as_str() == value)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "sim" => Some(true),
        "false" | "0" | "nao" | "não" => Some(false),
        _ => None,
    }
}

/// Filter state of a catalog page. A `None` or empty field is "no
/// constraint", never "match nothing".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    pub city: Option<String>,
    pub neighborhoods: Vec<String>,
    pub zones: Vec<String>,
    pub property_type: Option<PropertyType>,
    pub price_range: Option<PriceRange>,
    pub auction_type: Option<AuctionModality>,
    pub keyword: Option<String>,
    pub has_second_auction: Option<bool>,
    pub second_auction_until: Option<NaiveDate>,
    pub sort: SortOrder,
    pub page: u32,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            city: None,
            neighborhoods: Vec::new(),
            zones: Vec::new(),
            property_type: None,
            price_range: None,
            auction_type: None,
            keyword: None,
            has_second_auction: None,
            second_auction_until: None,
            sort: SortOrder::default(),
            page: 1,
        }
    }
}

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl FilterSet {
    /// Canonical form: trimmed strings, no empty values, sorted and
    /// de-duplicated lists, known zones only, `min <= max`, page >= 1.
    pub fn normalized(&self) -> Self {
        let mut neighborhoods: Vec<String> = self
            .neighborhoods
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        neighborhoods.sort();
        neighborhoods.dedup();

        let mut zones: Vec<String> = self
            .zones
            .iter()
            .filter_map(|z| find_zone(z))
            .map(|z| z.slug.to_string())
            .collect();
        zones.sort();
        zones.dedup();

        let price_range = self.price_range.filter(|r| !r.is_empty()).map(|r| match (r.min, r.max) {
            (Some(min), Some(max)) if min > max => PriceRange { min: Some(max), max: Some(min) },
            _ => r,
        });

        Self {
            city: clean(&self.city),
            neighborhoods,
            zones,
            property_type: self.property_type,
            price_range,
            auction_type: self.auction_type,
            keyword: clean(&self.keyword),
            has_second_auction: self.has_second_auction,
            second_auction_until: self.second_auction_until,
            sort: self.sort,
            page: self.page.max(1),
        }
    }

    /// Every neighborhood the catalog should match: the explicit picks plus
    /// the expansion of each selected zone.
    pub fn effective_neighborhoods(&self) -> Vec<String> {
        let mut all: Vec<String> = self.neighborhoods.clone();
        all.extend(expand_zones(&self.zones).into_iter().map(str::to_string));
        all.sort();
        all.dedup();
        all
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self { page: page.max(1), ..self.clone() }
    }

    pub fn to_query_string(&self) -> String {
        let f = self.normalized();
        let mut out = form_urlencoded::Serializer::new(String::new());

        if let Some(city) = &f.city {
            out.append_pair("city", city);
        }
        for neighborhood in &f.neighborhoods {
            out.append_pair("neighborhood", neighborhood);
        }
        for zone in &f.zones {
            out.append_pair("zones[]", zone);
        }
        if let Some(t) = f.property_type {
            out.append_pair("type", t.as_str());
        }
        if let Some(range) = &f.price_range {
            match label_for_range(range) {
                Some(label) => {
                    out.append_pair("priceRange", label);
                }
                None => {
                    if let Some(min) = range.min {
                        out.append_pair("priceMin", &min.to_string());
                    }
                    if let Some(max) = range.max {
                        out.append_pair("priceMax", &max.to_string());
                    }
                }
            }
        }
        if let Some(modality) = f.auction_type {
            out.append_pair("auctionType", modality.as_str());
        }
        if let Some(keyword) = &f.keyword {
            out.append_pair("keyword", keyword);
        }
        if let Some(flag) = f.has_second_auction {
            out.append_pair("hasSecondAuction", if flag { "true" } else { "false" });
        }
        if let Some(date) = f.second_auction_until {
            out.append_pair("dataFimSegundoLeilao", &date.format("%Y-%m-%d").to_string());
        }
        if f.sort != SortOrder::default() {
            out.append_pair("sort", f.sort.as_str());
        }
        if f.page > 1 {
            out.append_pair("page", &f.page.to_string());
        }
        out.finish()
    }

    /// Never fails: unknown keys and unparsable values are ignored, and the
    /// result is normalized.
    pub fn from_query_string(query: &str) -> Self {
        let mut f = FilterSet::default();
        let mut explicit = PriceRange::default();
        let mut labelled: Option<PriceRange> = None;

        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "city" => f.city = Some(value.to_string()),
                "neighborhood" | "neighborhood[]" => f.neighborhoods.push(value.to_string()),
                "zone" | "zones[]" => f.zones.push(value.to_string()),
                "type" => f.property_type = PropertyType::parse(value),
                "priceRange" => labelled = parse_price_range(value),
                "priceMin" => explicit.min = value.parse().ok(),
                "priceMax" => explicit.max = value.parse().ok(),
                "auctionType" => f.auction_type = AuctionModality::parse(value),
                "keyword" => f.keyword = Some(value.to_string()),
                "hasSecondAuction" => f.has_second_auction = parse_flag(value),
                "dataFimSegundoLeilao" => {
                    f.second_auction_until = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
                }
                "sort" => f.sort = SortOrder::parse(value).unwrap_or_default(),
                "page" => f.page = value.parse::<u32>().unwrap_or(1),
                _ => {}
            }
        }

        f.price_range = if explicit.is_empty() { labelled } else { Some(explicit) };
        f.normalized()
    }
}
