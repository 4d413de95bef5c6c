use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One named, typed content slot on a CMS-driven page.
///
/// `block_type` stays a plain string here: stored rows may carry tags this
/// build does not know, and the editor factory decides what to do with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmsBlock {
    pub id: String,
    pub page: String,
    pub block_key: String,
    pub block_type: String,
    pub content_draft: Value,
    pub content_published: Value,
    pub updated_at: DateTime<Utc>,
}

impl CmsBlock {
    /// Published for display purposes means the draft equals the published value.
    pub fn is_published(&self) -> bool {
        self.content_draft == self.content_published
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CmsBlockSummary {
    pub id: String,
    pub page: String,
    pub block_key: String,
    pub block_type: String,
    pub is_published: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&CmsBlock> for CmsBlockSummary {
    fn from(block: &CmsBlock) -> Self {
        Self {
            id: block.id.clone(),
            page: block.page.clone(),
            block_key: block.block_key.clone(),
            block_type: block.block_type.clone(),
            is_published: block.is_published(),
            updated_at: block.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub filename: String,
    pub url: String,
    pub alt_text: String,
    pub title: String,
    pub file_format: String,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AdminUser {
    pub id: i32,
    pub username: String,
    pub is_active: bool,
    pub last_login_time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Notification {
    pub message: String,
    pub r#type: String, // 'success' or 'error'
}

/// Legal auction category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuctionModality {
    Judicial,
    Extrajudicial,
    ExtrajudicialFinanciavel,
}

impl AuctionModality {
    pub const ALL: [AuctionModality; 3] = [
        AuctionModality::Judicial,
        AuctionModality::Extrajudicial,
        AuctionModality::ExtrajudicialFinanciavel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AuctionModality::Judicial => "judicial",
            AuctionModality::Extrajudicial => "extrajudicial",
            AuctionModality::ExtrajudicialFinanciavel => "extrajudicial-financiavel",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == value)
    }
}

impl fmt::Display for AuctionModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartamento,
    Casa,
    Terreno,
    Comercial,
    Outros,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::Apartamento,
        PropertyType::Casa,
        PropertyType::Terreno,
        PropertyType::Comercial,
        PropertyType::Outros,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Apartamento => "apartamento",
            PropertyType::Casa => "casa",
            PropertyType::Terreno => "terreno",
            PropertyType::Comercial => "comercial",
            PropertyType::Outros => "outros",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property up for auction. Prices are whole reais.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub city: String,
    pub neighborhood: String,
    pub address: String,
    pub area_m2: Option<f64>,
    pub bedrooms: Option<u32>,
    pub first_auction_price: i64,
    pub second_auction_price: Option<i64>,
    pub appraisal_value: Option<i64>,
    pub auction_type: AuctionModality,
    pub first_auction_at: Option<DateTime<Utc>>,
    pub second_auction_at: Option<DateTime<Utc>>,
    pub image_urls: Vec<String>,
    pub notice_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Lowest bid currently accepted: the second auction price when there is one.
    pub fn min_bid(&self) -> i64 {
        self.second_auction_price.unwrap_or(self.first_auction_price)
    }
}

/// Admin payload for creating or replacing a property.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub property_type: PropertyType,
    pub city: String,
    pub neighborhood: String,
    #[serde(default)]
    pub address: String,
    pub area_m2: Option<f64>,
    pub bedrooms: Option<u32>,
    pub first_auction_price: i64,
    pub second_auction_price: Option<i64>,
    pub appraisal_value: Option<i64>,
    pub auction_type: AuctionModality,
    pub first_auction_at: Option<DateTime<Utc>>,
    pub second_auction_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub notice_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// One page of catalog results plus the numbers needed for pagination.
#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub items: Vec<Property>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: String,
    pub property_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeadInput {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub property_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Whatsapp,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Whatsapp => "whatsapp",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "email" => Some(Channel::Email),
            "whatsapp" => Some(Channel::Whatsapp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Audience {
    AllLeads,
    PropertyLeads { property_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Pending,
    Queued,
    Cancelled,
}

impl ScheduleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleStatus::Pending => "pending",
            ScheduleStatus::Queued => "queued",
            ScheduleStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ScheduleStatus::Pending),
            "queued" => Some(ScheduleStatus::Queued),
            "cancelled" => Some(ScheduleStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketingSchedule {
    pub id: String,
    pub name: String,
    pub channel: Channel,
    pub audience: Audience,
    pub message: String,
    pub send_at: DateTime<Utc>,
    pub status: ScheduleStatus,
    pub created_at: DateTime<Utc>,
}

pub mod db_operations;
