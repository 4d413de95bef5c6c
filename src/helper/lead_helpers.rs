use crate::cms::url_check::{is_email, phone_digits};
use crate::cms::validation::ValidationIssue;
use crate::helper::sanitization_helpers::strip_all_html;
use crate::helper::{get_conn, SiteDbError};
use crate::models::db_operations::{leads_db_operations, properties_db_operations};
use crate::models::{Lead, LeadInput};
use crate::DbPool;
use chrono::Utc;

pub const MAX_LEAD_MESSAGE_CHARS: usize = 2_000;
const MAX_NAME_CHARS: usize = 120;

/// A lead that passed validation, with its fields cleaned for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanLead {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: String,
    pub property_id: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn validate_lead(input: &LeadInput) -> Result<CleanLead, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    let name = strip_all_html(input.name.trim());
    if name.trim().is_empty() {
        issues.push(ValidationIssue::new("name", "Name is required."));
    } else if name.chars().count() > MAX_NAME_CHARS {
        issues.push(ValidationIssue::new("name", format!("Must be at most {} characters.", MAX_NAME_CHARS)));
    }

    let email = non_blank(&input.email).map(str::to_lowercase);
    if let Some(address) = &email {
        if !is_email(address) {
            issues.push(ValidationIssue::new("email", "Enter a valid e-mail address."));
        }
    }

    let phone = match non_blank(&input.phone) {
        Some(raw) => match phone_digits(raw) {
            Some(digits) => Some(digits),
            None => {
                issues.push(ValidationIssue::new("phone", "Enter a valid phone number."));
                None
            }
        },
        None => None,
    };

    if email.is_none() && non_blank(&input.phone).is_none() {
        issues.push(ValidationIssue::new("contact", "Leave an e-mail or a phone number."));
    }

    let message = strip_all_html(input.message.trim());
    if message.chars().count() > MAX_LEAD_MESSAGE_CHARS {
        issues.push(ValidationIssue::new(
            "message",
            format!("Must be at most {} characters.", MAX_LEAD_MESSAGE_CHARS),
        ));
    }

    if !issues.is_empty() {
        return Err(issues);
    }
    Ok(CleanLead {
        name: name.trim().to_string(),
        email,
        phone,
        message,
        property_id: non_blank(&input.property_id).map(str::to_string),
    })
}

/// Stores the lead. A reference to an unknown property is dropped rather
/// than losing the contact.
pub fn record_lead(pool: &DbPool, lead: CleanLead) -> Result<Lead, SiteDbError> {
    let conn = get_conn(pool)?;
    let property_id = match lead.property_id {
        Some(id) if properties_db_operations::read_property(&conn, &id)?.is_some() => Some(id),
        Some(id) => {
            log::warn!("Lead references unknown property {}; storing without it", id);
            None
        }
        None => None,
    };

    let created_at = Utc::now();
    let id = leads_db_operations::add_lead(
        &conn,
        &lead.name,
        lead.email.as_deref(),
        lead.phone.as_deref(),
        &lead.message,
        property_id.as_deref(),
        created_at,
    )?;
    log::info!("Recorded lead {} for property {:?}", id, property_id);

    Ok(Lead {
        id,
        name: lead.name,
        email: lead.email,
        phone: lead.phone,
        message: lead.message,
        property_id,
        created_at,
    })
}

pub fn fetch_leads(pool: &DbPool, property_id: Option<&str>, limit: u32, offset: u32) -> Result<Vec<Lead>, SiteDbError> {
    let conn = get_conn(pool)?;
    Ok(leads_db_operations::list_leads(&conn, property_id, limit, offset)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input(name: &str, email: Option<&str>, phone: Option<&str>) -> LeadInput {
        LeadInput {
            name: name.into(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            message: "Tenho interesse".into(),
            property_id: Some("  ".into()),
        }
    }

    #[test]
    fn email_or_phone_is_required() {
        let issues = validate_lead(&input("Ana", None, Some(" "))).expect_err("no contact");
        assert_eq!(issues, vec![ValidationIssue::new("contact", "Leave an e-mail or a phone number.")]);
    }

    #[test]
    fn fields_are_cleaned() {
        let lead = validate_lead(&input(" <b>Ana</b> ", Some("Ana@Example.com"), Some("(21) 99999-0000")))
            .expect("valid");
        assert_eq!(lead.name, "Ana");
        assert_eq!(lead.email.as_deref(), Some("ana@example.com"));
        assert_eq!(lead.phone.as_deref(), Some("21999990000"));
        assert_eq!(lead.property_id, None);
    }

    #[test]
    fn bad_email_and_long_message_are_reported() {
        let mut bad = input("Ana", Some("ana@"), None);
        bad.message = "x".repeat(MAX_LEAD_MESSAGE_CHARS + 1);
        let fields: Vec<String> = validate_lead(&bad).expect_err("invalid").into_iter().map(|i| i.field).collect();
        assert_eq!(fields, vec!["email".to_string(), "message".to_string()]);
    }
}
