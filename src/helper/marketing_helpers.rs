use crate::catalog::dates::{format_local, parse_local_input};
use crate::cms::validation::ValidationIssue;
use crate::helper::{get_conn, SiteDbError};
use crate::models::db_operations::{leads_db_operations, marketing_db_operations, properties_db_operations};
use crate::models::{Audience, Channel, MarketingSchedule, ScheduleStatus};
use crate::DbPool;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MAX_WHATSAPP_CHARS: usize = 1_000;
const MAX_EMAIL_CHARS: usize = 20_000;

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleInput {
    pub name: String,
    pub channel: Channel,
    pub audience: Audience,
    pub message: String,
    /// Local site time, `YYYY-MM-DDTHH:MM`.
    pub send_at: String,
}

#[derive(Debug, Serialize)]
pub struct ScheduleView {
    #[serde(flatten)]
    pub schedule: MarketingSchedule,
    pub send_at_local: String,
}

impl From<MarketingSchedule> for ScheduleView {
    fn from(schedule: MarketingSchedule) -> Self {
        Self { send_at_local: format_local(schedule.send_at), schedule }
    }
}

/// A queued schedule and the addresses it goes to.
#[derive(Debug, Serialize)]
pub struct Dispatch {
    pub schedule: MarketingSchedule,
    pub recipients: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    NotFound,
    NotPending(ScheduleStatus),
}

/// Checks the form and builds a pending schedule. `now` bounds the send time.
pub fn build_schedule(input: &ScheduleInput, now: DateTime<Utc>) -> Result<MarketingSchedule, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if input.name.trim().is_empty() {
        issues.push(ValidationIssue::new("name", "Name is required."));
    }
    let limit = match input.channel {
        Channel::Email => MAX_EMAIL_CHARS,
        Channel::Whatsapp => MAX_WHATSAPP_CHARS,
    };
    if input.message.trim().is_empty() {
        issues.push(ValidationIssue::new("message", "Message is required."));
    } else if input.message.chars().count() > limit {
        issues.push(ValidationIssue::new("message", format!("Must be at most {} characters.", limit)));
    }
    if let Audience::PropertyLeads { property_id } = &input.audience {
        if property_id.trim().is_empty() {
            issues.push(ValidationIssue::new("audience", "Choose a property."));
        }
    }

    let send_at = match parse_local_input(&input.send_at) {
        Some(at) if at <= now => {
            issues.push(ValidationIssue::new("send_at", "The send time must be in the future."));
            None
        }
        Some(at) => Some(at),
        None => {
            issues.push(ValidationIssue::new("send_at", "Use the format YYYY-MM-DDTHH:MM."));
            None
        }
    };

    match send_at {
        Some(send_at) if issues.is_empty() => Ok(MarketingSchedule {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            channel: input.channel,
            audience: input.audience.clone(),
            message: input.message.trim().to_string(),
            send_at,
            status: ScheduleStatus::Pending,
            created_at: now,
        }),
        _ => Err(issues),
    }
}

/// False when the audience names a property that does not exist.
pub fn save_schedule(pool: &DbPool, schedule: &MarketingSchedule) -> Result<bool, SiteDbError> {
    let conn = get_conn(pool)?;
    if let Audience::PropertyLeads { property_id } = &schedule.audience {
        if properties_db_operations::read_property(&conn, property_id)?.is_none() {
            return Ok(false);
        }
    }
    marketing_db_operations::add_schedule(&conn, schedule)?;
    log::info!("Scheduled '{}' ({}) for {}", schedule.name, schedule.channel.as_str(), schedule.send_at);
    Ok(true)
}

pub fn fetch_schedules(pool: &DbPool) -> Result<Vec<ScheduleView>, SiteDbError> {
    let conn = get_conn(pool)?;
    Ok(marketing_db_operations::list_schedules(&conn)?
        .into_iter()
        .map(ScheduleView::from)
        .collect())
}

pub fn cancel_schedule(pool: &DbPool, id: &str) -> Result<CancelOutcome, SiteDbError> {
    let conn = get_conn(pool)?;
    if marketing_db_operations::transition_status(&conn, id, ScheduleStatus::Pending, ScheduleStatus::Cancelled)? {
        log::info!("Cancelled schedule {}", id);
        return Ok(CancelOutcome::Cancelled);
    }
    Ok(match marketing_db_operations::read_schedule(&conn, id)? {
        Some(schedule) => CancelOutcome::NotPending(schedule.status),
        None => CancelOutcome::NotFound,
    })
}

/// Queues every schedule due at `now` and resolves its recipients. Sending
/// is left to the delivery worker that consumes the result.
pub fn process_due(pool: &DbPool, now: DateTime<Utc>) -> Result<Vec<Dispatch>, SiteDbError> {
    let mut conn = get_conn(pool)?;
    let due = marketing_db_operations::queue_due_schedules(&mut conn, now)?;

    let mut dispatches = Vec::with_capacity(due.len());
    for schedule in due {
        let property_id = match &schedule.audience {
            Audience::AllLeads => None,
            Audience::PropertyLeads { property_id } => Some(property_id.as_str()),
        };
        let recipients = leads_db_operations::list_lead_contacts(&conn, schedule.channel, property_id)?;
        log::info!("Queued schedule {} for {} recipients", schedule.id, recipients.len());
        dispatches.push(Dispatch { schedule, recipients });
    }
    Ok(dispatches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(send_at: &str) -> ScheduleInput {
        ScheduleInput {
            name: "Leilão de novembro".into(),
            channel: Channel::Whatsapp,
            audience: Audience::AllLeads,
            message: "Novos imóveis no catálogo!".into(),
            send_at: send_at.into(),
        }
    }

    #[test]
    fn local_send_time_is_stored_in_utc() {
        let now = Utc.with_ymd_and_hms(2024, 11, 1, 12, 0, 0).unwrap();
        let schedule = build_schedule(&input("2024-11-05T09:00"), now).expect("valid");
        assert_eq!(schedule.send_at, Utc.with_ymd_and_hms(2024, 11, 5, 12, 0, 0).unwrap());
        assert_eq!(schedule.status, ScheduleStatus::Pending);
        assert_eq!(ScheduleView::from(schedule).send_at_local, "05/11/2024 09:00");
    }

    #[test]
    fn past_or_garbled_send_time_is_rejected() {
        let now = Utc.with_ymd_and_hms(2024, 11, 1, 12, 0, 0).unwrap();
        let issues = build_schedule(&input("2024-11-01T08:59"), now).expect_err("in the past");
        assert_eq!(issues[0].field, "send_at");
        assert!(build_schedule(&input("amanhã"), now).is_err());
    }

    #[test]
    fn whatsapp_messages_are_short() {
        let now = Utc.with_ymd_and_hms(2024, 11, 1, 12, 0, 0).unwrap();
        let mut long = input("2024-11-05T09:00");
        long.message = "a".repeat(MAX_WHATSAPP_CHARS + 1);
        let issues = build_schedule(&long, now).expect_err("too long");
        assert_eq!(issues[0].field, "message");
    }
}
