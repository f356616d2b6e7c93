//! Snapshot document types and their API views.
//!
//! Field names follow the camelCase JSON the bots export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// Format used for the human-readable `created` / `date` fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const NO_COMMENT: &str = "No comment provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: u64,
    pub channel_id: String,
    pub username: String,
    /// Ticket category, e.g. `Boost`, `Custom Bot`, `Support`.
    #[serde(rename = "type")]
    pub kind: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vouch {
    pub id: u64,
    pub from_username: String,
    pub to_username: String,
    pub stars: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The whole exported document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub vouches: Vec<Vouch>,
    #[serde(default)]
    pub verified_users: u64,
}

/// Headline counters for `/api/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_tickets: usize,
    pub open_tickets: usize,
    pub closed_tickets: usize,
    pub total_vouches: usize,
    pub verified_users: u64,
}

/// Ticket row as served by `/api/tickets`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    pub id: u64,
    pub channel_id: String,
    pub user: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: TicketStatus,
    pub created: String,
    pub created_at: DateTime<Utc>,
    pub details: Option<Value>,
}

/// Vouch row as served by `/api/vouches`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VouchView {
    pub id: u64,
    pub from: String,
    pub to: String,
    pub rating: u8,
    pub review: String,
    pub date: String,
}

impl From<&Ticket> for TicketView {
    fn from(t: &Ticket) -> Self {
        Self {
            id: t.id,
            channel_id: t.channel_id.clone(),
            user: t.username.clone(),
            kind: t.kind.clone(),
            status: t.status,
            created: t.created_at.format(DATE_FORMAT).to_string(),
            created_at: t.created_at,
            details: t.details.clone(),
        }
    }
}

impl From<&Vouch> for VouchView {
    fn from(v: &Vouch) -> Self {
        let review = v
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(NO_COMMENT)
            .to_string();
        Self {
            id: v.id,
            from: v.from_username.clone(),
            to: v.to_username.clone(),
            rating: v.stars,
            review,
            date: v.created_at.format(DATE_FORMAT).to_string(),
        }
    }
}

impl Snapshot {
    pub fn stats(&self) -> Stats {
        let open_tickets = self
            .tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Open)
            .count();
        Stats {
            total_tickets: self.tickets.len(),
            open_tickets,
            closed_tickets: self.tickets.len() - open_tickets,
            total_vouches: self.vouches.len(),
            verified_users: self.verified_users,
        }
    }

    pub fn ticket(&self, id: u64) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    /// Mark ticket `id` closed at `now`.
    ///
    /// Returns `false` when the ticket was already closed (nothing changed).
    pub fn close_ticket(&mut self, id: u64, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let ticket = self
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TicketNotFound(id))?;
        if ticket.status == TicketStatus::Closed {
            return Ok(false);
        }
        ticket.status = TicketStatus::Closed;
        ticket.closed_at = Some(now);
        Ok(true)
    }

    pub fn ticket_views(&self) -> Vec<TicketView> {
        self.tickets.iter().map(TicketView::from).collect()
    }

    pub fn vouch_views(&self) -> Vec<VouchView> {
        self.vouches.iter().map(VouchView::from).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn ticket(id: u64, status: TicketStatus) -> Ticket {
        Ticket {
            id,
            channel_id: format!("chan-{id}"),
            username: "ana".to_string(),
            kind: "Support".to_string(),
            status,
            created_at: at(1),
            closed_at: None,
            details: None,
        }
    }

    #[test]
    fn parses_exported_camel_case() {
        let json = r#"{
            "tickets": [{"id": 1, "channelId": "c1", "username": "ana", "type": "Boost",
                         "status": "open", "createdAt": "2024-03-01T10:00:00Z"}],
            "vouches": [{"id": 9, "fromUsername": "ana", "toUsername": "staff", "stars": 5,
                         "createdAt": "2024-03-02T10:00:00Z"}],
            "verifiedUsers": 12
        }"#;
        let snap: Snapshot = serde_json::from_str(json).expect("parse");
        assert_eq!(snap.tickets[0].kind, "Boost");
        assert_eq!(snap.vouches[0].comment, None);
        assert_eq!(snap.verified_users, 12);
    }

    #[test]
    fn stats_count_open_and_closed() {
        let snap = Snapshot {
            tickets: vec![
                ticket(1, TicketStatus::Open),
                ticket(2, TicketStatus::Closed),
                ticket(3, TicketStatus::Open),
            ],
            vouches: vec![],
            verified_users: 4,
        };
        let stats = snap.stats();
        assert_eq!(stats.total_tickets, 3);
        assert_eq!(stats.open_tickets, 2);
        assert_eq!(stats.closed_tickets, 1);
        assert_eq!(stats.verified_users, 4);
    }

    #[test]
    fn close_ticket_sets_timestamp_once() {
        let mut snap = Snapshot {
            tickets: vec![ticket(1, TicketStatus::Open)],
            ..Snapshot::default()
        };
        assert!(snap.close_ticket(1, at(5)).expect("close"));
        assert_eq!(snap.tickets[0].closed_at, Some(at(5)));
        assert!(!snap.close_ticket(1, at(6)).expect("close again"));
        assert_eq!(snap.tickets[0].closed_at, Some(at(5)));
        assert!(matches!(snap.close_ticket(99, at(6)), Err(StoreError::TicketNotFound(99))));
    }

    #[test]
    fn vouch_view_fills_missing_review() {
        let vouch = Vouch {
            id: 1,
            from_username: "ana".to_string(),
            to_username: "staff".to_string(),
            stars: 4,
            comment: Some("   ".to_string()),
            created_at: at(3),
        };
        let view = VouchView::from(&vouch);
        assert_eq!(view.review, "No comment provided");
        assert_eq!(view.date, "2024-03-03");
        assert_eq!(view.rating, 4);
    }

    #[test]
    fn ticket_view_uses_short_keys() {
        let view = TicketView::from(&ticket(7, TicketStatus::Open));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["user"], "ana");
        assert_eq!(json["type"], "Support");
        assert_eq!(json["status"], "open");
        assert_eq!(json["channelId"], "chan-7");
        assert_eq!(json["created"], "2024-03-01");
    }
}
