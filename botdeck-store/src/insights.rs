//! Dashboard aggregates derived from a [`Snapshot`].

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::Serialize;

use crate::models::{Snapshot, TicketStatus};

/// Number of days covered by [`trend`].
pub const TREND_DAYS: i64 = 7;
/// Maximum number of events returned by [`activity_feed`].
pub const FEED_LEN: usize = 10;

const FEED_TICKETS: usize = 10;
const FEED_VOUCHES: usize = 5;

/// Daily created/closed counts, oldest day first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trend {
    pub labels: Vec<String>,
    pub created: Vec<usize>,
    pub closed: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activity {
    #[serde(rename_all = "camelCase")]
    TicketCreated { user: String, ticket_id: u64, time: i64 },
    #[serde(rename_all = "camelCase")]
    TicketClosed { ticket_id: u64, time: i64 },
    #[serde(rename_all = "camelCase")]
    VouchAdded { user: String, rating: u8, time: i64 },
}

impl Activity {
    /// Event time in Unix milliseconds.
    pub fn time(&self) -> i64 {
        match self {
            Activity::TicketCreated { time, .. }
            | Activity::TicketClosed { time, .. }
            | Activity::VouchAdded { time, .. } => *time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopUser {
    pub username: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub tickets: TicketBreakdown,
    pub vouches: VouchBreakdown,
    pub verification: VerificationBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketBreakdown {
    pub total: usize,
    pub boost: usize,
    pub custom_bot: usize,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VouchBreakdown {
    pub total: usize,
    /// Mean star rating rounded to one decimal; 0 without vouches.
    pub average: f64,
    pub five_stars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationBreakdown {
    pub verified: u64,
    pub pending: u64,
}

/// Created and closed tickets per day for the [`TREND_DAYS`] days ending at `now`.
///
/// Days are UTC calendar days, independent of the host's timezone.
pub fn trend(snapshot: &Snapshot, now: DateTime<Utc>) -> Trend {
    let today = now.date_naive();
    let mut out = Trend {
        labels: Vec::with_capacity(TREND_DAYS as usize),
        created: Vec::with_capacity(TREND_DAYS as usize),
        closed: Vec::with_capacity(TREND_DAYS as usize),
    };
    for back in (0..TREND_DAYS).rev() {
        let day = today - Duration::days(back);
        let on_day = |at: &DateTime<Utc>| at.date_naive() == day;
        out.labels.push(weekday_label(day).to_string());
        out.created
            .push(snapshot.tickets.iter().filter(|t| on_day(&t.created_at)).count());
        out.closed.push(
            snapshot
                .tickets
                .iter()
                .filter(|t| t.closed_at.as_ref().is_some_and(|at| on_day(at)))
                .count(),
        );
    }
    out
}

fn weekday_label(day: NaiveDate) -> &'static str {
    match day.weekday() {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

/// Recent ticket and vouch events, newest first.
///
/// Considers the last ten tickets and last five vouches of the snapshot.
pub fn activity_feed(snapshot: &Snapshot) -> Vec<Activity> {
    let tickets = snapshot.tickets.iter().rev().take(FEED_TICKETS).map(|t| match t.status {
        TicketStatus::Open => Activity::TicketCreated {
            user: t.username.clone(),
            ticket_id: t.id,
            time: t.created_at.timestamp_millis(),
        },
        TicketStatus::Closed => Activity::TicketClosed {
            ticket_id: t.id,
            time: t.closed_at.unwrap_or(t.created_at).timestamp_millis(),
        },
    });
    let vouches = snapshot.vouches.iter().rev().take(FEED_VOUCHES).map(|v| Activity::VouchAdded {
        user: v.from_username.clone(),
        rating: v.stars,
        time: v.created_at.timestamp_millis(),
    });

    let mut events: Vec<Activity> = tickets.chain(vouches).collect();
    events.sort_by_key(|e| std::cmp::Reverse(e.time()));
    events.truncate(FEED_LEN);
    events
}

/// Users with the most tickets, most first; ties keep first-seen order.
pub fn top_users(snapshot: &Snapshot, limit: usize) -> Vec<TopUser> {
    let mut users: Vec<TopUser> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for ticket in &snapshot.tickets {
        let name = ticket.username.as_str();
        match index.get(name) {
            Some(&i) => users[i].count += 1,
            None => {
                index.insert(name, users.len());
                users.push(TopUser {
                    username: name.to_string(),
                    count: 1,
                });
            }
        }
    }
    // Stable, so equal counts stay in first-seen order.
    users.sort_by(|a, b| b.count.cmp(&a.count));
    users.truncate(limit);
    users
}

/// Per-category ticket counts and vouch rating summary.
pub fn breakdown(snapshot: &Snapshot) -> Breakdown {
    let of_kind = |kind: &str| snapshot.tickets.iter().filter(|t| t.kind == kind).count();

    let total_stars: u64 = snapshot.vouches.iter().map(|v| u64::from(v.stars)).sum();
    let average = if snapshot.vouches.is_empty() {
        0.0
    } else {
        let mean = total_stars as f64 / snapshot.vouches.len() as f64;
        (mean * 10.0).round() / 10.0
    };

    Breakdown {
        tickets: TicketBreakdown {
            total: snapshot.tickets.len(),
            boost: of_kind("Boost"),
            custom_bot: of_kind("Custom Bot"),
            support: of_kind("Support"),
        },
        vouches: VouchBreakdown {
            total: snapshot.vouches.len(),
            average,
            five_stars: snapshot.vouches.iter().filter(|v| v.stars == 5).count(),
        },
        verification: VerificationBreakdown {
            verified: snapshot.verified_users,
            pending: 0,
        },
    }
}
