//! # botdeck-store
//!
//! Read-mostly view over the ticket and vouch data written by the bots.
//!
//! The bots export a [`Snapshot`] JSON document; [`snapshot::load_at`] reads
//! it and [`snapshot::save_at`] writes it back atomically after a ticket is
//! closed from the dashboard. [`insights`] derives the dashboard aggregates
//! (trend, activity feed, top users, breakdown).

pub mod error;
pub mod insights;
pub mod models;
pub mod snapshot;

pub use error::StoreError;
pub use models::{Snapshot, Stats, Ticket, TicketStatus, TicketView, Vouch, VouchView};
