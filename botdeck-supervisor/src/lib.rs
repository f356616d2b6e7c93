//! # botdeck-supervisor
//!
//! In-memory registry of the bot processes launched by the dashboard.
//!
//! [`BotRegistry`] tracks at most one live child per configured bot id.
//! Each id owns an async mutex that is held across the whole
//! check → launch → record (or check → kill → clear) sequence, so two
//! concurrent starts of the same bot can never both spawn.

mod error;
mod launch;
pub mod registry;
mod terminate;

pub use error::SupervisorError;
pub use registry::{BotRegistry, BotStatus, Started, Stopped};
