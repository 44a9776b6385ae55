//! Session module tying the signed-in user to the data layer.
//!
//! `Session` owns the database pool and the reminder scheduler and exposes
//! the operations the app screens call: scanning machines, logging
//! performances, level-based guidance, browsing history, managing goals
//! and reminders.

mod goals;
mod guidance;
mod history;
mod machines;
mod reminders;
mod session;

pub use machines::ALL_CATEGORIES;
pub use session::Session;
