pub mod dataset;
pub mod error;
pub mod log;
pub mod map;
pub mod markers;
pub mod models;
pub mod reminders;
pub mod settings;
pub mod steward;
