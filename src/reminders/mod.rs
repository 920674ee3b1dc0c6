pub mod api;
pub mod cache;
pub mod editor;
pub mod grid;
pub mod queue;
pub mod worker;

pub use api::HttpReminderApi;
pub use cache::{ReminderStore, ZoneReminderDisplay};
pub use editor::{ReminderEditor, SaveOutcome};
