pub mod reminder;
pub mod zone;
