use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ReminderRecord {
    pub map_id: u32,
    pub text: String,
    #[serde(default)]
    pub id: u32,
}

impl ReminderRecord {
    pub fn new(map_id: u32, text: impl Into<String>, id: u32) -> Self {
        Self {
            map_id,
            text: text.into(),
            id,
        }
    }
}

/// A reminder as sent to the backend; ids are assigned server side.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReminderDraft {
    pub map_id: u32,
    pub text: String,
}

impl ReminderDraft {
    pub fn new(map_id: u32, text: impl Into<String>) -> Self {
        Self {
            map_id,
            text: text.into(),
        }
    }
}

impl From<&ReminderRecord> for ReminderDraft {
    fn from(record: &ReminderRecord) -> Self {
        ReminderDraft::new(record.map_id, record.text.to_string())
    }
}

pub trait ZoneText {
    fn map_id(&self) -> u32;
    fn text(&self) -> &str;
}

impl ZoneText for ReminderRecord {
    fn map_id(&self) -> u32 {
        self.map_id
    }

    fn text(&self) -> &str {
        &self.text
    }
}

impl ZoneText for ReminderDraft {
    fn map_id(&self) -> u32 {
        self.map_id
    }

    fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_defaults_when_missing() {
        let records: Vec<ReminderRecord> =
            serde_json::from_str(r#"[{"map_id": 15, "text": "buy salvage kits"}]"#).unwrap();
        assert_eq!(records, vec![ReminderRecord::new(15, "buy salvage kits", 0)]);
    }

    #[test]
    fn draft_serializes_without_id() {
        let draft = ReminderDraft::from(&ReminderRecord::new(50, "vista", 3));
        assert_eq!(
            serde_json::to_string(&draft).unwrap(),
            r#"{"map_id":50,"text":"vista"}"#
        );
    }
}
