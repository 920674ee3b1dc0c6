use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::models::reminder::ZoneText;

/// Reminder texts grouped by zone, as of one load or save. Never mutated
/// after construction; a rebuild produces a new snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderSnapshot {
    version: u64,
    by_zone: HashMap<u32, Vec<String>>,
}

impl ReminderSnapshot {
    pub fn build<T: ZoneText>(version: u64, records: &[T]) -> Self {
        let mut by_zone: HashMap<u32, Vec<String>> = HashMap::new();
        for record in records {
            by_zone
                .entry(record.map_id())
                .or_default()
                .push(record.text().to_string());
        }
        Self { version, by_zone }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn reminders_for(&self, map_id: u32) -> &[String] {
        self.by_zone.get(&map_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn zones(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_zone.keys().copied()
    }

    pub fn zone_count(&self) -> usize {
        self.by_zone.len()
    }
}

/// Ticket handed out when a rebuild's data is requested. Tickets increase
/// monotonically, so a result that was requested earlier than the current
/// snapshot can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleTicket {
    pub ticket: u64,
    pub current: u64,
}

/// Shared owner of the current snapshot. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ReminderStore {
    current: Arc<Mutex<Arc<ReminderSnapshot>>>,
    issued: Arc<AtomicU64>,
}

impl ReminderStore {
    pub fn new() -> Self {
        ReminderStore::default()
    }

    pub fn ticket(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn snapshot(&self) -> Arc<ReminderSnapshot> {
        let current = self.current.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(&current)
    }

    /// Replaces the whole snapshot with one built from `records`, unless a
    /// snapshot from a later ticket is already in place.
    pub fn apply<T: ZoneText>(&self, ticket: Ticket, records: &[T]) -> Result<Arc<ReminderSnapshot>, StaleTicket> {
        let mut current = self.current.lock().unwrap_or_else(|p| p.into_inner());
        if ticket.0 < current.version {
            return Err(StaleTicket {
                ticket: ticket.0,
                current: current.version,
            });
        }
        let snapshot = Arc::new(ReminderSnapshot::build(ticket.0, records));
        *current = Arc::clone(&snapshot);
        Ok(snapshot)
    }
}

pub trait ZoneReminderDisplay {
    fn show(&self, map_id: u32, reminders: &[String]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reminder::{ReminderDraft, ReminderRecord};

    fn records() -> Vec<ReminderRecord> {
        vec![
            ReminderRecord::new(15, "kill the shaman", 1),
            ReminderRecord::new(50, "check trading post", 2),
            ReminderRecord::new(15, "hit the vista", 3),
        ]
    }

    #[test]
    fn groups_texts_by_zone_in_order() {
        let snapshot = ReminderSnapshot::build(1, &records());
        assert_eq!(snapshot.zone_count(), 2);
        assert_eq!(snapshot.reminders_for(15), ["kill the shaman", "hit the vista"]);
        assert_eq!(snapshot.reminders_for(50), ["check trading post"]);
        assert!(snapshot.reminders_for(99).is_empty());
    }

    #[test]
    fn grouping_survives_json_round_trip() {
        let json = serde_json::to_string(&records()).unwrap();
        let parsed: Vec<ReminderRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(
            ReminderSnapshot::build(1, &parsed),
            ReminderSnapshot::build(1, &records())
        );
    }

    #[test]
    fn stale_tickets_are_rejected() {
        let store = ReminderStore::new();
        let early = store.ticket();
        let late = store.ticket();

        let applied = store.apply(late, &[ReminderDraft::new(15, "newer")]).unwrap();
        assert_eq!(applied.version(), 2);

        let stale = store.apply(early, &[ReminderDraft::new(15, "older")]);
        assert_eq!(stale, Err(StaleTicket { ticket: 1, current: 2 }));
        assert_eq!(store.snapshot().reminders_for(15), ["newer"]);
    }

    #[test]
    fn apply_replaces_everything() {
        let store = ReminderStore::new();
        store.apply(store.ticket(), &records()).unwrap();
        let shared = store.clone();
        shared
            .apply(shared.ticket(), &[ReminderDraft::new(23, "only this")])
            .unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.zone_count(), 1);
        assert!(snapshot.reminders_for(15).is_empty());
        assert_eq!(snapshot.reminders_for(23), ["only this"]);
    }
}
