use std::sync::Arc;

use super::api::ReminderApi;
use super::cache::{ReminderSnapshot, ReminderStore, Ticket, ZoneReminderDisplay};
use super::grid::EditGrid;
use crate::error::ReminderError;
use crate::models::reminder::ZoneText;
use crate::models::zone::PlayerState;

/// What the caller should do with the link that opened the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    PreventDefault,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// No valid rows; nothing was sent.
    NothingToSave,
    Saved { count: usize, version: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Updated { count: usize, version: u64 },
    /// The server had no reminders; the cache was left as it was.
    Empty,
    /// A newer rebuild landed while this one was in flight.
    Superseded,
}

/// View model of the reminders modal and owner of the zone cache.
pub struct ReminderEditor<A, D> {
    api: A,
    display: D,
    store: ReminderStore,
    grid: EditGrid,
    modal_visible: bool,
    player: PlayerState,
}

impl<A: ReminderApi, D: ZoneReminderDisplay> ReminderEditor<A, D> {
    pub fn new(api: A, display: D, store: ReminderStore, player: PlayerState) -> Self {
        Self {
            api,
            display,
            store,
            grid: EditGrid::new(),
            modal_visible: false,
            player,
        }
    }

    pub fn grid(&self) -> &EditGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut EditGrid {
        &mut self.grid
    }

    pub fn is_modal_visible(&self) -> bool {
        self.modal_visible
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn snapshot(&self) -> Arc<ReminderSnapshot> {
        self.store.snapshot()
    }

    /// Fetches the list; fills the grid and rebuilds the cache when it is
    /// not empty. Returns how many records came back.
    pub async fn load_reminders(&mut self) -> Result<usize, ReminderError> {
        let ticket = self.store.ticket();
        let records = self.api.fetch_all().await?;
        if !records.is_empty() {
            self.grid.load(&records);
            self.rebuild_cache(ticket, &records);
        }
        tracing::debug!("Loaded {} zone reminders", records.len());
        Ok(records.len())
    }

    pub async fn open_edit_modal(&mut self) -> Result<LinkAction, ReminderError> {
        self.load_reminders().await?;
        self.modal_visible = true;
        Ok(LinkAction::PreventDefault)
    }

    pub fn close_edit_modal(&mut self) {
        self.modal_visible = false;
    }

    /// Sends the grid's rows as the complete reminder set. Half-filled rows
    /// block the save; a grid with nothing to save sends no request.
    pub async fn save_reminders(&mut self) -> Result<SaveOutcome, ReminderError> {
        let collection = self.grid.collect();
        if !collection.issues.is_empty() {
            return Err(ReminderError::Validation(collection.issues));
        }
        if collection.drafts.is_empty() {
            tracing::debug!("No zone reminders to save");
            return Ok(SaveOutcome::NothingToSave);
        }

        let ticket = self.store.ticket();
        self.api.replace_all(&collection.drafts).await?;
        self.modal_visible = false;
        // The server stores exactly what it was sent.
        let version = match self.rebuild_cache(ticket, &collection.drafts) {
            Some(snapshot) => snapshot.version(),
            None => self.store.snapshot().version(),
        };
        tracing::info!("Saved {} zone reminders", collection.drafts.len());
        Ok(SaveOutcome::Saved {
            count: collection.drafts.len(),
            version,
        })
    }

    /// Background refresh. An empty server list does not clear the cache.
    pub async fn refresh_reminders(&mut self) -> Result<RefreshOutcome, ReminderError> {
        let ticket = self.store.ticket();
        let records = self.api.fetch_all().await?;
        if records.is_empty() {
            tracing::debug!("Server returned no zone reminders, keeping cache");
            return Ok(RefreshOutcome::Empty);
        }
        Ok(match self.rebuild_cache(ticket, &records) {
            Some(snapshot) => RefreshOutcome::Updated {
                count: records.len(),
                version: snapshot.version(),
            },
            None => RefreshOutcome::Superseded,
        })
    }

    /// Replaces the whole cache and re-shows the current zone's reminders.
    /// Returns `None` if a newer rebuild already happened.
    pub fn rebuild_cache<T: ZoneText>(&mut self, ticket: Ticket, records: &[T]) -> Option<Arc<ReminderSnapshot>> {
        match self.store.apply(ticket, records) {
            Ok(snapshot) => {
                if let Some(map_id) = self.player.current_map_id {
                    self.display.show(map_id, snapshot.reminders_for(map_id));
                }
                Some(snapshot)
            }
            Err(stale) => {
                tracing::debug!(
                    "Dropping reminder rebuild {} older than current {}",
                    stale.ticket,
                    stale.current
                );
                None
            }
        }
    }

    pub fn set_current_zone(&mut self, map_id: u32) {
        if self.player.current_map_id == Some(map_id) {
            return;
        }
        tracing::debug!(
            "Player entered {} ({})",
            map_id,
            self.player.zone_name(map_id).unwrap_or("unknown zone")
        );
        self.player.current_map_id = Some(map_id);
        let snapshot = self.store.snapshot();
        self.display.show(map_id, snapshot.reminders_for(map_id));
    }
}
