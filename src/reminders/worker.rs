use futures::FutureExt;
use tokio::sync::mpsc::Sender as MPSCSender;
use tokio::sync::watch::Receiver as SPMCReceiver;
use tokio::time::Duration;

use super::api::ReminderApi;
use super::cache::ZoneReminderDisplay;
use super::editor::ReminderEditor;
use super::queue::{ReminderCommand, RequestQueue, Task, TaskOutcome, TaskPriority};
use crate::log::{LogSeverity, Message};
use crate::steward::Steward;

enum WorkerEvent {
    Command(bool),
    Tick,
    Task(Task),
}

/// Owns the editor and runs queued reminder requests one at a time, adding a
/// refresh every `refresh_every`.
pub struct ReminderWorker<A, D> {
    label: String,
    editor: ReminderEditor<A, D>,
    queue: RequestQueue,
    cmd_rx: SPMCReceiver<String>,
    log_tx: MPSCSender<Message>,
    refresh_every: Duration,
}

impl<A: ReminderApi, D: ZoneReminderDisplay> ReminderWorker<A, D> {
    pub fn new(
        label: String,
        editor: ReminderEditor<A, D>,
        queue: RequestQueue,
        cmd_rx: SPMCReceiver<String>,
        log_tx: MPSCSender<Message>,
        refresh_every: Duration,
    ) -> Self {
        Self {
            label,
            editor,
            queue,
            cmd_rx,
            log_tx,
            refresh_every,
        }
    }

    async fn log(&self, severity: LogSeverity, content: String) {
        if self
            .log_tx
            .send(Message::new(severity, self.label.to_string(), content))
            .await
            .is_err()
        {
            tracing::warn!("Log channel closed, {} message dropped", self.label);
        }
    }

    async fn handle(&mut self, task: Task) {
        tracing::debug!("{} running {} ({})", self.label, task.command, task.uuid);
        let outcome = match &task.command {
            ReminderCommand::Load => match self.editor.load_reminders().await {
                Ok(count) => TaskOutcome::Loaded(count),
                Err(e) => TaskOutcome::Failed(e.to_string()),
            },
            ReminderCommand::Refresh => match self.editor.refresh_reminders().await {
                Ok(refreshed) => TaskOutcome::Refreshed(refreshed),
                Err(e) => TaskOutcome::Failed(e.to_string()),
            },
            ReminderCommand::Save(rows) => {
                self.editor.grid_mut().replace_rows(rows.clone());
                match self.editor.save_reminders().await {
                    Ok(saved) => TaskOutcome::Saved(saved),
                    Err(e) => TaskOutcome::Failed(e.to_string()),
                }
            }
        };
        let severity = match outcome {
            TaskOutcome::Failed(_) => LogSeverity::Priority,
            _ => LogSeverity::Routine,
        };
        self.log(severity, format!("{} finished: {:?}", task.command, outcome))
            .await;
        task.finish(outcome);
    }

    /// Runs until shutdown is broadcast; hands the editor back afterwards.
    pub async fn initialize(mut self, steward: Steward) -> ReminderEditor<A, D> {
        let process_id = self.label.to_string();
        self.log(
            LogSeverity::Routine,
            format!(
                "Initializing {} with refresh every {}s",
                process_id,
                self.refresh_every.as_secs()
            ),
        )
        .await;
        steward.process_ready(&process_id);

        let mut ticker = tokio::time::interval(self.refresh_every);
        // The first tick fires immediately; the initial load is queued by the caller.
        ticker.tick().await;

        loop {
            let event = {
                let cmd = self.cmd_rx.changed().fuse();
                let tick = ticker.tick().fuse();
                let task = self.queue.next_task().fuse();
                futures::pin_mut!(cmd, tick, task);
                futures::select! {
                    changed = cmd => WorkerEvent::Command(changed.is_ok()),
                    _ = tick => WorkerEvent::Tick,
                    task = task => WorkerEvent::Task(task),
                }
            };
            match event {
                WorkerEvent::Command(alive) => {
                    if !alive || *self.cmd_rx.borrow() == "shutdown" {
                        break;
                    }
                }
                WorkerEvent::Tick => {
                    self.queue
                        .send_task(Task::new(TaskPriority::Low, ReminderCommand::Refresh, None));
                }
                WorkerEvent::Task(task) => self.handle(task).await,
            }
        }

        steward.process_stop(&process_id);
        self.log(LogSeverity::Routine, format!("Closed {}", process_id))
            .await;
        self.editor
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::ReminderError;
    use crate::models::reminder::{ReminderDraft, ReminderRecord};
    use crate::models::zone::PlayerState;
    use crate::reminders::cache::ReminderStore;
    use crate::reminders::editor::SaveOutcome;
    use crate::reminders::grid::GridRow;

    #[derive(Default)]
    struct ServerState {
        stored: Mutex<Vec<ReminderRecord>>,
    }

    struct InMemoryApi(std::sync::Arc<ServerState>);

    impl ReminderApi for InMemoryApi {
        async fn fetch_all(&self) -> Result<Vec<ReminderRecord>, ReminderError> {
            Ok(self.0.stored.lock().unwrap().clone())
        }

        async fn replace_all(&self, drafts: &[ReminderDraft]) -> Result<(), ReminderError> {
            let records = drafts
                .iter()
                .enumerate()
                .map(|(i, d)| ReminderRecord::new(d.map_id, d.text.to_string(), i as u32 + 1))
                .collect();
            *self.0.stored.lock().unwrap() = records;
            Ok(())
        }
    }

    struct NoDisplay;

    impl ZoneReminderDisplay for NoDisplay {
        fn show(&self, _map_id: u32, _reminders: &[String]) {}
    }

    #[tokio::test]
    async fn processes_queue_and_stops_on_shutdown() {
        let server = std::sync::Arc::new(ServerState::default());
        server
            .stored
            .lock()
            .unwrap()
            .push(ReminderRecord::new(15, "from server", 1));

        let (cmd_tx, cmd_rx) = tokio::sync::watch::channel("run".to_string());
        let steward = Steward::new(cmd_tx);
        let (log_tx, mut log_rx) = tokio::sync::mpsc::channel(16);
        tokio::spawn(async move { while log_rx.recv().await.is_some() {} });

        let store = ReminderStore::new();
        let editor = ReminderEditor::new(
            InMemoryApi(server.clone()),
            NoDisplay,
            store.clone(),
            PlayerState::default(),
        );
        let queue = RequestQueue::new();
        let worker = ReminderWorker::new(
            "REMINDERS".to_string(),
            editor,
            queue.clone(),
            cmd_rx,
            log_tx,
            Duration::from_secs(3600),
        );
        let handle = tokio::spawn(worker.initialize(steward.clone()));

        let loaded = queue.request(TaskPriority::ASAP, ReminderCommand::Load);
        assert_eq!(loaded.await.unwrap(), TaskOutcome::Loaded(1));
        assert_eq!(store.snapshot().reminders_for(15), ["from server"]);

        let saved = queue.request(
            TaskPriority::Normal,
            ReminderCommand::Save(vec![GridRow::new(23, "new note")]),
        );
        assert!(matches!(
            saved.await.unwrap(),
            TaskOutcome::Saved(SaveOutcome::Saved { count: 1, .. })
        ));
        assert!(store.snapshot().reminders_for(15).is_empty());
        assert_eq!(server.stored.lock().unwrap()[0].text, "new note");

        let remaining = steward.shutdown_gracefully(Duration::from_secs(2)).await;
        assert!(remaining.is_empty());
        let editor = handle.await.unwrap();
        assert!(!editor.is_modal_visible());
    }
}
