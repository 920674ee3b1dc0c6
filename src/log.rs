use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Receiver as MPSCReceiver;
use tokio::sync::watch::Receiver as SPMCReceiver;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::steward::Steward;

/// Installs the global tracing subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let result = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
    if let Err(e) = result {
        eprintln!("Tracing already initialized: {}", e);
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Message {
    pub severity: LogSeverity,
    pub origin: String,
    pub content: String,
}

impl Message {
    pub fn new(severity: LogSeverity, origin: String, content: String) -> Self {
        Self {
            severity,
            origin,
            content,
        }
    }
}

#[derive(
    strum_macros::Display, Serialize, Deserialize, Debug, Clone, Copy, Default, Eq, PartialEq, Hash,
)]
pub enum LogSeverity {
    #[default]
    Routine,
    Priority,
    Critical,
}

// A message as it was recorded, kept for the in-memory history
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: LogSeverity,
    pub origin: String,
    pub content: String,
}

impl LogEntry {
    fn from_message(msg: Message) -> Self {
        Self {
            timestamp: Utc::now(),
            severity: msg.severity,
            origin: msg.origin,
            content: msg.content,
        }
    }
}

fn emit(entry: &LogEntry) {
    match entry.severity {
        LogSeverity::Routine => tracing::info!(origin = %entry.origin, "{}", entry.content),
        LogSeverity::Priority => tracing::warn!(origin = %entry.origin, "{}", entry.content),
        LogSeverity::Critical => tracing::error!(origin = %entry.origin, "{}", entry.content),
    }
}

pub struct Log {
    label: String,
    cmd_rx: SPMCReceiver<String>,
    log_rx: MPSCReceiver<Message>,
    history: Vec<LogEntry>,
    history_limit: usize,
}

impl Log {
    pub fn new(label: String, cmd_rx: SPMCReceiver<String>, log_rx: MPSCReceiver<Message>) -> Self {
        Self {
            label,
            cmd_rx,
            log_rx,
            history: Vec::new(),
            history_limit: 256,
        }
    }

    pub fn history(&self) -> &[LogEntry] {
        &self.history
    }

    fn record(&mut self, msg: Message) {
        let entry = LogEntry::from_message(msg);
        emit(&entry);
        if self.history.len() == self.history_limit {
            self.history.remove(0);
        }
        self.history.push(entry);
    }

    /// Runs until shutdown is broadcast or every sender is gone. Messages
    /// still buffered at shutdown are flushed first.
    pub async fn initialize(&mut self, steward: Steward) {
        let process_id = self.label.to_string();
        steward.process_ready(&process_id);
        tracing::debug!("Initializing {}", process_id);

        loop {
            tokio::select! {
                changed = self.cmd_rx.changed() => {
                    if changed.is_err() || *self.cmd_rx.borrow() == "shutdown" {
                        break;
                    }
                }
                recv = self.log_rx.recv() => match recv {
                    Some(msg) => self.record(msg),
                    None => {
                        self.record(Message::new(
                            LogSeverity::Critical,
                            process_id.to_string(),
                            "LOG TX DISCONNECTED".to_string(),
                        ));
                        break;
                    }
                },
            }
        }

        while let Ok(msg) = self.log_rx.try_recv() {
            self.record(msg);
        }
        steward.process_stop(&process_id);
        tracing::debug!("Closed log {}", self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steward::ProcessState;

    #[tokio::test]
    async fn drains_messages_until_senders_close() {
        let (cmd_tx, cmd_rx) = tokio::sync::watch::channel("run".to_string());
        let steward = Steward::new(cmd_tx);
        let (log_tx, log_rx) = tokio::sync::mpsc::channel(4);
        let mut log = Log::new("LOG".to_string(), cmd_rx, log_rx);

        log_tx
            .send(Message::new(LogSeverity::Routine, "TEST".to_string(), "hello".to_string()))
            .await
            .unwrap();
        drop(log_tx);
        log.initialize(steward.clone()).await;

        assert_eq!(log.history().len(), 2);
        assert_eq!(log.history()[0].content, "hello");
        assert_eq!(log.history()[1].severity, LogSeverity::Critical);
        assert!(log.history()[0].timestamp <= log.history()[1].timestamp);
        assert_eq!(steward.get_process_state("LOG"), Some(ProcessState::CLOSE));
    }

    #[tokio::test]
    async fn flushes_buffered_messages_on_shutdown() {
        let (cmd_tx, cmd_rx) = tokio::sync::watch::channel("run".to_string());
        let steward = Steward::new(cmd_tx);
        let (log_tx, log_rx) = tokio::sync::mpsc::channel(4);
        let mut log = Log::new("LOG".to_string(), cmd_rx, log_rx);

        log_tx
            .send(Message::new(LogSeverity::Priority, "TEST".to_string(), "late".to_string()))
            .await
            .unwrap();
        steward.safe_shutdown();
        log.initialize(steward.clone()).await;

        assert!(log.history().iter().any(|e| e.content == "late"));
        drop(log_tx);
    }
}
