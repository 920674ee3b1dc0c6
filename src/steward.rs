use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration, Instant};

// Describes the state of processes
#[derive(strum_macros::Display, Serialize, Deserialize, Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ProcessState {
    #[default]
    START,
    READY,
    CLOSE,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ProcessStatus {
    pub last_update_timestamp: String,
    pub process_id: String,
    pub state: ProcessState,
}

impl ProcessStatus {
    pub fn new(process_id: String, state: ProcessState) -> Self {
        Self {
            last_update_timestamp: Utc::now().to_string(),
            process_id,
            state,
        }
    }
}

// Steward tracks the long-running tasks and broadcasts shutdown to them
#[derive(Debug, Clone)]
pub struct Steward {
    process_status_table: Arc<Mutex<HashMap<String, ProcessStatus>>>,
    cmd_tx: Arc<tokio::sync::watch::Sender<String>>,
}

impl Steward {
    pub fn new(cmd_tx: tokio::sync::watch::Sender<String>) -> Self {
        Self {
            process_status_table: Default::default(),
            cmd_tx: Arc::new(cmd_tx),
        }
    }

    fn set_state(&self, pid: &str, state: ProcessState) {
        let mut table = self
            .process_status_table
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        table.insert(pid.to_string(), ProcessStatus::new(pid.to_string(), state));
    }

    pub fn get_process_state(&self, pid: &str) -> Option<ProcessState> {
        let table = self
            .process_status_table
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        table.get(pid).map(|status| status.state)
    }

    pub fn process_start(&self, pid: &str) {
        self.set_state(pid, ProcessState::START);
    }

    pub fn process_ready(&self, pid: &str) {
        self.set_state(pid, ProcessState::READY);
    }

    pub fn process_stop(&self, pid: &str) {
        self.set_state(pid, ProcessState::CLOSE);
    }

    pub fn safe_shutdown(&self) {
        if self.cmd_tx.send("shutdown".to_string()).is_err() {
            tracing::debug!("No processes listening for shutdown");
        }
    }

    pub fn check_shutdown_status(&self) -> Vec<ProcessStatus> {
        let table = self
            .process_status_table
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        table
            .values()
            .filter(|status| status.state != ProcessState::CLOSE)
            .cloned()
            .collect()
    }

    pub async fn wait_ready(&self, pid: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.get_process_state(pid) == Some(ProcessState::READY) {
                return true;
            }
            sleep(Duration::from_millis(10)).await;
        }
        false
    }

    /// Broadcasts shutdown and waits for every process to close. Returns
    /// whatever was still running when `timeout` ran out.
    pub async fn shutdown_gracefully(&self, timeout: Duration) -> Vec<ProcessStatus> {
        let shutdown_timestamp = Utc::now();
        self.safe_shutdown();

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = self.check_shutdown_status();
            if remaining.is_empty() {
                tracing::debug!("All processes closed");
                return remaining;
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    "Gave up waiting for processes after {}s: {:?}",
                    Utc::now()
                        .signed_duration_since(shutdown_timestamp)
                        .num_seconds(),
                    remaining
                        .iter()
                        .map(|p| (p.process_id.to_string(), p.state.to_string()))
                        .collect::<Vec<(String, String)>>(),
                );
                return remaining;
            }
            sleep(Duration::from_millis(50)).await;
        }
    }
}
