use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::{oneshot, Notify};
use uuid::Uuid;

use super::editor::{RefreshOutcome, SaveOutcome};
use super::grid::GridRow;

#[derive(strum_macros::Display, Debug, Clone, PartialEq)]
pub enum ReminderCommand {
    Load,
    Refresh,
    Save(Vec<GridRow>),
}

// Enum for task priority
#[derive(strum_macros::Display, Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum TaskPriority {
    Low = 4,
    #[default]
    Normal = 3,
    High = 2,
    ASAP = 1,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Loaded(usize),
    Refreshed(RefreshOutcome),
    Saved(SaveOutcome),
    Failed(String),
}

#[derive(Debug)]
pub struct Task {
    pub uuid: Uuid,
    pub priority: TaskPriority,
    pub timestamp: DateTime<Utc>,
    pub command: ReminderCommand,
    pub callback: Option<oneshot::Sender<TaskOutcome>>,
}

impl Task {
    pub fn new(priority: TaskPriority, command: ReminderCommand, callback: Option<oneshot::Sender<TaskOutcome>>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            priority,
            timestamp: Utc::now(),
            command,
            callback,
        }
    }

    pub fn finish(self, outcome: TaskOutcome) {
        if let Some(callback) = self.callback {
            if callback.send(outcome).is_err() {
                tracing::debug!("Caller for task {} went away", self.uuid);
            }
        }
    }
}

// Serial queue of reminder requests. Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    tasks: Arc<Mutex<Vec<Task>>>,
    notify: Arc<Notify>,
}

impl RequestQueue {
    pub fn new() -> Self {
        RequestQueue::default()
    }

    // A refresh is dropped if one is already waiting
    pub fn send_task(&self, task: Task) -> bool {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        if task.command == ReminderCommand::Refresh
            && tasks.iter().any(|t| t.command == ReminderCommand::Refresh)
        {
            tracing::debug!("Refresh already queued, dropping {}", task.uuid);
            return false;
        }
        tasks.push(task);
        drop(tasks);
        self.notify.notify_one();
        true
    }

    pub fn request(&self, priority: TaskPriority, command: ReminderCommand) -> oneshot::Receiver<TaskOutcome> {
        let (tx, rx) = oneshot::channel();
        self.send_task(Task::new(priority, command, Some(tx)));
        rx
    }

    // Most urgent task, oldest first within a priority
    pub fn get_task(&self) -> Option<Task> {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        let index = tasks
            .iter()
            .enumerate()
            .min_by_key(|(i, t)| (t.priority, t.timestamp, *i))
            .map(|(i, _)| i)?;
        Some(tasks.remove(index))
    }

    pub async fn next_task(&self) -> Task {
        loop {
            if let Some(task) = self.get_task() {
                return task;
            }
            self.notify.notified().await;
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgent_tasks_come_first_then_fifo() {
        let queue = RequestQueue::new();
        queue.send_task(Task::new(TaskPriority::Low, ReminderCommand::Load, None));
        queue.send_task(Task::new(TaskPriority::Normal, ReminderCommand::Save(vec![]), None));
        queue.send_task(Task::new(TaskPriority::ASAP, ReminderCommand::Refresh, None));
        queue.send_task(Task::new(
            TaskPriority::Normal,
            ReminderCommand::Save(vec![GridRow::new(15, "x")]),
            None,
        ));

        let order: Vec<ReminderCommand> = std::iter::from_fn(|| queue.get_task()).map(|t| t.command).collect();
        assert_eq!(
            order,
            vec![
                ReminderCommand::Refresh,
                ReminderCommand::Save(vec![]),
                ReminderCommand::Save(vec![GridRow::new(15, "x")]),
                ReminderCommand::Load,
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn duplicate_refreshes_collapse() {
        let queue = RequestQueue::new();
        assert!(queue.send_task(Task::new(TaskPriority::Normal, ReminderCommand::Refresh, None)));
        assert!(!queue.send_task(Task::new(TaskPriority::High, ReminderCommand::Refresh, None)));
        assert!(queue.send_task(Task::new(TaskPriority::Normal, ReminderCommand::Load, None)));
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn next_task_wakes_on_send() {
        let queue = RequestQueue::new();
        let sender = queue.clone();
        let handle = tokio::spawn(async move { queue.next_task().await.command });
        tokio::task::yield_now().await;
        sender.send_task(Task::new(TaskPriority::Normal, ReminderCommand::Load, None));
        assert_eq!(handle.await.unwrap(), ReminderCommand::Load);
    }

    #[tokio::test]
    async fn finish_reports_to_requester() {
        let queue = RequestQueue::new();
        let rx = queue.request(TaskPriority::High, ReminderCommand::Load);
        queue.get_task().unwrap().finish(TaskOutcome::Loaded(4));
        assert_eq!(rx.await.unwrap(), TaskOutcome::Loaded(4));
    }
}
