// ABOUTME: Task type definitions
// ABOUTME: Persisted task fields, derived status labels and create/update inputs

use serde::{Deserialize, Serialize};

/// Display status computed from completion, due time and the current instant.
/// Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "overdue")]
    Overdue,
    #[serde(rename = "wait to be done")]
    WaitToBeDone,
    #[serde(rename = "schedule")]
    Schedule,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::Overdue => "overdue",
            TaskStatus::WaitToBeDone => "wait to be done",
            TaskStatus::Schedule => "schedule",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub owner_id: i64,
    pub content: String,
    pub priority: Option<String>,
    /// Milliseconds since the epoch, 0 when the task has no deadline
    pub due_time: i64,
    pub is_completed: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A task paired with the status derived at read time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskWithStatus {
    #[serde(flatten)]
    pub task: Task,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskCreateInput {
    pub content: String,
    pub due_time: Option<i64>,
    pub priority: Option<String>,
}

/// Sparse update: only `Some` fields are written.
/// `due_time: Some(0)` clears the deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskUpdateInput {
    pub content: Option<String>,
    pub priority: Option<String>,
    pub due_time: Option<i64>,
    pub is_completed: Option<bool>,
}

impl TaskUpdateInput {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.priority.is_none()
            && self.due_time.is_none()
            && self.is_completed.is_none()
    }
}
