// ABOUTME: Task service coordinating id generation, persistence and status derivation
// ABOUTME: Every operation takes the acting owner explicitly

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info};

use crate::error::TaskError;
use crate::storage::TaskRepository;
use crate::types::{Task, TaskCreateInput, TaskUpdateInput, TaskWithStatus};
use todo_core::{now_millis, Clock, IdGenerator};

#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
    ids: Arc<dyn IdGenerator>,
    clock: Clock,
    offset: FixedOffset,
}

impl TaskService {
    /// Service evaluating calendar days in `offset`
    pub fn new(
        repository: Arc<dyn TaskRepository>,
        ids: Arc<dyn IdGenerator>,
        offset: FixedOffset,
    ) -> Self {
        Self::with_clock(repository, ids, offset, Arc::new(now_millis))
    }

    pub fn with_clock(
        repository: Arc<dyn TaskRepository>,
        ids: Arc<dyn IdGenerator>,
        offset: FixedOffset,
        clock: Clock,
    ) -> Self {
        Self {
            repository,
            ids,
            clock,
            offset,
        }
    }

    fn now(&self) -> DateTime<FixedOffset> {
        let millis = (self.clock)();
        DateTime::<Utc>::from_timestamp_millis(millis)
            .unwrap_or_default()
            .with_timezone(&self.offset)
    }

    fn with_status(&self, task: Task) -> TaskWithStatus {
        let status = task.status_at(&self.now());
        TaskWithStatus { task, status }
    }

    pub async fn create_task(
        &self,
        owner_id: i64,
        input: TaskCreateInput,
    ) -> Result<TaskWithStatus, TaskError> {
        let id = self.ids.generate_id().await?;
        let now = (self.clock)();

        let task = Task {
            id,
            owner_id,
            content: input.content,
            priority: input.priority,
            due_time: input.due_time.unwrap_or(0),
            is_completed: false,
            created_at: now,
            updated_at: now,
        };

        self.repository.insert(&task).await?;
        info!("Created task {} for user {}", task.id, owner_id);

        Ok(self.with_status(task))
    }

    pub async fn get_task(&self, owner_id: i64, task_id: i64) -> Result<TaskWithStatus, TaskError> {
        let task = self.repository.find_by_id(owner_id, task_id).await?;
        Ok(self.with_status(task))
    }

    pub async fn list_tasks(&self, owner_id: i64) -> Result<Vec<TaskWithStatus>, TaskError> {
        let tasks = self.repository.find_by_owner(owner_id).await?;
        debug!("Listed {} tasks for user {}", tasks.len(), owner_id);

        let now = self.now();
        Ok(tasks
            .into_iter()
            .map(|task| {
                let status = task.status_at(&now);
                TaskWithStatus { task, status }
            })
            .collect())
    }

    /// Write only the supplied fields; `updated_at` is always refreshed
    pub async fn apply_partial_update(
        &self,
        owner_id: i64,
        task_id: i64,
        fields: TaskUpdateInput,
    ) -> Result<(), TaskError> {
        let now = (self.clock)();
        self.repository
            .update_fields(owner_id, task_id, &fields, now)
            .await
    }

    pub async fn delete_task(&self, owner_id: i64, task_id: i64) -> Result<(), TaskError> {
        self.repository.delete(owner_id, task_id).await?;
        info!("Deleted task {} for user {}", task_id, owner_id);
        Ok(())
    }
}
