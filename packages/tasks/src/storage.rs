// ABOUTME: Task storage layer using SQLite
// ABOUTME: Owner-scoped insert, lookup, sparse update and hard delete of task rows

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::TaskError;
use crate::types::{Task, TaskUpdateInput};
use todo_storage::StorageError;

/// Persistence gateway for tasks. Every lookup is scoped by owner, so a task
/// belonging to someone else is indistinguishable from a missing one.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, task: &Task) -> Result<(), TaskError>;

    async fn find_by_id(&self, owner_id: i64, task_id: i64) -> Result<Task, TaskError>;

    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Task>, TaskError>;

    /// Write the supplied fields plus `updated_at`. `NotFound` when no row matched.
    async fn update_fields(
        &self,
        owner_id: i64,
        task_id: i64,
        fields: &TaskUpdateInput,
        updated_at: i64,
    ) -> Result<(), TaskError>;

    async fn delete(&self, owner_id: i64, task_id: i64) -> Result<(), TaskError>;
}

pub struct TaskStorage {
    pool: SqlitePool,
}

impl TaskStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> Result<Task, StorageError> {
        Ok(Task {
            id: row.try_get("id")?,
            owner_id: row.try_get("user_id")?,
            content: row.try_get("content")?,
            priority: row.try_get("priority")?,
            due_time: row.try_get("due_time")?,
            is_completed: row.try_get("is_completed")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl TaskRepository for TaskStorage {
    async fn insert(&self, task: &Task) -> Result<(), TaskError> {
        debug!("Creating task {} for user {}", task.id, task.owner_id);

        sqlx::query(
            r#"
            INSERT INTO tasks (id, user_id, content, priority, due_time, is_completed, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(task.id)
        .bind(task.owner_id)
        .bind(&task.content)
        .bind(&task.priority)
        .bind(task.due_time)
        .bind(task.is_completed)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(())
    }

    async fn find_by_id(&self, owner_id: i64, task_id: i64) -> Result<Task, TaskError> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = ? AND user_id = ?")
            .bind(task_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or(TaskError::NotFound)?;

        Ok(Self::row_to_task(&row)?)
    }

    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Task>, TaskError> {
        debug!("Fetching tasks for user: {}", owner_id);

        let rows = sqlx::query("SELECT * FROM tasks WHERE user_id = ? ORDER BY created_at, id")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let tasks = rows
            .iter()
            .map(Self::row_to_task)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    async fn update_fields(
        &self,
        owner_id: i64,
        task_id: i64,
        fields: &TaskUpdateInput,
        updated_at: i64,
    ) -> Result<(), TaskError> {
        debug!("Updating task: {}", task_id);

        // Build dynamic UPDATE query based on provided fields
        let mut query = String::from("UPDATE tasks SET updated_at = ?");
        if fields.content.is_some() {
            query.push_str(", content = ?");
        }
        if fields.priority.is_some() {
            query.push_str(", priority = ?");
        }
        if fields.due_time.is_some() {
            query.push_str(", due_time = ?");
        }
        if fields.is_completed.is_some() {
            query.push_str(", is_completed = ?");
        }
        query.push_str(" WHERE id = ? AND user_id = ?");

        let mut q = sqlx::query(&query).bind(updated_at);
        if let Some(content) = &fields.content {
            q = q.bind(content);
        }
        if let Some(priority) = &fields.priority {
            q = q.bind(priority);
        }
        if let Some(due_time) = fields.due_time {
            q = q.bind(due_time);
        }
        if let Some(is_completed) = fields.is_completed {
            q = q.bind(is_completed);
        }

        let result = q
            .bind(task_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(TaskError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, owner_id: i64, task_id: i64) -> Result<(), TaskError> {
        debug!("Deleting task: {}", task_id);

        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(task_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(TaskError::NotFound);
        }
        Ok(())
    }
}
