use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Task, TaskInput, TaskQuery, TaskStats, TaskUpdate};
use crate::store::TaskStore;

/// Owner-scoped task operations.
///
/// Every operation takes the caller's user id; tasks belonging to someone
/// else are reported as `Forbidden`, missing ones as `NotFound`.
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    pub async fn list(&self, owner_id: i32, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        self.tasks.list_tasks(owner_id, query).await
    }

    pub async fn get(&self, owner_id: i32, task_id: Uuid) -> Result<Task, AppError> {
        let task = self
            .tasks
            .find_task(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
        task.ensure_owned_by(owner_id)?;
        Ok(task)
    }

    pub async fn create(&self, owner_id: i32, input: TaskInput) -> Result<Task, AppError> {
        input.validate()?;
        let task = self.tasks.insert_task(Task::new(input, owner_id)?).await?;
        log::info!("User {} created task {}", owner_id, task.id);
        Ok(task)
    }

    pub async fn update(
        &self,
        owner_id: i32,
        task_id: Uuid,
        update: TaskUpdate,
    ) -> Result<Task, AppError> {
        let mut task = self.get(owner_id, task_id).await?;
        update.validate()?;
        task.apply(update);
        let task = self.tasks.update_task(task).await?;
        log::debug!("User {} updated task {}", owner_id, task.id);
        Ok(task)
    }

    /// Removes the task and returns its id.
    pub async fn delete(&self, owner_id: i32, task_id: Uuid) -> Result<Uuid, AppError> {
        self.get(owner_id, task_id).await?;
        if !self.tasks.delete_task(task_id).await? {
            return Err(AppError::NotFound("Task not found".into()));
        }
        log::info!("User {} deleted task {}", owner_id, task_id);
        Ok(task_id)
    }

    /// Counts over all of the owner's tasks, with overdue judged against the current time.
    pub async fn stats(&self, owner_id: i32) -> Result<TaskStats, AppError> {
        let tasks = self.tasks.list_tasks(owner_id, &TaskQuery::default()).await?;
        Ok(TaskStats::collect(&tasks, Utc::now()))
    }
}
