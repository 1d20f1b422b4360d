//! Persistence ports for users and tasks.
//!
//! Services depend only on these traits. [`postgres::PgStore`] backs the
//! server binary; [`memory::InMemoryStore`] backs the tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskQuery, User};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Inserts a user, failing with `AppError::Conflict` if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync + 'static {
    async fn insert_task(&self, task: Task) -> Result<Task, AppError>;

    /// Looks a task up by id regardless of owner.
    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Tasks owned by `user_id` that match `query`, newest first.
    async fn list_tasks(&self, user_id: i32, query: &TaskQuery) -> Result<Vec<Task>, AppError>;

    /// Overwrites every mutable column of an existing task.
    async fn update_task(&self, task: Task) -> Result<Task, AppError>;

    /// Returns `false` if no task had this id.
    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError>;
}
