pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskPriority, TaskQuery, TaskStats, TaskStatus, TaskUpdate};
pub use user::{NewUser, User};
