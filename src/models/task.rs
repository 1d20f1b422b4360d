use chrono::{DateTime, NaiveDate, Utc};
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::AppError;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum. Any status may be changed to any other.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    Completed,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task.
///
/// `title` is optional at the deserialization layer so that a missing title is
/// reported as a validation error instead of a JSON parse error.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(length(max = 50))]
    pub category: Option<String>,

    pub priority: Option<TaskPriority>,

    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update for a task.
///
/// A field left out of the JSON body is `None` and keeps its stored value.
/// For the nullable fields, an explicit `null` arrives as `Some(None)` and
/// clears the stored value.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[validate(
        length(max = 200),
        custom(function = "validate_not_blank", message = "Title cannot be empty")
    )]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,

    #[validate(length(max = 50))]
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category: Option<Option<String>>,

    pub priority: Option<TaskPriority>,

    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "deserialize_due_date_patch")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Represents query parameters for filtering tasks when listing them.
/// Listing is always scoped to the authenticated user. An empty value
/// (`?status=`) is the same as leaving the filter out.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TaskQuery {
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub category: Option<String>,
    /// Case-insensitive substring match on the title.
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub search: Option<String>,
}

/// Aggregate counts over all tasks of one user.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub high_priority: usize,
    pub overdue: usize,
}

impl Task {
    /// Creates a new `Task` owned by `user_id` from a validated `TaskInput`.
    pub fn new(input: TaskInput, user_id: i32) -> Result<Self, AppError> {
        let title = input
            .title
            .filter(|title| !title.trim().is_empty())
            .ok_or_else(|| AppError::ValidationError("Please add a title".into()))?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            description: input.description,
            category: input.category,
            priority: input.priority.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fails with `Forbidden` unless `caller_id` owns this task.
    pub fn ensure_owned_by(&self, caller_id: i32) -> Result<(), AppError> {
        if self.user_id == caller_id {
            Ok(())
        } else {
            Err(AppError::Forbidden("User not authorized".into()))
        }
    }

    /// Merges the fields present in `update` into this task and bumps `updated_at`.
    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        self.updated_at = Utc::now();
    }

    /// A task is overdue when its due date is before `now` and it is not completed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Completed && self.due_date.is_some_and(|due| due < now)
    }
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|status| status != task.status) {
            return false;
        }
        if self.priority.is_some_and(|priority| priority != task.priority) {
            return false;
        }
        if let Some(category) = &self.category {
            if task.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !task.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

impl TaskStats {
    /// Counts `tasks` in a single pass, classifying overdue tasks against `now`.
    pub fn collect<'a>(tasks: impl IntoIterator<Item = &'a Task>, now: DateTime<Utc>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
            }
            if task.priority == TaskPriority::High {
                stats.high_priority += 1;
            }
            if task.is_overdue(now) {
                stats.overdue += 1;
            }
            stats
        })
    }
}

/// Parses a due date sent either as an RFC 3339 timestamp or as the bare
/// `YYYY-MM-DD` value of an HTML date input (midnight UTC). Empty strings and
/// `null` both mean "no due date".
fn parse_due_date(raw: Option<String>) -> Result<Option<DateTime<Utc>>, String> {
    let raw = match raw.as_deref().map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(timestamp.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Some(midnight.and_utc()))
        .ok_or_else(|| format!("invalid due date: {}", raw))
}

fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    parse_due_date(raw).map_err(serde::de::Error::custom)
}

fn deserialize_due_date_patch<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_due_date(deserializer).map(Some)
}

/// Reads an optional query value, treating an empty string as absent.
fn deserialize_non_empty<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.is_empty() => T::deserialize(raw.into_deserializer()).map(Some),
        _ => Ok(None),
    }
}

fn validate_not_blank(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn task_with(status: TaskStatus, priority: TaskPriority, due: Option<DateTime<Utc>>) -> Task {
        Task::new(
            TaskInput {
                title: Some("Test Task".to_string()),
                priority: Some(priority),
                status: Some(status),
                due_date: due,
                ..Default::default()
            },
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_task_creation_defaults() {
        let input = TaskInput {
            title: Some("Test Task".to_string()),
            description: Some("Test Description".to_string()),
            ..Default::default()
        };

        let task = Task::new(input, 1).unwrap();
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.user_id, 1);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_task_creation_requires_title() {
        for title in [None, Some(String::new()), Some("   ".to_string())] {
            let input = TaskInput {
                title,
                ..Default::default()
            };
            assert!(matches!(
                Task::new(input, 1),
                Err(AppError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn test_task_input_validation() {
        let valid_input = TaskInput {
            title: Some("Valid Task".to_string()),
            description: Some("Valid Description".to_string()),
            ..Default::default()
        };
        assert!(valid_input.validate().is_ok());

        let long_title = TaskInput {
            title: Some("a".repeat(201)),
            ..Default::default()
        };
        assert!(long_title.validate().is_err());

        let long_description = TaskInput {
            title: Some("Valid".to_string()),
            description: Some("b".repeat(1001)),
            ..Default::default()
        };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_ownership_predicate() {
        let task = task_with(TaskStatus::Pending, TaskPriority::Low, None);
        assert!(task.ensure_owned_by(1).is_ok());
        assert!(matches!(
            task.ensure_owned_by(2),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            json!("In Progress")
        );
        assert_eq!(
            serde_json::from_value::<TaskPriority>(json!("High")).unwrap(),
            TaskPriority::High
        );
        assert!(serde_json::from_value::<TaskStatus>(json!("Done")).is_err());
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = task_with(TaskStatus::Pending, TaskPriority::Medium, None);
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["userId"], 1);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("dueDate").is_some());
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn test_due_date_accepts_date_input_values() {
        let input: TaskInput =
            serde_json::from_value(json!({ "title": "t", "dueDate": "2024-03-05" })).unwrap();
        assert_eq!(
            input.due_date.unwrap().to_rfc3339(),
            "2024-03-05T00:00:00+00:00"
        );

        let input: TaskInput = serde_json::from_value(
            json!({ "title": "t", "dueDate": "2024-03-05T10:30:00.000Z" }),
        )
        .unwrap();
        assert_eq!(
            input.due_date.unwrap().to_rfc3339(),
            "2024-03-05T10:30:00+00:00"
        );

        let input: TaskInput =
            serde_json::from_value(json!({ "title": "t", "dueDate": "" })).unwrap();
        assert!(input.due_date.is_none());

        assert!(
            serde_json::from_value::<TaskInput>(json!({ "title": "t", "dueDate": "soon" }))
                .is_err()
        );
    }

    #[test]
    fn test_partial_update_merge() {
        let mut task = task_with(TaskStatus::Pending, TaskPriority::Low, None);
        task.description = Some("keep me".to_string());
        task.category = Some("Work".to_string());
        let before = task.updated_at;

        let update: TaskUpdate =
            serde_json::from_value(json!({ "status": "Completed", "category": null })).unwrap();
        task.apply(update);

        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.description.as_deref(), Some("keep me"));
        assert_eq!(task.category, None);
        assert_eq!(task.priority, TaskPriority::Low);
        assert!(task.updated_at >= before);
    }

    #[test]
    fn test_update_rejects_empty_title() {
        let update: TaskUpdate = serde_json::from_value(json!({ "title": "" })).unwrap();
        assert!(update.validate().is_err());

        let update: TaskUpdate = serde_json::from_value(json!({ "title": "   " })).unwrap();
        assert!(update.validate().is_err());

        let update: TaskUpdate = serde_json::from_value(json!({})).unwrap();
        assert!(update.validate().is_ok());
        assert!(update.title.is_none() && update.due_date.is_none());
    }

    #[test]
    fn test_update_enforces_length_limits() {
        let update: TaskUpdate =
            serde_json::from_value(json!({ "category": "c".repeat(51) })).unwrap();
        assert!(update.validate().is_err());

        let update: TaskUpdate =
            serde_json::from_value(json!({ "description": "d".repeat(1001) })).unwrap();
        assert!(update.validate().is_err());

        let update: TaskUpdate = serde_json::from_value(
            json!({ "category": "c".repeat(50), "description": null }),
        )
        .unwrap();
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_empty_query_values_are_ignored() {
        let query: TaskQuery =
            serde_json::from_value(json!({ "status": "", "priority": "", "category": "", "search": "" }))
                .unwrap();
        assert!(query.status.is_none() && query.priority.is_none());
        assert!(query.category.is_none() && query.search.is_none());

        let query: TaskQuery =
            serde_json::from_value(json!({ "status": "In Progress", "category": "Work" })).unwrap();
        assert_eq!(query.status, Some(TaskStatus::InProgress));
        assert_eq!(query.category.as_deref(), Some("Work"));

        assert!(serde_json::from_value::<TaskQuery>(json!({ "priority": "Urgent" })).is_err());
    }

    #[test]
    fn test_query_matching() {
        let mut task = task_with(TaskStatus::InProgress, TaskPriority::High, None);
        task.title = "Buy Milk".to_string();
        task.category = Some("Errands".to_string());

        assert!(TaskQuery::default().matches(&task));
        assert!(TaskQuery {
            search: Some("milk".to_string()),
            ..Default::default()
        }
        .matches(&task));
        assert!(!TaskQuery {
            priority: Some(TaskPriority::Low),
            ..Default::default()
        }
        .matches(&task));
        assert!(!TaskQuery {
            category: Some("Work".to_string()),
            ..Default::default()
        }
        .matches(&task));
        assert!(TaskQuery {
            status: Some(TaskStatus::InProgress),
            category: Some("Errands".to_string()),
            ..Default::default()
        }
        .matches(&task));
    }

    #[test]
    fn test_stats_counts_and_overdue() {
        let now = Utc::now();
        let past = Some(now - Duration::days(1));
        let future = Some(now + Duration::days(1));

        let tasks = vec![
            task_with(TaskStatus::Pending, TaskPriority::High, past),
            task_with(TaskStatus::Completed, TaskPriority::High, past),
            task_with(TaskStatus::InProgress, TaskPriority::Low, future),
            task_with(TaskStatus::InProgress, TaskPriority::Medium, past),
            task_with(TaskStatus::Pending, TaskPriority::Medium, None),
        ];

        let stats = TaskStats::collect(&tasks, now);
        assert_eq!(
            stats,
            TaskStats {
                total: 5,
                completed: 1,
                pending: 2,
                in_progress: 2,
                high_priority: 2,
                overdue: 2,
            }
        );
        assert_eq!(stats, TaskStats::collect(&tasks, now));
    }

    #[test]
    fn test_overdue_depends_on_status() {
        let now = Utc::now();
        let mut task = task_with(
            TaskStatus::Pending,
            TaskPriority::Medium,
            Some(now - Duration::hours(1)),
        );
        assert!(task.is_overdue(now));

        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue(now));
    }
}
