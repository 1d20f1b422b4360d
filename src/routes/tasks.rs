use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{TaskInput, TaskQuery, TaskUpdate},
    services::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

/// Retrieves the authenticated user's tasks, newest first.
///
/// ## Query Parameters:
/// - `status` (optional): `Pending`, `In Progress` or `Completed`.
/// - `priority` (optional): `Low`, `Medium` or `High`.
/// - `category` (optional): exact category match.
/// - `search` (optional): case-insensitive substring of the title.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks.
/// - `400 Bad Request`: unknown status or priority value.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<TaskService>,
    query_params: web::Query<TaskQuery>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let tasks = tasks.list(user_id.0, &query_params).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Aggregate counts over the authenticated user's tasks.
///
/// ## Responses:
/// - `200 OK`: `{total, completed, pending, inProgress, highPriority, overdue}`.
#[get("/stats")]
pub async fn get_task_stats(
    tasks: web::Data<TaskService>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let stats = tasks.stats(user_id.0).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Creates a task owned by the authenticated user.
///
/// Only `title` is required. `priority` defaults to `Medium` and `status`
/// to `Pending`.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: missing title or invalid field.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<TaskInput>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let task = tasks.create(user_id.0, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one task.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `401 Unauthorized`: the task belongs to another user.
/// - `404 Not Found`: no task with this id.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let task = tasks.get(user_id.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Applies a partial update to a task.
///
/// Fields left out of the body keep their value; `null` clears
/// `description`, `category` or `dueDate`.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `400 Bad Request`: invalid field.
/// - `401 Unauthorized`: the task belongs to another user.
/// - `404 Not Found`: no task with this id.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update(user_id.0, task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task.
///
/// ## Responses:
/// - `200 OK`: `{id}` of the deleted task.
/// - `401 Unauthorized`: the task belongs to another user.
/// - `404 Not Found`: no task with this id.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let id = tasks.delete(user_id.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "id": id })))
}
