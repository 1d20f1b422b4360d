pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

/// Registers the `/auth` and `/tasks` scopes. Mounted under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register)
            .service(auth::me),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            // Must precede `/{id}`.
            .service(tasks::get_task_stats)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
