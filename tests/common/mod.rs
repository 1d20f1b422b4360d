#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use cosmodeck::app::{cors, AppState};
use cosmodeck::auth::{AuthMiddleware, AuthResponse, TokenKeys};
use cosmodeck::routes::{self, health};
use cosmodeck::store::InMemoryStore;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Lowest cost bcrypt accepts; keeps registration fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(InMemoryStore::new()),
        TokenKeys::new(TEST_SECRET),
        TEST_BCRYPT_COST,
    )
}

/// The full application as `main.rs` builds it, backed by a fresh in-memory store.
pub async fn spawn_app() -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    let state = test_state();
    test::init_service(
        App::new()
            .configure(|cfg| state.configure(cfg))
            .wrap(cors(None))
            .wrap(Logger::default())
            .service(health::health)
            .service(health::index)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            ),
    )
    .await
}

pub async fn register_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
) -> AuthResponse {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": "Password123!"
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::CREATED,
        "registration of {} failed",
        email
    );
    test::read_body_json(resp).await
}

pub async fn create_task(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
    payload: Value,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::CREATED,
        "creating {} failed",
        payload
    );
    test::read_body_json(resp).await
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}
