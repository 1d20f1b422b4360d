use crate::{
    auth::{AuthenticatedUserId, LoginRequest, RegisterRequest},
    error::AppError,
    services::AuthService,
};
use actix_web::{get, post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates a new account and returns it with an authentication token.
///
/// ## Responses:
/// - `201 Created`: `{id, name, email, token}`.
/// - `400 Bad Request`: missing or invalid fields, or the email is already registered.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let response = auth.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Login user
///
/// ## Responses:
/// - `200 OK`: `{id, name, email, token}`.
/// - `400 Bad Request`: missing fields or invalid credentials.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let response = auth.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Current user
///
/// Returns the authenticated user's account without the password hash.
#[get("/me")]
pub async fn me(
    auth: web::Data<AuthService>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user = auth.profile(user_id.0).await?;
    Ok(HttpResponse::Ok().json(user))
}
