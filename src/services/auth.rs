use std::sync::Arc;

use validator::Validate;

use crate::auth::{
    hash_password, verify_password, AuthResponse, LoginRequest, RegisterRequest, TokenKeys,
};
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::store::UserStore;

/// Registration, login and token-based identification.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: TokenKeys,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: TokenKeys, bcrypt_cost: u32) -> Self {
        Self {
            users,
            keys,
            bcrypt_cost,
        }
    }

    /// Creates an account and returns it together with a fresh token.
    ///
    /// # Errors
    /// * `ValidationError` - a field is missing or malformed
    /// * `Conflict` - the email is already registered
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        if self.users.find_user_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".into()));
        }

        let password_hash = hash_password(&request.password, self.bcrypt_cost)?;
        let user = self
            .users
            .create_user(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
            })
            .await?;

        log::info!("Registered user {}", user.id);
        self.respond(user)
    }

    /// Checks credentials and returns the account with a fresh token.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        let user = match self.users.find_user_by_email(&request.email).await? {
            Some(user) if verify_password(&request.password, &user.password_hash)? => user,
            _ => {
                log::warn!("Failed login attempt for {}", request.email);
                return Err(AppError::InvalidCredentials);
            }
        };

        self.respond(user)
    }

    /// Resolves a bearer token to the id of the user it was issued for.
    pub fn identify(&self, token: Option<&str>) -> Result<i32, AppError> {
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".into()))?;
        self.keys.verify(token).map(|claims| claims.sub)
    }

    /// The stored account for an authenticated user, without its password hash.
    pub async fn profile(&self, user_id: i32) -> Result<User, AppError> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".into()))
    }

    fn respond(&self, user: User) -> Result<AuthResponse, AppError> {
        let token = self.keys.issue(user.id)?;
        Ok(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            token,
        })
    }
}
