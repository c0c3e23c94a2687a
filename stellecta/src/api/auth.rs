//! Login, logout and the current-user lookup.

use std::sync::Arc;

use tracing::info;

use super::client::{ApiClient, ApiError};
use super::tokens::Tokens;
use super::wire::{LoginRequest, LoginResponse, User};

#[derive(Debug, Clone)]
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token pair and persist it.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let response: LoginResponse = self
            .client
            .post_anonymous("/auth/login", &LoginRequest { email, password })
            .await?;
        self.client.tokens().save(&Tokens {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        })?;
        info!(email = %response.user.email, "logged in");
        Ok(response.user)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.client.tokens().clear()?;
        Ok(())
    }

    pub fn is_logged_in(&self) -> Result<bool, ApiError> {
        Ok(self.client.tokens().load()?.is_some())
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.client.get("/auth/me", &[]).await
    }
}
