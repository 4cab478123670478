use crate::api::ApiClient;
use crate::domain::sentiment::{AuthPayload, User};
use crate::utils::error::{ClientError, Result};
use reqwest::Method;
use serde_json::json;

pub const MIN_PASSWORD_LENGTH: usize = 6;

impl ApiClient {
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let payload: AuthPayload = self
            .post_data("/auth/login", json!({ "email": email, "password": password }))
            .await?;
        Ok(payload.into_user())
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let payload: AuthPayload = self
            .post_data(
                "/auth/register",
                json!({ "name": name, "email": email, "password": password }),
            )
            .await?;
        Ok(payload.into_user())
    }

    /// `GET /auth/me` with this client's token.
    pub async fn me(&self) -> Result<()> {
        if self.token().is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        self.call(Method::GET, "/auth/me", &[], None).await?;
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.call(Method::POST, "/auth/logout", &[], None).await?;
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        self.call(
            Method::POST,
            "/auth/forgot-password",
            &[],
            Some(json!({ "email": email })),
        )
        .await?;
        Ok(())
    }

    /// Resets the password. Some backends sign the user straight in; that
    /// user is returned when present.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<Option<User>> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ClientError::ValidationError {
                message: format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
            });
        }

        let envelope = self
            .call(
                Method::POST,
                "/auth/reset-password",
                &[],
                Some(json!({ "token": token, "password": password })),
            )
            .await?;

        let payload = envelope
            .get("data")
            .cloned()
            .and_then(|data| serde_json::from_value::<AuthPayload>(data).ok());
        Ok(payload.map(AuthPayload::into_user))
    }

    /// Browser entry point for Google sign-in.
    pub fn google_sign_in_url(&self) -> String {
        self.url("/auth/google")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_login_returns_user_with_token() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .json_body(json!({"email": "ana@example.com", "password": "secret1"}));
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "user": {"id": "u1", "name": "Ana", "email": "ana@example.com"},
                    "token": "jwt-abc"
                }
            }));
        });

        let client = ApiClient::new(server.base_url());
        let user = client.login("ana@example.com", "secret1").await.unwrap();

        api_mock.assert();
        assert_eq!(user.token.as_deref(), Some("jwt-abc"));
    }

    #[tokio::test]
    async fn test_login_failure_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(401).json_body(json!({"success": false, "message": "Invalid credentials"}));
        });

        let client = ApiClient::new(server.base_url());
        let err = client.login("ana@example.com", "nope").await.unwrap_err();
        assert_eq!(err.user_friendly_message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_short_password_is_rejected_locally() {
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client.reset_password("t", "abc").await.unwrap_err();
        assert!(matches!(err, ClientError::ValidationError { .. }));
    }

    #[test]
    fn test_google_url() {
        let client = ApiClient::new("http://localhost:5000/api");
        assert_eq!(client.google_sign_in_url(), "http://localhost:5000/api/auth/google");
    }
}
