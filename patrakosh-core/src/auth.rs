use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    username_or_email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignupRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    confirm_password: &'a str,
}

impl ApiClient {
    pub async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<AuthSession, ApiError> {
        let url = self.endpoint("/api/auth/login")?;
        let response = self
            .request(Method::POST, url)
            .json(&LoginRequest {
                username_or_email,
                password,
            })
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Field-level validation failures come back as `ApiError::Validation`.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<AuthSession, ApiError> {
        let url = self.endpoint("/api/auth/signup")?;
        let response = self
            .request(Method::POST, url)
            .json(&SignupRequest {
                username,
                email,
                password,
                confirm_password,
            })
            .send()
            .await?;
        Self::handle_response(response).await
    }
}
