//! Account endpoints under `/users`.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use teamall_core::{Email, Envelope, UserProfile};
use tracing::instrument;

use crate::error::Result;
use crate::gateway::{ApiRequest, RequestGateway};
use crate::session::UserInfoSource;

/// Email and password for `POST /users/login`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: Email, password: impl Into<String>) -> Self {
        Self {
            email,
            password: SecretString::from(password.into()),
        }
    }
}

/// New account for `POST /users/register`.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: Email,
    pub password: SecretString,
    pub phone: Option<String>,
}

/// Old and new password for `PUT /users/password`.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub old_password: SecretString,
    pub new_password: SecretString,
}

/// `data` of a successful login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default, alias = "userInfo")]
    pub user: Option<UserProfile>,
}

#[derive(Clone)]
pub struct UsersApi {
    gateway: RequestGateway,
}

impl UsersApi {
    #[must_use]
    pub const fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// # Errors
    ///
    /// Any gateway failure.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<Envelope> {
        let mut body = json!({
            "username": registration.username,
            "email": registration.email,
            "password": registration.password.expose_secret(),
        });
        if let (Some(phone), Some(map)) = (&registration.phone, body.as_object_mut()) {
            map.insert("phone".to_string(), Value::String(phone.clone()));
        }
        self.gateway
            .send(ApiRequest::post("/users/register").json(&body))
            .await
    }

    /// Sign in. The gateway stores the returned token on the way through.
    ///
    /// # Errors
    ///
    /// Any gateway failure, or `Decode` if `data` is not a login payload.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });
        let envelope = self
            .gateway
            .send_as::<LoginResponse>(ApiRequest::post("/users/login").json(&body))
            .await?;
        Ok(envelope.into_data()?)
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn get_user_info(&self) -> Result<Envelope<UserProfile>> {
        self.gateway.send_as(ApiRequest::get("/users/info")).await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn update_user_info(&self, profile: &UserProfile) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::put("/users/info").json(profile))
            .await
    }

    /// The backend takes both passwords as query parameters.
    ///
    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn update_password(&self, change: &PasswordChange) -> Result<Envelope> {
        let request = ApiRequest::put("/users/password")
            .query("oldPassword", change.old_password.expose_secret())
            .query("newPassword", change.new_password.expose_secret());
        self.gateway.send(request).await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn logout(&self) -> Result<Envelope> {
        self.gateway.send(ApiRequest::post("/users/logout")).await
    }
}

impl UserInfoSource for UsersApi {
    async fn fetch_user_info(&self) -> Result<Envelope<UserProfile>> {
        self.get_user_info().await
    }
}
