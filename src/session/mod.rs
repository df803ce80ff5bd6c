//! Session store
//!
//! Owns the authenticated-user value and the persisted bearer credential.
//! Every credential-issuing operation (password login, signup, OTP verify,
//! Google exchange) funnels through the same adoption path: persist the
//! token, publish the user, then refresh the full profile.
//!
//! The store is constructed with an injected transport and credential store
//! so it can be built fresh per test; there is no ambient singleton.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::watch;

use crate::api::ApiTransport;
use crate::error::{ApiError, ApiResult};
use crate::models::{AuthResponse, User};
use crate::storage::CredentialStore;
use crate::validation;

/// Client-side session state and authentication operations
pub struct SessionStore {
    transport: Arc<dyn ApiTransport>,
    store: Arc<dyn CredentialStore>,
    user_tx: watch::Sender<Option<User>>,
}

impl SessionStore {
    pub fn new(transport: Arc<dyn ApiTransport>, store: Arc<dyn CredentialStore>) -> Self {
        let (user_tx, _) = watch::channel(None);
        Self {
            transport,
            store,
            user_tx,
        }
    }

    /// Restore a persisted session, if any.
    ///
    /// Called once at startup: when a credential survives from a previous
    /// run, a profile refresh validates it. A rejected credential clears the
    /// session silently rather than surfacing an error.
    pub async fn init(&self) -> ApiResult<()> {
        if self.store.token().is_some() {
            self.refresh_profile().await?;
        }
        Ok(())
    }

    /// The current authenticated user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.user_tx.borrow().clone()
    }

    /// The persisted bearer credential, if any.
    pub fn credential(&self) -> Option<String> {
        self.store.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.token().is_some()
    }

    /// Watch the authenticated-user value for changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user_tx.subscribe()
    }

    /// Authenticate with email and password.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<()> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Please fill in both email and password".to_string(),
            ));
        }

        let value = self
            .transport
            .post("auth/login", json!({ "email": email, "password": password }))
            .await?;
        self.adopt_auth_response(value).await
    }

    /// Register a new account with email and password.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> ApiResult<()> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Please provide name, email and password".to_string(),
            ));
        }

        let value = self
            .transport
            .post(
                "auth/register",
                json!({ "name": name, "email": email, "password": password }),
            )
            .await?;
        self.adopt_auth_response(value).await
    }

    /// Request a login OTP for the given phone number.
    ///
    /// The number is validated locally first; a malformed number never costs
    /// a network round trip. Session state does not change.
    pub async fn request_otp(&self, phone_number: &str) -> ApiResult<()> {
        let phone = Self::validated_phone(phone_number)?;
        self.transport
            .post("auth/request-otp", json!({ "phoneNumber": phone }))
            .await?;
        Ok(())
    }

    /// Request a signup OTP for the given phone number.
    pub async fn request_signup_otp(&self, phone_number: &str) -> ApiResult<()> {
        let phone = Self::validated_phone(phone_number)?;
        self.transport
            .post("auth/request-signup-otp", json!({ "phoneNumber": phone }))
            .await?;
        Ok(())
    }

    /// Verify a login OTP and adopt the issued credential.
    pub async fn verify_otp(&self, phone_number: &str, code: &str) -> ApiResult<()> {
        let phone = Self::validated_phone(phone_number)?;
        Self::validated_otp(code)?;

        let value = self
            .transport
            .post("auth/verify-otp", json!({ "phoneNumber": phone, "otp": code }))
            .await?;
        self.adopt_auth_response(value).await
    }

    /// Verify a signup OTP and adopt the issued credential.
    pub async fn verify_signup_otp(&self, phone_number: &str, code: &str) -> ApiResult<()> {
        let phone = Self::validated_phone(phone_number)?;
        Self::validated_otp(code)?;

        let value = self
            .transport
            .post(
                "auth/verify-signup-otp",
                json!({ "phoneNumber": phone, "otp": code }),
            )
            .await?;
        self.adopt_auth_response(value).await
    }

    /// Trigger a password-reset email. No session state change.
    pub async fn forgot_password(&self, email: &str) -> ApiResult<()> {
        if email.trim().is_empty() {
            return Err(ApiError::Validation("Please enter your email".to_string()));
        }
        self.transport
            .post("auth/forgot-password", json!({ "email": email }))
            .await?;
        Ok(())
    }

    /// Complete a password reset with the emailed token.
    ///
    /// Does not require (or create) a session.
    pub async fn reset_password(&self, reset_token: &str, new_password: &str) -> ApiResult<()> {
        if reset_token.is_empty() || new_password.is_empty() {
            return Err(ApiError::Validation(
                "Reset token and new password are required".to_string(),
            ));
        }
        self.transport
            .post(
                "auth/reset-password",
                json!({ "token": reset_token, "newPassword": new_password }),
            )
            .await?;
        Ok(())
    }

    /// Check a reset token before showing the reset form.
    pub async fn verify_reset_token(&self, reset_token: &str) -> ApiResult<()> {
        if reset_token.is_empty() {
            return Err(ApiError::Validation("Reset token is required".to_string()));
        }
        self.transport
            .post("auth/verify-reset-token", json!({ "token": reset_token }))
            .await?;
        Ok(())
    }

    /// Exchange a Google identity credential for a session.
    pub async fn google_login(&self, id_token: &str) -> ApiResult<()> {
        self.google_exchange("auth/google-login", id_token).await
    }

    /// Exchange a Google identity credential for a new account and session.
    pub async fn google_signup(&self, id_token: &str) -> ApiResult<()> {
        self.google_exchange("auth/google-signup", id_token).await
    }

    /// End the session. Synchronous; no network call.
    pub fn logout(&self) -> ApiResult<()> {
        self.store
            .clear_token()
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        self.user_tx.send_replace(None);
        tracing::info!("Session cleared");
        Ok(())
    }

    /// Fetch the profile for the current credential.
    ///
    /// An auth rejection means the credential is stale: the session is
    /// cleared as a side effect and no error is surfaced. Overlapping
    /// refreshes resolve last-write-wins; session state is advisory and the
    /// purchase flow re-fetches the balance at decision time.
    pub async fn refresh_profile(&self) -> ApiResult<()> {
        match self.transport.get("auth/profile").await {
            Ok(value) => {
                let user: User = serde_json::from_value(value)?;
                self.user_tx.send_replace(Some(user));
                Ok(())
            }
            Err(e) if e.is_auth() => {
                tracing::info!("Stored credential rejected, clearing session");
                self.logout()
            }
            Err(e) => Err(e),
        }
    }

    /// Persist the login email for prefill on the next visit.
    pub fn remember_email(&self, email: &str) -> ApiResult<()> {
        self.store
            .set_remembered_email(email)
            .map_err(|e| ApiError::Storage(e.to_string()))
    }

    pub fn remembered_email(&self) -> Option<String> {
        self.store.remembered_email()
    }

    pub fn forget_email(&self) -> ApiResult<()> {
        self.store
            .clear_remembered_email()
            .map_err(|e| ApiError::Storage(e.to_string()))
    }

    async fn google_exchange(&self, path: &str, id_token: &str) -> ApiResult<()> {
        if id_token.is_empty() {
            return Err(ApiError::Validation(
                "Missing Google credential".to_string(),
            ));
        }
        let value = self
            .transport
            .post(path, json!({ "credential": id_token }))
            .await?;
        self.adopt_auth_response(value).await
    }

    /// Persist the token and publish the user, then refresh the full profile.
    async fn adopt_auth_response(&self, value: serde_json::Value) -> ApiResult<()> {
        let auth: AuthResponse = serde_json::from_value(value)?;

        self.store
            .set_token(&auth.token)
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        tracing::info!(user_id = %auth.user.id, "Credential adopted");
        self.user_tx.send_replace(Some(auth.user));

        self.refresh_profile().await
    }

    fn validated_phone(raw: &str) -> ApiResult<String> {
        let phone = validation::normalize_phone(raw);
        if !validation::is_valid_phone(&phone) {
            return Err(ApiError::Validation(
                "Please enter a valid phone number (e.g. +919305366856)".to_string(),
            ));
        }
        Ok(phone)
    }

    fn validated_otp(code: &str) -> ApiResult<()> {
        if !validation::is_valid_otp(code) {
            return Err(ApiError::Validation("OTP must be 6 digits".to_string()));
        }
        Ok(())
    }
}
