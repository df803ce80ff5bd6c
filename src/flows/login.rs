//! Login/signup flow controller
//!
//! Coordinates two mutually exclusive authentication modes: email+password
//! and phone+OTP. Switching modes resets the other mode's input so stale
//! partial state never leaks across. OTP sends are throttled by a tick-based
//! cooldown driven by the embedding UI's one-second timer.

use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::session::SessionStore;
use crate::validation;

/// Ticks of the one-second cooldown timer between OTP sends
pub const OTP_COOLDOWN_TICKS: u32 = 60;

/// Authentication mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Password,
    Otp,
}

/// Whether this controller drives the login or the signup page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Login,
    Signup,
}

/// Submission progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Idle,
    Submitting,
    Error,
    Success,
}

/// State machine for the login and signup pages
pub struct LoginFlow {
    session: Arc<SessionStore>,
    kind: FlowKind,
    mode: AuthMode,
    name: String,
    email: String,
    password: String,
    confirm_password: String,
    phone_number: String,
    otp: String,
    otp_requested: bool,
    otp_sending: bool,
    cooldown_remaining: u32,
    remember_me: bool,
    submission: Submission,
    error: Option<String>,
}

impl LoginFlow {
    pub fn new(session: Arc<SessionStore>, kind: FlowKind) -> Self {
        Self {
            session,
            kind,
            mode: AuthMode::Password,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            phone_number: String::new(),
            otp: String::new(),
            otp_requested: false,
            otp_sending: false,
            cooldown_remaining: 0,
            remember_me: false,
            submission: Submission::Idle,
            error: None,
        }
    }

    /// Prefill the email field from the remembered-email convenience value.
    pub fn prefill_remembered_email(&mut self) {
        if let Some(email) = self.session.remembered_email() {
            self.email = email;
            self.remember_me = true;
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn submission(&self) -> Submission {
        self.submission
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn otp_requested(&self) -> bool {
        self.otp_requested
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown_remaining
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn otp(&self) -> &str {
        &self.otp
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_email(&mut self, email: &str) {
        self.email = email.to_string();
    }

    pub fn set_password(&mut self, password: &str) {
        self.password = password.to_string();
    }

    pub fn set_confirm_password(&mut self, password: &str) {
        self.confirm_password = password.to_string();
    }

    pub fn set_phone_number(&mut self, phone: &str) {
        self.phone_number = phone.to_string();
    }

    /// Live OTP input: digits only, truncated to six characters.
    pub fn set_otp(&mut self, raw: &str) {
        self.otp = validation::sanitize_otp_input(raw);
    }

    pub fn set_remember_me(&mut self, remember: bool) {
        self.remember_me = remember;
    }

    /// Switch between password and OTP mode.
    ///
    /// Resets every field belonging to the other mode, the OTP request
    /// state, the cooldown and any error, so nothing carries over.
    pub fn set_mode(&mut self, mode: AuthMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.password.clear();
        self.confirm_password.clear();
        self.phone_number.clear();
        self.otp.clear();
        self.otp_requested = false;
        self.otp_sending = false;
        self.cooldown_remaining = 0;
        self.submission = Submission::Idle;
        self.error = None;
    }

    /// Whether the send/resend-OTP action is currently available.
    pub fn can_send_otp(&self) -> bool {
        !self.phone_number.is_empty() && !self.otp_sending && self.cooldown_remaining == 0
    }

    /// Advance the one-second cooldown timer by one tick.
    pub fn tick(&mut self) {
        if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
        }
    }

    /// Request an OTP for the entered phone number.
    ///
    /// On success the resend cooldown starts. A failed resend leaves a prior
    /// `otp_requested` intact: a previously issued code stays submittable.
    pub async fn send_otp(&mut self) -> ApiResult<()> {
        if !self.can_send_otp() {
            return Err(ApiError::Validation(
                "OTP cannot be requested right now".to_string(),
            ));
        }

        let normalized = validation::normalize_phone(&self.phone_number);
        if !validation::is_valid_phone(&normalized) {
            let err = ApiError::Validation(
                "Please enter a valid phone number (e.g. +919305366856)".to_string(),
            );
            self.error = Some(err.to_string());
            return Err(err);
        }

        self.otp_sending = true;
        self.error = None;

        let result = match self.kind {
            FlowKind::Login => self.session.request_otp(&self.phone_number).await,
            FlowKind::Signup => self.session.request_signup_otp(&self.phone_number).await,
        };
        self.otp_sending = false;

        match result {
            Ok(()) => {
                self.otp_requested = true;
                self.cooldown_remaining = OTP_COOLDOWN_TICKS;
                tracing::debug!("OTP requested, cooldown started");
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Whether the main submit action is currently available.
    pub fn can_submit(&self) -> bool {
        if self.submission == Submission::Submitting {
            return false;
        }
        match self.mode {
            AuthMode::Password => {
                let base = !self.email.trim().is_empty() && !self.password.is_empty();
                match self.kind {
                    FlowKind::Login => base,
                    FlowKind::Signup => {
                        base && !self.name.trim().is_empty()
                            && self.password == self.confirm_password
                    }
                }
            }
            AuthMode::Otp => {
                self.otp_requested
                    && !self.phone_number.is_empty()
                    && validation::is_valid_otp(&self.otp)
            }
        }
    }

    /// Submit the current mode's credentials.
    ///
    /// Validates locally first; a validation failure never reaches the
    /// network. On a server or network failure the entered fields are kept
    /// intact so the user can correct and resubmit.
    pub async fn submit(&mut self) -> ApiResult<()> {
        if let Err(e) = self.validate_for_submit() {
            self.error = Some(e.to_string());
            self.submission = Submission::Error;
            return Err(e);
        }

        self.error = None;
        self.submission = Submission::Submitting;

        if self.kind == FlowKind::Login && self.mode == AuthMode::Password {
            let remembered = if self.remember_me {
                self.session.remember_email(&self.email)
            } else {
                self.session.forget_email()
            };
            if let Err(e) = remembered {
                tracing::warn!(error = %e, "Could not update remembered email");
            }
        }

        let result = match (self.kind, self.mode) {
            (FlowKind::Login, AuthMode::Password) => {
                self.session.login(&self.email, &self.password).await
            }
            (FlowKind::Signup, AuthMode::Password) => {
                self.session
                    .signup(&self.name, &self.email, &self.password)
                    .await
            }
            (FlowKind::Login, AuthMode::Otp) => {
                self.session.verify_otp(&self.phone_number, &self.otp).await
            }
            (FlowKind::Signup, AuthMode::Otp) => {
                self.session
                    .verify_signup_otp(&self.phone_number, &self.otp)
                    .await
            }
        };

        match result {
            Ok(()) => {
                self.submission = Submission::Success;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.submission = Submission::Error;
                Err(e)
            }
        }
    }

    fn validate_for_submit(&self) -> ApiResult<()> {
        match self.mode {
            AuthMode::Password => {
                if self.email.trim().is_empty() || self.password.is_empty() {
                    return Err(ApiError::Validation(
                        "Please fill in both email and password".to_string(),
                    ));
                }
                if self.kind == FlowKind::Signup {
                    if self.name.trim().is_empty() {
                        return Err(ApiError::Validation(
                            "Please enter your name".to_string(),
                        ));
                    }
                    if self.password != self.confirm_password {
                        return Err(ApiError::Validation(
                            "Passwords do not match".to_string(),
                        ));
                    }
                }
            }
            AuthMode::Otp => {
                if self.phone_number.is_empty() || self.otp.is_empty() {
                    return Err(ApiError::Validation(
                        "Please provide phone number and OTP".to_string(),
                    ));
                }
                if !self.otp_requested {
                    return Err(ApiError::Validation(
                        "Please request an OTP first".to_string(),
                    ));
                }
                if !validation::is_valid_otp(&self.otp) {
                    return Err(ApiError::Validation("OTP must be 6 digits".to_string()));
                }
                let normalized = validation::normalize_phone(&self.phone_number);
                if !validation::is_valid_phone(&normalized) {
                    return Err(ApiError::Validation(
                        "Please enter a valid phone number (e.g. +919305366856)".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
