//! AuthorHub Client Core
//!
//! Client-side session, authentication and request-orchestration layer for the
//! AuthorHub author portal. All business decisions (payment settlement, KYC
//! approval, royalty computation) live in the backend API; this crate owns the
//! credential lifecycle, the login/signup state machine, and the purchase flow
//! that drives the external payment gateway.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod flows;
pub mod models;
pub mod session;
pub mod storage;
pub mod validation;

pub use error::{ApiError, ApiResult};
