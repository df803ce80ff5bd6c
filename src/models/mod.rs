//! Wire models for the AuthorHub backend API
//!
//! All DTOs use camelCase renames to match the backend's JSON. Response
//! shapes the backend leaves ambiguous (bare array vs. wrapper object) are
//! normalized once, at this boundary, into the types here.

mod catalog;
mod order;
mod user;

pub use catalog::{Book, DashboardMetrics, Page, Purchase};
pub use order::{
    CreateOrderRequest, GatewayCheckout, GatewayProof, OrderOutcome, VerifyPaymentRequest,
    VerifyPaymentResponse,
};
pub use user::{AuthResponse, AuthorProfile, BankAccount, KycStatus, User};
