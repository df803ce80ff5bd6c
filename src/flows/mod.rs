//! Flow controllers
//!
//! Small state machines layered on the session store and transport: the
//! login/signup flow (password vs. phone+OTP with resend throttling) and the
//! purchase flow (wallet vs. external gateway with server-side verification).

pub mod login;
pub mod purchase;

pub use login::{AuthMode, FlowKind, LoginFlow, Submission, OTP_COOLDOWN_TICKS};
pub use purchase::{
    FailureReason, PaymentMethod, PurchaseFlow, PurchaseState, GATEWAY_DEFAULT_QUANTITY,
    WALLET_DEFAULT_QUANTITY,
};
