//! Purchase/order flow controller
//!
//! Drives an author's copy order from book selection through settlement.
//! Wallet orders settle server-side in one call; gateway orders open an
//! external payment widget whose result is only final after the backend
//! verifies the gateway's proof. Widget-reported success is never trusted
//! directly.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::api::ApiTransport;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Book, CreateOrderRequest, DashboardMetrics, GatewayCheckout, GatewayProof, OrderOutcome,
    VerifyPaymentRequest, VerifyPaymentResponse,
};
use crate::session::SessionStore;

/// Default copy count when paying from the wallet
pub const WALLET_DEFAULT_QUANTITY: u32 = 2;

/// Default copy count when paying through the gateway
pub const GATEWAY_DEFAULT_QUANTITY: u32 = 3;

/// How an order is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "wallet")]
    Wallet,
    #[serde(rename = "razorpay")]
    Gateway,
}

impl PaymentMethod {
    fn default_quantity(self) -> u32 {
        match self {
            PaymentMethod::Wallet => WALLET_DEFAULT_QUANTITY,
            PaymentMethod::Gateway => GATEWAY_DEFAULT_QUANTITY,
        }
    }
}

/// Why a gateway order did not complete
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// The user dismissed the widget before paying. Not a fault.
    Cancelled,
    /// The backend refused to confirm the gateway's proof. Funds may have
    /// moved; the user should contact support rather than retry.
    VerificationFailed(String),
}

/// Purchase flow state machine
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseState {
    Closed,
    /// A book is selected and the draft is being reviewed.
    Reviewing,
    /// The order-creation request is in flight.
    Submitting,
    /// Wallet order settled by the backend.
    WalletSuccess,
    /// The backend minted a gateway order; the widget should open.
    GatewayPending(GatewayCheckout),
    /// The verification request is in flight.
    GatewayVerifying,
    GatewaySuccess,
    GatewayFailure(FailureReason),
}

struct Inner {
    state: PurchaseState,
    book: Option<Book>,
    quantity: u32,
    payment_method: PaymentMethod,
    wallet_balance: f64,
    metrics: Option<DashboardMetrics>,
    last_error: Option<ApiError>,
    /// Bumped on open/close; responses carrying a stale generation are
    /// discarded instead of mutating a draft the user already closed.
    generation: u64,
}

/// Controller for the book purchase modal
pub struct PurchaseFlow {
    transport: Arc<dyn ApiTransport>,
    session: Arc<SessionStore>,
    inner: Mutex<Inner>,
}

impl PurchaseFlow {
    pub fn new(transport: Arc<dyn ApiTransport>, session: Arc<SessionStore>) -> Self {
        Self {
            transport,
            session,
            inner: Mutex::new(Inner {
                state: PurchaseState::Closed,
                book: None,
                quantity: WALLET_DEFAULT_QUANTITY,
                payment_method: PaymentMethod::Wallet,
                wallet_balance: 0.0,
                metrics: None,
                last_error: None,
                generation: 0,
            }),
        }
    }

    pub fn state(&self) -> PurchaseState {
        self.inner.lock().unwrap().state.clone()
    }

    pub fn selected_book(&self) -> Option<Book> {
        self.inner.lock().unwrap().book.clone()
    }

    pub fn quantity(&self) -> u32 {
        self.inner.lock().unwrap().quantity
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.inner.lock().unwrap().payment_method
    }

    pub fn wallet_balance(&self) -> f64 {
        self.inner.lock().unwrap().wallet_balance
    }

    pub fn metrics(&self) -> Option<DashboardMetrics> {
        self.inner.lock().unwrap().metrics.clone()
    }

    /// The last order-creation error, with any server detail list intact.
    pub fn last_error(&self) -> Option<ApiError> {
        self.inner.lock().unwrap().last_error.clone()
    }

    /// Derived order total; never stored independently.
    pub fn total_amount(&self) -> f64 {
        let inner = self.inner.lock().unwrap();
        Self::total_of(&inner)
    }

    pub fn has_sufficient_balance(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.payment_method != PaymentMethod::Wallet
            || Self::total_of(&inner) <= inner.wallet_balance
    }

    /// Whether the order can be submitted right now.
    ///
    /// Wallet orders exceeding the balance are blocked outright; no network
    /// call is attempted.
    pub fn can_submit(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.state == PurchaseState::Reviewing
            && inner.book.is_some()
            && (inner.payment_method != PaymentMethod::Wallet
                || Self::total_of(&inner) <= inner.wallet_balance)
    }

    /// Open the flow for a book.
    ///
    /// Applies the payment method's default quantity and fetches the wallet
    /// balance fresh; a balance cached from an earlier screen may already be
    /// stale by royalty accrual.
    pub async fn open(&self, book: Book) -> ApiResult<()> {
        let generation = {
            let mut inner = self.inner.lock().unwrap();
            inner.generation += 1;
            inner.book = Some(book);
            inner.quantity = inner.payment_method.default_quantity();
            inner.state = PurchaseState::Reviewing;
            inner.last_error = None;
            inner.generation
        };

        self.session.refresh_profile().await?;
        let balance = self
            .session
            .current_user()
            .map(|u| u.wallet_balance)
            .unwrap_or(0.0);

        self.if_current(generation, |inner| inner.wallet_balance = balance);
        Ok(())
    }

    /// Change the payment method, resetting quantity to the method default.
    ///
    /// Discarding the typed quantity on a method switch is the intended
    /// behavior, not an oversight.
    pub fn set_payment_method(&self, method: PaymentMethod) {
        let mut inner = self.inner.lock().unwrap();
        inner.payment_method = method;
        inner.quantity = method.default_quantity();
    }

    /// Set the copy count, clamped to a minimum of one.
    pub fn set_quantity(&self, quantity: u32) {
        let mut inner = self.inner.lock().unwrap();
        inner.quantity = quantity.max(1);
    }

    pub fn increment_quantity(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.quantity = inner.quantity.saturating_add(1);
    }

    /// Decrementing below one is a no-op rather than an error.
    pub fn decrement_quantity(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.quantity > 1 {
            inner.quantity -= 1;
        }
    }

    /// Submit the draft to the order endpoint.
    ///
    /// The response discriminates the settlement path: wallet orders are
    /// final immediately, gateway orders move to `GatewayPending` with the
    /// widget configuration. An order-creation failure returns the flow to
    /// `Reviewing` with the draft retained for retry.
    pub async fn submit(&self) -> ApiResult<()> {
        let (generation, request, title) = {
            let mut inner = self.inner.lock().unwrap();
            let book = match (&inner.state, &inner.book) {
                (PurchaseState::Reviewing, Some(book)) => book.clone(),
                _ => {
                    return Err(ApiError::Validation(
                        "No order is ready to submit".to_string(),
                    ))
                }
            };
            if inner.payment_method == PaymentMethod::Wallet
                && Self::total_of(&inner) > inner.wallet_balance
            {
                return Err(ApiError::Validation(
                    "Insufficient wallet balance".to_string(),
                ));
            }
            inner.last_error = None;
            inner.state = PurchaseState::Submitting;
            (
                inner.generation,
                CreateOrderRequest {
                    book_id: book.id.clone(),
                    quantity: inner.quantity,
                    payment_method: inner.payment_method,
                },
                book.title,
            )
        };

        let body = serde_json::to_value(&request)?;
        let result = self
            .transport
            .post("orders", body)
            .await
            .and_then(OrderOutcome::from_value);

        match result {
            Ok(OrderOutcome::Wallet { .. }) => {
                tracing::info!(book_id = %request.book_id, quantity = request.quantity, "Order settled from wallet");
                self.if_current(generation, |inner| {
                    inner.state = PurchaseState::WalletSuccess;
                });
                self.refresh_metrics(generation).await;
                Ok(())
            }
            Ok(OrderOutcome::Gateway {
                key_id,
                order_id,
                amount,
                prefill_name,
                prefill_email,
            }) => {
                let checkout = GatewayCheckout {
                    key_id,
                    order_id,
                    amount,
                    description: format!(
                        "Purchase of {} copies of {}",
                        request.quantity, title
                    ),
                    prefill_name,
                    prefill_email,
                };
                tracing::info!(order_id = %checkout.order_id, "Gateway order minted, opening widget");
                self.if_current(generation, |inner| {
                    inner.state = PurchaseState::GatewayPending(checkout);
                });
                Ok(())
            }
            Err(e) => {
                self.if_current(generation, |inner| {
                    inner.state = PurchaseState::Reviewing;
                    inner.last_error = Some(e.clone());
                });
                Err(e)
            }
        }
    }

    /// Exchange the widget's proof with the backend verification endpoint.
    ///
    /// Only the verification response decides success; a widget that reports
    /// a completed payment the backend refuses to confirm ends in failure.
    pub async fn complete_gateway_payment(&self, proof: GatewayProof) -> ApiResult<()> {
        let (generation, request) = {
            let mut inner = self.inner.lock().unwrap();
            if !matches!(inner.state, PurchaseState::GatewayPending(_)) {
                return Err(ApiError::Validation(
                    "No payment is awaiting verification".to_string(),
                ));
            }
            let book_id = match &inner.book {
                Some(book) => book.id.clone(),
                None => {
                    return Err(ApiError::Validation(
                        "No payment is awaiting verification".to_string(),
                    ))
                }
            };
            let quantity = inner.quantity;
            inner.state = PurchaseState::GatewayVerifying;
            (
                inner.generation,
                VerifyPaymentRequest {
                    gateway_order_id: proof.order_id,
                    gateway_payment_id: proof.payment_id,
                    gateway_signature: proof.signature,
                    book_id,
                    quantity,
                },
            )
        };

        let body = serde_json::to_value(&request)?;
        let result = self
            .transport
            .post("orders/verify-payment", body)
            .await
            .and_then(|v| serde_json::from_value::<VerifyPaymentResponse>(v).map_err(ApiError::from));

        match result {
            Ok(response) if response.success => {
                tracing::info!(order_id = %request.gateway_order_id, "Payment verified");
                self.if_current(generation, |inner| {
                    inner.state = PurchaseState::GatewaySuccess;
                });
                self.refresh_metrics(generation).await;
                Ok(())
            }
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| "verification rejected by server".to_string());
                tracing::warn!(order_id = %request.gateway_order_id, %message, "Payment verification refused");
                self.if_current(generation, |inner| {
                    inner.state =
                        PurchaseState::GatewayFailure(FailureReason::VerificationFailed(
                            message.clone(),
                        ));
                });
                Err(ApiError::PaymentVerificationFailed(message))
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(order_id = %request.gateway_order_id, error = %message, "Payment verification failed");
                self.if_current(generation, |inner| {
                    inner.state =
                        PurchaseState::GatewayFailure(FailureReason::VerificationFailed(
                            message.clone(),
                        ));
                });
                Err(ApiError::PaymentVerificationFailed(message))
            }
        }
    }

    /// The user dismissed the payment widget before completing payment.
    ///
    /// A cancellation, not a fault: the flow ends in a dismissible failure
    /// state rather than an error.
    pub fn dismiss_gateway(&self) {
        let mut inner = self.inner.lock().unwrap();
        if matches!(inner.state, PurchaseState::GatewayPending(_)) {
            tracing::info!("Payment widget dismissed by user");
            inner.state = PurchaseState::GatewayFailure(FailureReason::Cancelled);
        }
    }

    /// Close the flow and discard the draft.
    ///
    /// Any response still in flight for the old draft is discarded when it
    /// arrives.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.generation += 1;
        inner.state = PurchaseState::Closed;
        inner.book = None;
        inner.quantity = WALLET_DEFAULT_QUANTITY;
        inner.payment_method = PaymentMethod::Wallet;
        inner.last_error = None;
    }

    /// Refresh dashboard metrics after a settled order so dependent views
    /// show updated figures. Failures here are logged, not surfaced; the
    /// order itself already succeeded.
    async fn refresh_metrics(&self, generation: u64) {
        match self.transport.get("books/dashboard").await {
            Ok(value) => match serde_json::from_value::<DashboardMetrics>(value) {
                Ok(metrics) => {
                    self.if_current(generation, |inner| inner.metrics = Some(metrics));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Unexpected dashboard metrics shape");
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh dashboard metrics");
            }
        }
    }

    fn if_current(&self, generation: u64, apply: impl FnOnce(&mut Inner)) {
        let mut inner = self.inner.lock().unwrap();
        if inner.generation == generation {
            apply(&mut inner);
        } else {
            tracing::debug!("Discarding response for a closed purchase draft");
        }
    }

    fn total_of(inner: &Inner) -> f64 {
        match &inner.book {
            Some(book) => book.price * inner.quantity as f64,
            None => 0.0,
        }
    }
}
