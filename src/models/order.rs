//! Order and payment models

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::flows::PaymentMethod;

/// Body for POST orders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub book_id: String,
    pub quantity: u32,
    pub payment_method: PaymentMethod,
}

/// Buyer details the gateway widget is prefilled with
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prefill {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Raw shape of the order-creation response; the backend discriminates the
/// settlement path through `paymentMethod`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrderResponse {
    #[serde(default)]
    payment_method: Option<PaymentMethod>,
    #[serde(default)]
    razorpay_key_id: Option<String>,
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    user: Option<Prefill>,
    #[serde(default)]
    message: Option<String>,
}

/// Normalized outcome of order creation
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    /// Settled immediately from the internal wallet.
    Wallet { message: Option<String> },
    /// The backend minted a gateway order; the client must drive the widget.
    Gateway {
        key_id: String,
        order_id: String,
        /// Amount to present, in the smallest currency unit.
        amount: i64,
        prefill_name: String,
        prefill_email: String,
    },
}

impl OrderOutcome {
    /// Normalize a raw order-creation response.
    pub fn from_value(value: Value) -> ApiResult<Self> {
        let raw: RawOrderResponse = serde_json::from_value(value)?;

        match raw.payment_method {
            Some(PaymentMethod::Gateway) => {
                let missing = |field: &str| ApiError::Server {
                    status: 0,
                    message: format!("Gateway order response missing {}", field),
                    details: Vec::new(),
                };
                let prefill = raw.user.unwrap_or_default();
                Ok(OrderOutcome::Gateway {
                    key_id: raw.razorpay_key_id.ok_or_else(|| missing("key id"))?,
                    order_id: raw.order_id.ok_or_else(|| missing("order id"))?,
                    amount: raw.amount.ok_or_else(|| missing("amount"))?,
                    prefill_name: prefill.name.unwrap_or_default(),
                    prefill_email: prefill.email.unwrap_or_default(),
                })
            }
            _ => Ok(OrderOutcome::Wallet {
                message: raw.message,
            }),
        }
    }
}

/// Everything the external payment widget needs to open
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayCheckout {
    pub key_id: String,
    pub order_id: String,
    /// Amount in the smallest currency unit, as minted by the backend.
    pub amount: i64,
    pub description: String,
    pub prefill_name: String,
    pub prefill_email: String,
}

/// Proof issued by the gateway widget after the user completes payment.
///
/// Never trusted directly; always exchanged with the verification endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayProof {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Body for POST orders/verify-payment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub gateway_signature: String,
    pub book_id: String,
    pub quantity: u32,
}

/// Response from the payment verification endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wallet_outcome() {
        let outcome = OrderOutcome::from_value(json!({
            "paymentMethod": "wallet",
            "message": "Order placed"
        }))
        .unwrap();
        assert_eq!(
            outcome,
            OrderOutcome::Wallet {
                message: Some("Order placed".to_string())
            }
        );
    }

    #[test]
    fn test_gateway_outcome() {
        let outcome = OrderOutcome::from_value(json!({
            "paymentMethod": "razorpay",
            "razorpayKeyId": "rzp_test_key",
            "orderId": "order_123",
            "amount": 59800,
            "user": {"name": "Asha", "email": "asha@example.com"}
        }))
        .unwrap();
        match outcome {
            OrderOutcome::Gateway {
                key_id,
                order_id,
                amount,
                prefill_name,
                ..
            } => {
                assert_eq!(key_id, "rzp_test_key");
                assert_eq!(order_id, "order_123");
                assert_eq!(amount, 59800);
                assert_eq!(prefill_name, "Asha");
            }
            other => panic!("expected gateway outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_gateway_outcome_missing_handle_is_an_error() {
        let result = OrderOutcome::from_value(json!({
            "paymentMethod": "razorpay",
            "amount": 100
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_order_request_wire_shape() {
        let req = CreateOrderRequest {
            book_id: "b1".to_string(),
            quantity: 3,
            payment_method: PaymentMethod::Gateway,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"bookId": "b1", "quantity": 3, "paymentMethod": "razorpay"})
        );
    }
}
