//! Purchase flow integration tests

use std::sync::Arc;

use serde_json::json;

use authorhub_client::api::MockTransport;
use authorhub_client::error::ApiError;
use authorhub_client::flows::{
    FailureReason, PaymentMethod, PurchaseFlow, PurchaseState, GATEWAY_DEFAULT_QUANTITY,
    WALLET_DEFAULT_QUANTITY,
};
use authorhub_client::models::{Book, GatewayProof};
use authorhub_client::session::SessionStore;
use authorhub_client::storage::MemoryStore;

fn book(id: &str, title: &str, price: f64) -> Book {
    Book {
        id: id.to_string(),
        title: title.to_string(),
        isbn: None,
        price,
        cover_image: None,
        formats: Vec::new(),
    }
}

fn new_flow(wallet_balance: f64) -> (Arc<MockTransport>, PurchaseFlow) {
    let mock = Arc::new(MockTransport::new());
    let session = Arc::new(SessionStore::new(
        mock.clone(),
        Arc::new(MemoryStore::new()),
    ));
    mock.enqueue_ok(
        "GET",
        "auth/profile",
        json!({ "_id": "u1", "walletBalance": wallet_balance }),
    );
    (mock.clone(), PurchaseFlow::new(mock, session))
}

fn proof() -> GatewayProof {
    GatewayProof {
        order_id: "order_123".to_string(),
        payment_id: "pay_456".to_string(),
        signature: "sig_789".to_string(),
    }
}

#[tokio::test]
async fn test_open_applies_wallet_defaults_and_fetches_balance() {
    let (_mock, flow) = new_flow(1000.0);
    flow.open(book("b1", "First", 299.0)).await.unwrap();

    assert_eq!(flow.state(), PurchaseState::Reviewing);
    assert_eq!(flow.payment_method(), PaymentMethod::Wallet);
    assert_eq!(flow.quantity(), WALLET_DEFAULT_QUANTITY);
    assert_eq!(flow.wallet_balance(), 1000.0);
}

#[tokio::test]
async fn test_method_switch_resets_quantity_to_the_method_default() {
    let (_mock, flow) = new_flow(1000.0);
    flow.open(book("b1", "First", 299.0)).await.unwrap();

    flow.set_quantity(7);
    flow.set_payment_method(PaymentMethod::Gateway);
    assert_eq!(flow.quantity(), GATEWAY_DEFAULT_QUANTITY);

    flow.set_quantity(9);
    flow.set_payment_method(PaymentMethod::Wallet);
    assert_eq!(flow.quantity(), WALLET_DEFAULT_QUANTITY);
}

#[tokio::test]
async fn test_quantity_never_drops_below_one() {
    let (_mock, flow) = new_flow(1000.0);
    flow.open(book("b1", "First", 299.0)).await.unwrap();

    flow.set_quantity(0);
    assert_eq!(flow.quantity(), 1);

    flow.decrement_quantity();
    assert_eq!(flow.quantity(), 1);

    flow.increment_quantity();
    assert_eq!(flow.quantity(), 2);
}

#[tokio::test]
async fn test_insufficient_wallet_balance_blocks_without_a_network_call() {
    let (mock, flow) = new_flow(100.0);
    flow.open(book("b1", "First", 60.0)).await.unwrap();

    // Two copies at 60 exceed the 100 balance.
    assert_eq!(flow.total_amount(), 120.0);
    assert!(!flow.has_sufficient_balance());
    assert!(!flow.can_submit());

    let err = flow.submit().await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(mock.call_count("orders"), 0);
    assert_eq!(flow.state(), PurchaseState::Reviewing);

    // Dropping to one copy brings the order back within balance.
    flow.set_quantity(1);
    assert!(flow.has_sufficient_balance());
    assert!(flow.can_submit());
}

#[tokio::test]
async fn test_gateway_orders_ignore_the_wallet_balance() {
    let (_mock, flow) = new_flow(0.0);
    flow.open(book("b1", "First", 500.0)).await.unwrap();

    flow.set_payment_method(PaymentMethod::Gateway);
    assert!(flow.has_sufficient_balance());
    assert!(flow.can_submit());
}

#[tokio::test]
async fn test_wallet_order_settles_immediately_and_refreshes_metrics() {
    let (mock, flow) = new_flow(1000.0);
    mock.enqueue_ok(
        "POST",
        "orders",
        json!({ "paymentMethod": "wallet", "message": "Order placed" }),
    );
    mock.enqueue_ok(
        "GET",
        "books/dashboard",
        json!({ "totalRoyaltyEarned": 9000.0, "copiesSold": 42 }),
    );

    flow.open(book("b1", "First", 60.0)).await.unwrap();
    flow.submit().await.unwrap();

    assert_eq!(flow.state(), PurchaseState::WalletSuccess);
    assert_eq!(flow.metrics().unwrap().copies_sold, 42);
}

#[tokio::test]
async fn test_gateway_order_moves_to_pending_with_checkout_details() {
    let (mock, flow) = new_flow(0.0);
    mock.enqueue_ok(
        "POST",
        "orders",
        json!({
            "paymentMethod": "razorpay",
            "razorpayKeyId": "rzp_test_key",
            "orderId": "order_123",
            "amount": 89700,
            "user": { "name": "Asha", "email": "asha@example.com" }
        }),
    );

    flow.open(book("b1", "First", 299.0)).await.unwrap();
    flow.set_payment_method(PaymentMethod::Gateway);
    flow.submit().await.unwrap();

    match flow.state() {
        PurchaseState::GatewayPending(checkout) => {
            assert_eq!(checkout.key_id, "rzp_test_key");
            assert_eq!(checkout.order_id, "order_123");
            assert_eq!(checkout.amount, 89700);
            assert_eq!(checkout.description, "Purchase of 3 copies of First");
            assert_eq!(checkout.prefill_email, "asha@example.com");
        }
        other => panic!("expected pending gateway order, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_verification_overrules_the_widget() {
    let (mock, flow) = new_flow(0.0);
    mock.enqueue_ok(
        "POST",
        "orders",
        json!({
            "paymentMethod": "razorpay",
            "razorpayKeyId": "rzp_test_key",
            "orderId": "order_123",
            "amount": 89700
        }),
    );
    mock.enqueue_ok(
        "POST",
        "orders/verify-payment",
        json!({ "success": false, "message": "signature mismatch" }),
    );

    flow.open(book("b1", "First", 299.0)).await.unwrap();
    flow.set_payment_method(PaymentMethod::Gateway);
    flow.submit().await.unwrap();

    // The widget reported success, yet the backend refused the proof.
    let err = flow.complete_gateway_payment(proof()).await.unwrap_err();
    assert!(matches!(err, ApiError::PaymentVerificationFailed(_)));
    assert_eq!(
        flow.state(),
        PurchaseState::GatewayFailure(FailureReason::VerificationFailed(
            "signature mismatch".to_string()
        ))
    );
}

#[tokio::test]
async fn test_verified_payment_succeeds_and_refreshes_metrics() {
    let (mock, flow) = new_flow(0.0);
    mock.enqueue_ok(
        "POST",
        "orders",
        json!({
            "paymentMethod": "razorpay",
            "razorpayKeyId": "rzp_test_key",
            "orderId": "order_123",
            "amount": 89700
        }),
    );
    mock.enqueue_ok("POST", "orders/verify-payment", json!({ "success": true }));
    mock.enqueue_ok(
        "GET",
        "books/dashboard",
        json!({ "totalRoyaltyEarned": 9299.0, "copiesSold": 45 }),
    );

    flow.open(book("b1", "First", 299.0)).await.unwrap();
    flow.set_payment_method(PaymentMethod::Gateway);
    flow.submit().await.unwrap();
    flow.complete_gateway_payment(proof()).await.unwrap();

    assert_eq!(flow.state(), PurchaseState::GatewaySuccess);
    assert_eq!(flow.metrics().unwrap().copies_sold, 45);

    let verify = mock
        .requests()
        .into_iter()
        .find(|r| r.path == "orders/verify-payment")
        .unwrap();
    assert_eq!(
        verify.body,
        Some(json!({
            "gatewayOrderId": "order_123",
            "gatewayPaymentId": "pay_456",
            "gatewaySignature": "sig_789",
            "bookId": "b1",
            "quantity": 3
        }))
    );
}

#[tokio::test]
async fn test_dismissing_the_widget_is_a_cancellation_not_an_error() {
    let (mock, flow) = new_flow(0.0);
    mock.enqueue_ok(
        "POST",
        "orders",
        json!({
            "paymentMethod": "razorpay",
            "razorpayKeyId": "rzp_test_key",
            "orderId": "order_123",
            "amount": 89700
        }),
    );

    flow.open(book("b1", "First", 299.0)).await.unwrap();
    flow.set_payment_method(PaymentMethod::Gateway);
    flow.submit().await.unwrap();

    flow.dismiss_gateway();
    assert_eq!(
        flow.state(),
        PurchaseState::GatewayFailure(FailureReason::Cancelled)
    );

    // No verification request was ever made.
    assert_eq!(mock.call_count("orders/verify-payment"), 0);
}

#[tokio::test]
async fn test_dismiss_outside_the_pending_state_is_a_no_op() {
    let (_mock, flow) = new_flow(1000.0);
    flow.open(book("b1", "First", 60.0)).await.unwrap();

    flow.dismiss_gateway();
    assert_eq!(flow.state(), PurchaseState::Reviewing);
}

#[tokio::test]
async fn test_failed_order_creation_keeps_the_draft_and_error_details() {
    let (mock, flow) = new_flow(1000.0);
    mock.enqueue_err(
        "POST",
        "orders",
        ApiError::Server {
            status: 400,
            message: "Order rejected".to_string(),
            details: vec![
                "Book is out of print".to_string(),
                "Contact support to reorder".to_string(),
            ],
        },
    );

    flow.open(book("b1", "First", 60.0)).await.unwrap();
    assert!(flow.submit().await.is_err());

    assert_eq!(flow.state(), PurchaseState::Reviewing);
    assert!(flow.selected_book().is_some());
    assert_eq!(flow.quantity(), WALLET_DEFAULT_QUANTITY);

    let err = flow.last_error().unwrap();
    assert_eq!(
        err.details(),
        vec![
            "Book is out of print".to_string(),
            "Contact support to reorder".to_string()
        ]
    );
}

#[tokio::test]
async fn test_close_resets_the_draft() {
    let (_mock, flow) = new_flow(1000.0);
    flow.open(book("b1", "First", 60.0)).await.unwrap();
    flow.set_payment_method(PaymentMethod::Gateway);
    flow.set_quantity(9);

    flow.close();

    assert_eq!(flow.state(), PurchaseState::Closed);
    assert!(flow.selected_book().is_none());
    assert_eq!(flow.payment_method(), PaymentMethod::Wallet);
    assert_eq!(flow.quantity(), WALLET_DEFAULT_QUANTITY);
}
