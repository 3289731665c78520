use ledger_client::*;
use mockito::Matcher;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use std::time::Duration;
use uuid::Uuid;

fn client(server: &mockito::ServerGuard) -> HttpLedgerClient {
    HttpLedgerClient::new(&format!("{}/", server.url()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_balance_summary_decodes() {
    let mut server = mockito::Server::new_async().await;
    let customer_id = Uuid::new_v4();
    let mock = server
        .mock("GET", format!("/customers/{customer_id}/ledger/summary").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "balance": "619.00",
                "lastBill": {
                    "id": "0b7e1d38-5c6f-4e2a-8d9b-7a6c5e4d3c2b",
                    "periodStart": "2024-03-01",
                    "periodEnd": "2024-03-31",
                    "subtotal": "499",
                    "amountTotal": "619",
                    "balance": "619",
                    "status": "UNPAID",
                    "invoiceKind": "SUBSCRIPTION",
                    "createdAt": "2024-03-01T09:30:00Z"
                },
                "lastPayment": null
            }"#,
        )
        .create_async()
        .await;

    let summary = client(&server).balance_summary(customer_id).await.unwrap();
    mock.assert_async().await;

    assert_eq!(summary.balance, dec!(619));
    let bill = summary.last_bill.unwrap();
    assert_eq!(bill.invoice_kind, InvoiceKind::Subscription);
    assert_eq!(bill.period_end.map(|d| d.to_string()), Some("2024-03-31".to_string()));
    assert!(summary.last_payment.is_none());
}

#[tokio::test]
async fn test_missing_invoice_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    let invoice_id = Uuid::new_v4();
    server
        .mock("GET", format!("/invoices/{invoice_id}").as_str())
        .with_status(404)
        .create_async()
        .await;

    let err = client(&server).get_invoice(invoice_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { resource: "invoice", .. }));
}

#[tokio::test]
async fn test_rejection_carries_server_message() {
    let mut server = mockito::Server::new_async().await;
    let customer_id = Uuid::new_v4();
    server
        .mock("POST", format!("/customers/{customer_id}/add-on-bills").as_str())
        .match_body(Matcher::PartialJson(serde_json::json!({
            "itemName": "Router",
            "price": "1500"
        })))
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Customer account is suspended"}"#)
        .create_async()
        .await;

    let add_on = NewAddOnBill {
        item_name: "Router".to_string(),
        price: dec!(1500),
    };
    let err = client(&server)
        .create_add_on_bill(customer_id, add_on)
        .await
        .unwrap_err();

    match err {
        LedgerError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Customer account is suspended");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_rejection_without_body_uses_status_reason() {
    let mut server = mockito::Server::new_async().await;
    let transaction_id = Uuid::new_v4();
    server
        .mock("DELETE", format!("/transactions/{transaction_id}").as_str())
        .with_status(409)
        .create_async()
        .await;

    let err = client(&server)
        .delete_transaction(transaction_id)
        .await
        .unwrap_err();
    match err {
        LedgerError::Rejected { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Conflict");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_payment_route() {
    let mut server = mockito::Server::new_async().await;
    let payment_id = Uuid::new_v4();
    let mock = server
        .mock("DELETE", format!("/payments/{payment_id}").as_str())
        .with_status(204)
        .create_async()
        .await;

    client(&server).delete_payment(payment_id).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_active_plans_use_catalog_url_and_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/catalog/plans")
        .match_query(Matcher::UrlEncoded("status".into(), "active".into()))
        .match_header("authorization", "Bearer field-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"id": "6f0c4bde-3a5b-4c43-9d0e-1f2a3b4c5d6e", "name": "Fiber 100", "monthlyPrice": "499", "code": "F100"},
                {"id": "0b7e1d38-5c6f-4e2a-8d9b-7a6c5e4d3c2b", "name": "Legacy 10", "monthlyPrice": "99", "code": "L10", "active": false}
            ]"#,
        )
        .create_async()
        .await;

    let client = client(&server)
        .with_catalog_url(&format!("{}/catalog", server.url()))
        .with_auth_token(SecretString::new("field-token".to_string()));
    let plans = client.list_active_plans().await.unwrap();
    mock.assert_async().await;

    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].code, "F100");
    assert_eq!(plans[0].monthly_price, dec!(499));
}

#[tokio::test]
async fn test_create_payment_posts_camel_case_body() {
    let mut server = mockito::Server::new_async().await;
    let customer_id = Uuid::new_v4();
    let mock = server
        .mock("POST", format!("/customers/{customer_id}/payments").as_str())
        .match_body(Matcher::PartialJson(serde_json::json!({
            "amount": "1000",
            "discount": "200",
            "method": "PhonePe"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "6f0c4bde-3a5b-4c43-9d0e-1f2a3b4c5d6e",
                "amount": "1000",
                "discount": "200",
                "method": "PhonePe",
                "collectedAt": "2024-03-05T11:00:00Z",
                "collectedBy": "agent-7"
            }"#,
        )
        .create_async()
        .await;

    let payment = NewPayment {
        invoice_id: None,
        amount: dec!(1000),
        discount: dec!(200),
        method: PaymentMethod::PhonePe,
        collected_at: chrono::Utc::now(),
        comments: None,
    };
    let created = client(&server).create_payment(customer_id, payment).await.unwrap();
    mock.assert_async().await;

    assert_eq!(created.method, PaymentMethod::PhonePe);
    assert_eq!(created.collected_by.as_deref(), Some("agent-7"));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let customer_id = Uuid::new_v4();
    server
        .mock("GET", format!("/customers/{customer_id}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "not-a-uuid"}"#)
        .create_async()
        .await;

    let err = client(&server).get_customer(customer_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::Decode(_)));
}
