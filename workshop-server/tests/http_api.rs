//! HTTP surface driven through the router without a socket

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sha2::Sha256;
use shared::models::{OrderStatus, PaymentStatus};
use tower::ServiceExt;
use workshop_server::api::build_app;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn signature_header(payload: &[u8], secret: &str) -> String {
    let ts = chrono::Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{ts}.").as_bytes());
    mac.update(payload);
    format!("t={ts},v1={}", hex::encode(mac.finalize().into_bytes()))
}

fn webhook(payload: &Value, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/webhooks/stripe")
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header("stripe-signature", sig);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

async fn shop() -> (TestEnv, Router) {
    let env = setup().await;
    seed_user(env.pool(), 1, "Ana", "ana@example.com").await;
    seed_user(env.pool(), 2, "Bob", "bob@example.com").await;
    seed_product(env.pool(), 1, 500.0, 10, "oak").await;
    seed_option(env.pool(), 10, 1, "material", 100.0, 3).await;
    seed_stock(env.pool(), "oak", 5.0).await;
    let app = build_app(env.state.clone());
    (env, app)
}

async fn create_order(app: &Router, payment_method: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/orders",
            json!({
                "user_id": 1,
                "items": [{ "product_id": 1, "quantity": 2, "selected_options": [{ "id": 10, "type": "material" }] }],
                "payment_method": payment_method
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn test_health() {
    let (_env, app) = shop().await;
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_create_cash_order() {
    let (_env, app) = shop().await;
    let body = create_order(&app, "cash").await;

    assert_eq!(body["total_price"], json!(1200.0));
    assert_eq!(body["estimated_production_time_days"], json!(13));
    assert_eq!(body["status"], "new");
    assert_eq!(body["payment_status"], "pending");
    assert!(body.get("checkout_url").is_none());
}

#[tokio::test]
async fn test_create_card_order_returns_checkout() {
    let (env, app) = shop().await;
    let body = create_order(&app, "Card").await;

    let order_id = body["order_id"].as_i64().unwrap();
    assert_eq!(
        body["checkout_url"],
        json!(format!("https://checkout.test/session/{order_id}"))
    );
    assert_eq!(env.checkout.sessions(), vec![order_id]);
}

#[tokio::test]
async fn test_create_order_errors() {
    let (_env, app) = shop().await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/orders", json!({ "user_id": 1, "items": [], "payment_method": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(4007));

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/orders",
            json!({ "user_id": 1, "items": [{ "product_id": 99, "quantity": 1 }], "payment_method": "cash" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"]["product_id"], json!(99));
}

#[tokio::test]
async fn test_user_order_routes() {
    let (_env, app) = shop().await;
    let created = create_order(&app, "cash").await;
    let order_id = created["order_id"].as_i64().unwrap();

    let (status, body) = send(&app, get("/api/users/1/orders")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, get(&format!("/api/users/1/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, get(&format!("/api/users/2/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        json_request("POST", &format!("/api/orders/{order_id}/checkout"), json!({ "user_id": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        json_request("POST", &format!("/api/orders/{order_id}/checkout"), json!({ "user_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["checkout_url"].as_str().is_some());
}

#[tokio::test]
async fn test_webhook_applies_payment() {
    let (env, app) = shop().await;
    let created = create_order(&app, "card").await;
    let order_id = created["order_id"].as_i64().unwrap();

    let event = json!({
        "id": "evt_paid_1",
        "type": "payment_intent.succeeded",
        "data": { "object": { "metadata": { "order_id": order_id.to_string() } } }
    });
    let payload = event.to_string();

    for _ in 0..2 {
        let sig = signature_header(payload.as_bytes(), WEBHOOK_SECRET);
        let (status, _) = send(&app, webhook(&event, Some(sig))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let order = env
        .state
        .ports
        .orders
        .find_order(order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(order.status, OrderStatus::InProduction);
    assert_eq!(stock_level(env.pool(), "oak").await, Some(3.0));
}

#[tokio::test]
async fn test_webhook_expired_session_cancels() {
    let (env, app) = shop().await;
    let created = create_order(&app, "card").await;
    let order_id = created["order_id"].as_i64().unwrap();

    let event = json!({
        "id": "evt_expired_1",
        "type": "checkout.session.expired",
        "data": { "object": { "client_reference_id": order_id.to_string(), "metadata": {} } }
    });
    let sig = signature_header(event.to_string().as_bytes(), WEBHOOK_SECRET);
    let (status, _) = send(&app, webhook(&event, Some(sig))).await;
    assert_eq!(status, StatusCode::OK);

    let order = env
        .state
        .ports
        .orders
        .find_order(order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Cancelled);
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_webhook_rejections() {
    let (env, app) = shop().await;
    let event = json!({ "id": "evt_1", "type": "payment_intent.succeeded", "data": { "object": {} } });

    let (status, _) = send(&app, webhook(&event, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let forged = signature_header(event.to_string().as_bytes(), "wrong_secret");
    let (status, _) = send(&app, webhook(&event, Some(forged))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let raw = "not json";
    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/stripe")
        .header("stripe-signature", signature_header(raw.as_bytes(), WEBHOOK_SECRET))
        .body(Body::from(raw))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(count_rows(env.pool(), "payment_events").await, 0);
}

#[tokio::test]
async fn test_webhook_acknowledges_unhandled_events() {
    let (env, app) = shop().await;

    let ignored = json!({ "id": "evt_2", "type": "customer.created", "data": { "object": {} } });
    let sig = signature_header(ignored.to_string().as_bytes(), WEBHOOK_SECRET);
    let (status, _) = send(&app, webhook(&ignored, Some(sig))).await;
    assert_eq!(status, StatusCode::OK);

    let unknown_order = json!({
        "id": "evt_3",
        "type": "payment_intent.succeeded",
        "data": { "object": { "metadata": { "order_id": "987654" } } }
    });
    let sig = signature_header(unknown_order.to_string().as_bytes(), WEBHOOK_SECRET);
    let (status, _) = send(&app, webhook(&unknown_order, Some(sig))).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(count_rows(env.pool(), "payment_events").await, 0);
}

#[tokio::test]
async fn test_card_payment_route() {
    let (_env, app) = shop().await;
    let created = create_order(&app, "card").await;
    let order_id = created["order_id"].as_i64().unwrap();

    let card = json!({
        "order_id": order_id,
        "card_number": "4242424242424242",
        "cvv": "123",
        "cardholder": "Ana",
        "expiry_month": "01",
        "expiry_year": "31"
    });
    let (status, body) = send(&app, json_request("POST", "/api/payments/card", card.clone())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["payment_status"], "paid");
    assert_eq!(body["status"], "in_production");

    let (status, _) = send(&app, json_request("POST", "/api/payments/card", card)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_routes() {
    let (_env, app) = shop().await;
    let created = create_order(&app, "cash").await;
    let order_id = created["order_id"].as_i64().unwrap();
    let status_uri = format!("/api/admin/orders/{order_id}/status");

    let (status, _) = send(&app, json_request("PATCH", &status_uri, json!({ "status": "bogus" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, get("/api/admin/orders?status=new")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) =
        send(&app, json_request("PATCH", &status_uri, json!({ "status": "processing" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processing");

    let (_, body) = send(&app, get("/api/admin/orders?status=new")).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = send(&app, get("/api/admin/orders?status=lost")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_stock_routes() {
    let (_env, app) = shop().await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/admin/stock",
            json!({ "material_name": "pine", "quantity_available": 12.5, "unit": "m" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity_available"], json!(12.5));

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/admin/stock",
            json!({ "material_name": "pine", "quantity_available": -1.0, "unit": "m" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/admin/stock")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["material_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["oak", "pine"]);
}
