//! Order placement, customer views and admin status writes against SQLite

mod common;

use common::*;
use shared::error::ErrorCode;
use shared::models::{
    CreateOrderRequest, OptionType, OrderItemRequest, OrderStatus, PaymentStatus, SelectedOption,
    UserRole,
};
use workshop_server::StatusPolicy;
use workshop_server::fulfillment::{queries, status};

fn line(product_id: i64, quantity: i64, options: &[(i64, OptionType)]) -> OrderItemRequest {
    OrderItemRequest {
        product_id,
        quantity,
        selected_options: options
            .iter()
            .map(|(id, option_type)| SelectedOption {
                id: *id,
                option_type: *option_type,
            })
            .collect(),
    }
}

fn guest_request(email: &str, items: Vec<OrderItemRequest>) -> CreateOrderRequest {
    CreateOrderRequest {
        name: Some("Ana Garcia".into()),
        email: Some(email.into()),
        address: Some("Calle Mayor 5".into()),
        items,
        payment_method: "cash".into(),
        ..Default::default()
    }
}

async fn seed_catalog(env: &TestEnv) {
    seed_product(env.pool(), 1, 500.0, 10, "oak").await;
    seed_option(env.pool(), 10, 1, "material", 100.0, 3).await;
}

#[tokio::test]
async fn test_priced_order_with_option() {
    let env = setup().await;
    seed_catalog(&env).await;

    let order = env
        .state
        .assembler
        .assemble(guest_request(
            "ana@example.com",
            vec![line(1, 2, &[(10, OptionType::Material)])],
        ))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::New);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.total_price, 1200.0);
    assert_eq!(order.estimated_production_time_days, 13);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].unit_price, 600.0);
    assert_eq!(order.items[0].line_total, 1200.0);
    assert_eq!(order.items[0].calculated_production_time_days, 13);

    let stored = env
        .state
        .ports
        .orders
        .find_with_items(order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total_price, 1200.0);
    assert_eq!(stored.items.len(), 1);
    assert_eq!(stored.items[0].quantity, 2);
    assert_eq!(stored.items[0].selected_options.len(), 1);
    assert_eq!(stored.items[0].selected_options[0].id, 10);
}

#[tokio::test]
async fn test_backlog_adds_days() {
    let env = setup().await;
    seed_catalog(&env).await;
    seed_user(env.pool(), 7, "Busy", "busy@example.com").await;
    seed_orders_with_status(env.pool(), 7, "in_production", 6).await;

    let order = env
        .state
        .assembler
        .assemble(guest_request(
            "ana@example.com",
            vec![line(1, 1, &[(10, OptionType::Material)])],
        ))
        .await
        .unwrap();
    assert_eq!(order.estimated_production_time_days, 14);
}

#[tokio::test]
async fn test_guest_is_reused_by_email() {
    let env = setup().await;
    seed_catalog(&env).await;

    let first = env
        .state
        .assembler
        .assemble(guest_request("guest@example.com", vec![line(1, 1, &[])]))
        .await
        .unwrap();
    let second = env
        .state
        .assembler
        .assemble(guest_request("GUEST@example.com", vec![line(1, 1, &[])]))
        .await
        .unwrap();

    assert_eq!(first.user_id, second.user_id);
    assert_eq!(count_rows(env.pool(), "users").await, 1);

    let user = env
        .state
        .ports
        .users
        .find_user(first.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.role, UserRole::Guest);
    assert_eq!(user.name, "Ana Garcia");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_guest_orders_share_one_user() {
    let env = setup().await;
    seed_catalog(&env).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let assembler = env.state.assembler.clone();
            tokio::spawn(async move {
                assembler
                    .assemble(guest_request("race@example.com", vec![line(1, 1, &[])]))
                    .await
            })
        })
        .collect();

    let mut user_ids = Vec::new();
    for handle in handles {
        let order = handle.await.unwrap().unwrap();
        user_ids.push(order.user_id);
    }

    user_ids.dedup();
    assert_eq!(user_ids.len(), 1);
    assert_eq!(count_rows(env.pool(), "users").await, 1);
    assert_eq!(count_rows(env.pool(), "orders").await, 8);
}

#[tokio::test]
async fn test_registered_user_defaults_fill_order() {
    let env = setup().await;
    seed_catalog(&env).await;
    seed_user(env.pool(), 42, "Bea", "bea@example.com").await;

    let order = env
        .state
        .assembler
        .assemble(CreateOrderRequest {
            user_id: Some(42),
            items: vec![line(1, 1, &[])],
            payment_method: " CASH ".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(order.user_id, 42);
    assert_eq!(order.name.as_deref(), Some("Bea"));
    assert_eq!(order.email.as_deref(), Some("bea@example.com"));
    assert_eq!(order.address.as_deref(), Some("Main St 1"));
    assert_eq!(order.payment_method, "cash");

    let sent = env.notifier.wait_for("Order created", 1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "bea@example.com");
    assert!(sent[0].body.contains(&order.id.to_string()));
}

#[tokio::test]
async fn test_validation_errors() {
    let env = setup().await;
    seed_catalog(&env).await;
    let assembler = &env.state.assembler;

    let err = assembler
        .assemble(guest_request("ana@example.com", vec![]))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderEmpty);

    let mut req = guest_request("ana@example.com", vec![line(1, 1, &[])]);
    req.payment_method = "   ".into();
    let err = assembler.assemble(req).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentInvalidMethod);

    let mut req = guest_request("ana@example.com", vec![line(1, 1, &[])]);
    req.email = None;
    let err = assembler.assemble(req).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RequiredField);

    let req = CreateOrderRequest {
        user_id: Some(999),
        items: vec![line(1, 1, &[])],
        payment_method: "cash".into(),
        ..Default::default()
    };
    let err = assembler.assemble(req).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::UserNotFound);

    assert_eq!(count_rows(env.pool(), "orders").await, 0);
}

#[tokio::test]
async fn test_missing_product_writes_nothing() {
    let env = setup().await;
    seed_catalog(&env).await;

    let err = env
        .state
        .assembler
        .assemble(guest_request(
            "ana@example.com",
            vec![line(1, 1, &[]), line(404, 1, &[])],
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ProductNotFound);
    assert_eq!(
        err.details.as_ref().and_then(|d| d.get("product_id")).cloned(),
        Some(serde_json::json!(404))
    );
    assert_eq!(count_rows(env.pool(), "orders").await, 0);
    assert_eq!(count_rows(env.pool(), "order_items").await, 0);
    assert_eq!(count_rows(env.pool(), "users").await, 0);
}

#[tokio::test]
async fn test_non_positive_quantity_becomes_one() {
    let env = setup().await;
    seed_catalog(&env).await;

    let order = env
        .state
        .assembler
        .assemble(guest_request(
            "ana@example.com",
            vec![line(1, 0, &[]), line(1, -3, &[])],
        ))
        .await
        .unwrap();

    assert!(order.items.iter().all(|i| i.quantity == 1));
    assert_eq!(order.total_price, 1000.0);
}

#[tokio::test]
async fn test_user_order_views() {
    let env = setup().await;
    seed_catalog(&env).await;
    seed_user(env.pool(), 1, "Ana", "ana@example.com").await;
    seed_user(env.pool(), 2, "Bob", "bob@example.com").await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        // Distinct creation timestamps keep the newest-first order stable
        tokio::time::sleep(std::time::Duration::from_millis(3)).await;
        let order = env
            .state
            .assembler
            .assemble(CreateOrderRequest {
                user_id: Some(1),
                items: vec![line(1, 1, &[])],
                payment_method: "cash".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        ids.push(order.id);
    }

    let orders = env.state.ports.orders.as_ref();
    let listed = queries::list_user_orders(orders, 1).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, ids[1]);
    assert!(queries::list_user_orders(orders, 2).await.unwrap().is_empty());

    let own = queries::get_user_order(orders, 1, ids[0]).await.unwrap();
    assert_eq!(own.items.len(), 1);

    let err = queries::get_user_order(orders, 2, ids[0]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let err = queries::get_user_order(orders, 1, 12345).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
}

#[tokio::test]
async fn test_admin_list_filters_by_status() {
    let env = setup().await;
    seed_user(env.pool(), 3, "Cy", "cy@example.com").await;
    seed_orders_with_status(env.pool(), 3, "shipped", 2).await;

    let orders = env.state.ports.orders.as_ref();
    assert_eq!(queries::admin_list_orders(orders, None).await.unwrap().len(), 2);
    assert_eq!(
        queries::admin_list_orders(orders, Some("shipped"))
            .await
            .unwrap()
            .len(),
        2
    );
    assert!(
        queries::admin_list_orders(orders, Some("delivered"))
            .await
            .unwrap()
            .is_empty()
    );

    let err = queries::admin_list_orders(orders, Some("lost")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderInvalidStatus);
}

#[tokio::test]
async fn test_admin_status_update() {
    let env = setup().await;
    seed_catalog(&env).await;
    let order = env
        .state
        .assembler
        .assemble(guest_request("ana@example.com", vec![line(1, 1, &[])]))
        .await
        .unwrap();
    let orders = env.state.ports.orders.as_ref();

    let err = status::admin_update_status(orders, order.id, "bogus", StatusPolicy::Permissive)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderInvalidStatus);
    assert_eq!(err.code.http_status(), http::StatusCode::CONFLICT);
    let unchanged = orders.find_order(order.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, OrderStatus::New);

    // Permissive: non-adjacent writes go through
    let updated = status::admin_update_status(orders, order.id, "shipped", StatusPolicy::Permissive)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);

    // Same status twice is a no-op success
    let again = status::admin_update_status(orders, order.id, "shipped", StatusPolicy::Permissive)
        .await
        .unwrap();
    assert_eq!(again.status, OrderStatus::Shipped);

    let err = status::admin_update_status(orders, 777, "shipped", StatusPolicy::Permissive)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
}

#[tokio::test]
async fn test_strict_policy_rejects_skips() {
    let env = setup().await;
    seed_catalog(&env).await;
    let order = env
        .state
        .assembler
        .assemble(guest_request("ana@example.com", vec![line(1, 1, &[])]))
        .await
        .unwrap();
    let orders = env.state.ports.orders.as_ref();

    let err = status::admin_update_status(orders, order.id, "delivered", StatusPolicy::Strict)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderInvalidTransition);
    assert_eq!(
        orders.find_order(order.id).await.unwrap().unwrap().status,
        OrderStatus::New
    );

    let ok = status::admin_update_status(orders, order.id, "processing", StatusPolicy::Strict)
        .await
        .unwrap();
    assert_eq!(ok.status, OrderStatus::Processing);
}
