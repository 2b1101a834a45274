use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Map, Value};

use cregis_payment_engine::{
    order_types::{meta, OrderStatus},
    stores::MemoryOrderStore,
    traits::{OrderStore, OrderStoreError},
    OrderReconciler,
};
use cregis_tools::{sign_params, SIGN_FIELD};

use super::mocks::{
    fixtures::{cregis_api, sample_order, API_KEY},
    MockOrderBackend,
};
use crate::routes::CregisWebhookRoute;

/// A fully signed webhook body for the given event.
fn signed_payload(event_name: &str, event_type: &str, data: Value) -> String {
    let mut payload = Map::new();
    payload.insert("event_name".into(), json!(event_name));
    payload.insert("event_type".into(), json!(event_type));
    payload.insert("data".into(), data);
    let sign = sign_params(&payload, API_KEY);
    payload.insert(SIGN_FIELD.into(), json!(sign));
    Value::Object(payload).to_string()
}

async fn deliver<B>(store: B, body: &str) -> (StatusCode, String)
where B: OrderStore + 'static {
    let _ = env_logger::try_init().ok();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(cregis_api("http://127.0.0.1:1")))
            .app_data(web::Data::new(OrderReconciler::new(store, false)))
            .service(CregisWebhookRoute::<B>::new()),
    )
    .await;
    let req = test::TestRequest::post().uri("/webhook/cregis").set_payload(body.to_string()).to_request();
    let res = test::call_service(&app, req).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).to_string())
}

#[actix_web::test]
async fn empty_bodies_are_rejected() {
    let (status, body) = deliver(MemoryOrderStore::new(), "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid payload");
}

#[actix_web::test]
async fn unparseable_bodies_are_rejected() {
    let (status, body) = deliver(MemoryOrderStore::new(), "this is not json {").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid JSON");
}

#[actix_web::test]
async fn invalid_signatures_are_rejected_without_touching_the_order() {
    let store = MemoryOrderStore::new();
    store.upsert_order(sample_order(1, OrderStatus::Pending));
    let mut payload: Map<String, Value> =
        serde_json::from_str(&signed_payload("order", "paid", json!({"order_id": "1001", "tx_id": "0xabc"})))
            .unwrap();
    payload.insert(SIGN_FIELD.into(), json!("00000000000000000000000000000000"));
    let (status, body) = deliver(store.clone(), &Value::Object(payload).to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Invalid signature");
    assert_eq!(store.order(1).unwrap().status, OrderStatus::Pending);
    assert_eq!(store.meta(1, meta::TRANSACTION_HASH), None);
}

#[actix_web::test]
async fn missing_signatures_are_rejected() {
    let body = json!({"event_name": "order", "event_type": "paid", "data": {"order_id": "1001"}}).to_string();
    let (status, response) = deliver(MemoryOrderStore::new(), &body).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response, "Invalid signature");
}

#[actix_web::test]
async fn paid_events_complete_the_order() {
    let store = MemoryOrderStore::new();
    store.upsert_order(sample_order(1, OrderStatus::Pending));
    let body = signed_payload(
        "order",
        "paid",
        json!({"order_id": "1001", "tx_id": "0xabc", "pay_amount": "100.00", "pay_currency": "USDT"}),
    );
    let (status, response) = deliver(store.clone(), &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, "success");
    assert!(store.order(1).unwrap().is_paid());
    assert_eq!(store.meta(1, meta::TRANSACTION_HASH).as_deref(), Some("0xabc"));
}

#[actix_web::test]
async fn duplicate_paid_events_are_acknowledged_without_side_effects() {
    let store = MemoryOrderStore::new();
    store.upsert_order(sample_order(1, OrderStatus::Processing));
    let body = signed_payload("order", "paid", json!({"order_id": "1001", "tx_id": "0xabc"}));
    let (status, response) = deliver(store.clone(), &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, "success");
    assert_eq!(store.paid_reference(1), None);
}

#[actix_web::test]
async fn expired_events_for_paid_orders_are_no_ops() {
    let store = MemoryOrderStore::new();
    store.upsert_order(sample_order(1, OrderStatus::Processing));
    let body = signed_payload("order", "expired", json!({"order_id": "1001"}));
    let (status, _) = deliver(store.clone(), &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.order(1).unwrap().status, OrderStatus::Processing);
}

#[actix_web::test]
async fn events_for_unknown_orders_are_processing_errors() {
    let body = signed_payload("order", "paid", json!({"order_id": "9999", "tx_id": "0xabc"}));
    let (status, response) = deliver(MemoryOrderStore::new(), &body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response, "Processing error");
}

#[actix_web::test]
async fn non_order_events_are_acknowledged() {
    let store = MemoryOrderStore::new();
    store.upsert_order(sample_order(1, OrderStatus::Pending));
    let body = signed_payload("payout", "paid", json!({"order_id": "1001"}));
    let (status, response) = deliver(store.clone(), &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, "success");
    assert_eq!(store.order(1).unwrap().status, OrderStatus::Pending);
}

#[actix_web::test]
async fn unknown_event_types_are_acknowledged() {
    let store = MemoryOrderStore::new();
    store.upsert_order(sample_order(1, OrderStatus::Pending));
    let body = signed_payload("order", "paid_sideways", json!({"order_id": "1001"}));
    let (status, response) = deliver(store, &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, "success");
}

#[actix_web::test]
async fn orders_resolvable_only_by_access_key_are_found() {
    let store = MemoryOrderStore::new();
    let mut order = sample_order(1, OrderStatus::Pending);
    order.order_number = "unrelated".to_string();
    order.order_key = "wc_order_k3y".to_string();
    store.upsert_order(order);
    let body = signed_payload("order", "paid", json!({"order_id": "wc_order_k3y", "tx_id": "0xabc"}));
    let (status, _) = deliver(store.clone(), &body).await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.order(1).unwrap().is_paid());
}

#[actix_web::test]
async fn store_failures_surface_as_processing_errors() {
    let mut store = MockOrderBackend::new();
    store
        .expect_find_by_order_number()
        .returning(|_| Err(OrderStoreError::Backend("connection lost".to_string())));
    let body = signed_payload("order", "paid", json!({"order_id": "1001", "tx_id": "0xabc"}));
    let (status, response) = deliver(store, &body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response, "Processing error");
}
