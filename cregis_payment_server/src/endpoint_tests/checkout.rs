//! Checkout flow tests against an in-process stand-in for the processor.
//!
//! A real HTTP server plays the Cregis API so the full client stack (signing, transport, response normalization) is
//! exercised, not just the orchestration logic.

use std::{
    net::TcpListener,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
        Mutex,
    },
};

use actix_web::{http::StatusCode, post, test, web, App, HttpResponse, HttpServer};
use serde_json::{json, Value};

use cregis_payment_engine::{
    order_types::{meta, Order, OrderStatus},
    stores::MemoryOrderStore,
    traits::{OrderStore, Storefront},
    GatewayOptions,
    PaymentGateway,
    PaymentResult,
};

use super::mocks::fixtures::{cregis_api, sample_order};
use crate::routes::{CheckoutRoute, CheckoutStatusRoute};

const CHECKOUT_URL: &str = "https://pay.example.com/cr-1042";

#[post("/api/v2/checkout")]
async fn processor_checkout_ok(body: web::Json<Value>) -> HttpResponse {
    if body.get("sign").and_then(Value::as_str).is_none() {
        return HttpResponse::Ok().json(json!({"code": "40001", "msg": "Missing signature"}));
    }
    HttpResponse::Ok().json(json!({
        "code": "00000",
        "msg": "success",
        "data": {
            "cregis_id": "cr-1042",
            "checkout_url": CHECKOUT_URL,
            "created_time": "1700000000000",
            "expire_time": "1700003600000"
        }
    }))
}

#[post("/api/v2/checkout/query")]
async fn processor_query_ok(_body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Ok()
        .json(json!({"code": "00000", "msg": "success", "data": {"status": "paid", "order_amount": "125.50"}}))
}

#[post("/api/v2/checkout")]
async fn processor_checkout_down() -> HttpResponse {
    HttpResponse::InternalServerError().body("upstream exploded")
}

/// Spawn the stand-in processor on a random local port and return its base URL.
fn spawn_processor(healthy: bool) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    let srv = HttpServer::new(move || {
        let app = App::new();
        if healthy {
            app.service(processor_checkout_ok).service(processor_query_ok)
        } else {
            app.service(processor_checkout_down)
        }
    })
    .listen(listener)?
    .workers(1)
    .disable_signals()
    .run();
    actix_web::rt::spawn(srv);
    Ok(format!("http://127.0.0.1:{port}"))
}

#[derive(Clone, Default)]
struct RecordingStorefront {
    notices: Arc<Mutex<Vec<String>>>,
    cart_cleared: Arc<AtomicBool>,
}

impl RecordingStorefront {
    fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    fn cart_cleared(&self) -> bool {
        self.cart_cleared.load(Ordering::SeqCst)
    }
}

impl Storefront for RecordingStorefront {
    fn webhook_url(&self) -> String {
        "https://shop.example.com/webhook/cregis".to_string()
    }

    fn return_url(&self, order: &Order) -> String {
        format!("https://shop.example.com/thanks/{}", order.id)
    }

    fn checkout_url(&self) -> String {
        "https://shop.example.com/checkout".to_string()
    }

    async fn error_notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    async fn clear_cart(&self) {
        self.cart_cleared.store(true, Ordering::SeqCst);
    }
}

fn gateway_against(
    api_url: &str,
    store: MemoryOrderStore,
    shopfront: RecordingStorefront,
) -> PaymentGateway<MemoryOrderStore, RecordingStorefront> {
    PaymentGateway::new(store, shopfront, cregis_api(api_url), GatewayOptions::default())
}

#[actix_web::test]
async fn successful_checkout_redirects_and_marks_the_order_pending() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let url = spawn_processor(true)?;
    let store = MemoryOrderStore::new();
    store.upsert_order(sample_order(42, OrderStatus::Failed));
    let shopfront = RecordingStorefront::default();
    let gateway = gateway_against(&url, store.clone(), shopfront.clone());

    let result = gateway.process_payment(42).await;

    assert_eq!(result, PaymentResult::Success { redirect: CHECKOUT_URL.to_string() });
    assert_eq!(store.order(42).unwrap().status, OrderStatus::Pending);
    assert_eq!(store.meta(42, meta::CREGIS_ID).as_deref(), Some("cr-1042"));
    assert_eq!(store.meta(42, meta::CHECKOUT_URL).as_deref(), Some(CHECKOUT_URL));
    assert_eq!(store.meta(42, meta::CREATED_TIME).as_deref(), Some("1700000000000"));
    assert!(store.notes(42).iter().any(|n| n.contains("Awaiting cryptocurrency payment")));
    assert!(shopfront.cart_cleared());
    assert!(shopfront.notices().is_empty());
    Ok(())
}

#[actix_web::test]
async fn processor_failures_leave_the_order_untouched_and_notify_the_customer() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let url = spawn_processor(false)?;
    let store = MemoryOrderStore::new();
    store.upsert_order(sample_order(42, OrderStatus::Failed));
    let shopfront = RecordingStorefront::default();
    let gateway = gateway_against(&url, store.clone(), shopfront.clone());

    let result = gateway.process_payment(42).await;

    assert_eq!(result, PaymentResult::Failure);
    assert_eq!(store.order(42).unwrap().status, OrderStatus::Failed);
    assert_eq!(store.meta(42, meta::CREGIS_ID), None);
    assert!(!shopfront.cart_cleared());
    assert_eq!(shopfront.notices(), vec!["Failed to create payment".to_string()]);
    Ok(())
}

#[actix_web::test]
async fn checkout_route_returns_the_redirect_json() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let url = spawn_processor(true)?;
    let store = MemoryOrderStore::new();
    store.upsert_order(sample_order(42, OrderStatus::Failed));
    let gateway = gateway_against(&url, store, RecordingStorefront::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(gateway))
            .service(CheckoutRoute::<MemoryOrderStore, RecordingStorefront>::new()),
    )
    .await;

    let req = test::TestRequest::post().uri("/checkout/42").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({"result": "success", "redirect": CHECKOUT_URL}));
    Ok(())
}

#[actix_web::test]
async fn checkout_status_prefers_the_stored_reference() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let url = spawn_processor(true)?;
    let store = MemoryOrderStore::new();
    store.upsert_order(sample_order(42, OrderStatus::Pending));
    let order = store.order(42).unwrap();
    store.write_meta(&order, meta::CREGIS_ID, "cr-1042").await.unwrap();
    let gateway = gateway_against(&url, store, RecordingStorefront::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(gateway))
            .service(CheckoutStatusRoute::<MemoryOrderStore, RecordingStorefront>::new()),
    )
    .await;

    let req = test::TestRequest::get().uri("/checkout/status/42").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "paid");

    let req = test::TestRequest::get().uri("/checkout/status/999").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
