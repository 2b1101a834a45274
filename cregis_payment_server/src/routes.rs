//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two go into their own function;
//! keep the registration plumbing at the top of the module.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use serde_json::{Map, Value};

use cregis_payment_engine::{
    events::PaymentEvent,
    traits::{OrderStore, Storefront},
    GatewayError,
    OrderReconciler,
    PaymentGateway,
};
use cregis_tools::CregisApi;

use crate::errors::ServerError;

// actix-web cannot register generic handler functions directly, so store-generic routes are built with this macro.
// `route!(name => Method "/path" impl Bound1, Bound2)` emits a `NameRoute<T1, T2>` HttpServiceFactory that
// registers `name::<T1, T2>` at the path.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

//----------------------------------------------   Health  ----------------------------------------------------

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Webhook  ----------------------------------------------------

route!(cregis_webhook => Post "/webhook/cregis" impl OrderStore);
/// The processor's asynchronous notification endpoint.
///
/// The signature is checked over the raw payload before anything is deserialized into domain types. Responses follow
/// the processor's contract: 400 for bodies it should never have sent, 401 for signature failures, 200 with body
/// `success` for every recognized-or-ignored event, and 500 with body `Processing error` when applying a recognized
/// event fails.
pub async fn cregis_webhook<B>(
    body: web::Bytes,
    api: web::Data<CregisApi>,
    reconciler: web::Data<OrderReconciler<B>>,
) -> HttpResponse
where
    B: OrderStore,
{
    if body.is_empty() {
        warn!("Empty webhook payload received");
        return HttpResponse::BadRequest().body("Invalid payload");
    }
    let payload: Map<String, Value> = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Invalid JSON in webhook: {e}");
            return HttpResponse::BadRequest().body("Invalid JSON");
        },
    };
    if !api.verify_webhook_signature(&payload) {
        warn!("Invalid webhook signature");
        return HttpResponse::Unauthorized().body("Invalid signature");
    }
    let event: PaymentEvent = match serde_json::from_value(Value::Object(payload)) {
        Ok(event) => event,
        Err(e) => {
            warn!("Webhook payload has an unexpected shape: {e}");
            return HttpResponse::BadRequest().body("Invalid JSON");
        },
    };
    trace!("Webhook received: {} / {}", event.event_name, event.event_type);
    match reconciler.process_event(&event).await {
        Ok(()) => HttpResponse::Ok().body("success"),
        Err(e) => {
            error!("Webhook processing error: {e}");
            HttpResponse::InternalServerError().body("Processing error")
        },
    }
}

//----------------------------------------------   Checkout  ----------------------------------------------------

route!(checkout => Post "/checkout/{order_id}" impl OrderStore, Storefront);
/// Open a checkout order for the given store order and hand back the redirect target.
pub async fn checkout<B, S>(
    path: web::Path<i64>,
    gateway: web::Data<PaymentGateway<B, S>>,
) -> HttpResponse
where
    B: OrderStore,
    S: Storefront,
{
    let order_id = path.into_inner();
    debug!("POST checkout for order {order_id}");
    let result = gateway.process_payment(order_id).await;
    HttpResponse::Ok().json(result)
}

route!(checkout_status => Get "/checkout/status/{order_id}" impl OrderStore, Storefront);
/// The processor's current view of an order's payment state.
pub async fn checkout_status<B, S>(
    path: web::Path<i64>,
    gateway: web::Data<PaymentGateway<B, S>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore,
    S: Storefront,
{
    let order_id = path.into_inner();
    debug!("GET checkout status for order {order_id}");
    let data = gateway.payment_status(order_id).await.map_err(|e| match e {
        GatewayError::OrderNotFound(_) => ServerError::NoRecordFound(e.to_string()),
        other => ServerError::BackendError(other.to_string()),
    })?;
    Ok(HttpResponse::Ok().json(data))
}
