use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;

use cregis_payment_engine::{
    stores::MemoryOrderStore,
    traits::{OrderStore, Storefront},
    OrderReconciler,
    PaymentGateway,
};
use cregis_tools::CregisApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{health, CheckoutRoute, CheckoutStatusRoute, CregisWebhookRoute},
    storefront::StandaloneStorefront,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    warn!("No commerce backend is wired in. Using the in-memory order store; orders will not survive a restart.");
    let store = MemoryOrderStore::new();
    let base_url = format!("http://{}:{}", config.host, config.port);
    let shopfront = StandaloneStorefront::new(&base_url);
    let srv = create_server_instance(config, store, shopfront)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance<B, S>(config: ServerConfig, store: B, shopfront: S) -> Result<Server, ServerError>
where
    B: OrderStore + Clone + Send + 'static,
    S: Storefront + Clone + Send + 'static,
{
    let api = CregisApi::new(config.cregis.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let debug = config.cregis.debug;
    let options = config.gateway.gateway_options();
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let reconciler = OrderReconciler::new(store.clone(), debug);
        let gateway = PaymentGateway::new(store.clone(), shopfront.clone(), api.clone(), options.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cpg::access_log"))
            .app_data(web::Data::new(api.clone()))
            .app_data(web::Data::new(reconciler))
            .app_data(web::Data::new(gateway))
            .service(health)
            .service(CregisWebhookRoute::<B>::new())
            .service(CheckoutRoute::<B, S>::new())
            .service(CheckoutStatusRoute::<B, S>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
