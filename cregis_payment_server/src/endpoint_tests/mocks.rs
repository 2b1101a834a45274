use mockall::mock;

use cregis_payment_engine::{
    order_types::{Order, OrderStatus},
    traits::{OrderStore, OrderStoreError},
};

mock! {
    pub OrderBackend {}
    impl OrderStore for OrderBackend {
        async fn find_by_order_number(&self, number: &str) -> Result<Option<Order>, OrderStoreError>;
        async fn find_by_order_key(&self, key: &str) -> Result<Option<Order>, OrderStoreError>;
        async fn find_by_internal_id(&self, id: i64) -> Result<Option<Order>, OrderStoreError>;
        async fn read_meta(&self, order: &Order, key: &str) -> Result<Option<String>, OrderStoreError>;
        async fn write_meta(&self, order: &Order, key: &str, value: &str) -> Result<(), OrderStoreError>;
        async fn save(&self, order: &Order) -> Result<(), OrderStoreError>;
        async fn set_status(&self, order: &Order, status: OrderStatus, note: &str) -> Result<(), OrderStoreError>;
        async fn mark_paid(&self, order: &Order, tx_ref: &str) -> Result<(), OrderStoreError>;
        async fn add_note(&self, order: &Order, note: &str) -> Result<(), OrderStoreError>;
    }
}

/// Shared test fixtures for the endpoint tests.
pub mod fixtures {
    use cpg_common::Secret;
    use cregis_payment_engine::order_types::{LineItem, Order, OrderStatus};
    use cregis_tools::{CregisApi, CregisConfig};

    pub const API_KEY: &str = "test-api-key";

    pub fn cregis_api(api_url: &str) -> CregisApi {
        let config = CregisConfig {
            api_url: api_url.to_string(),
            api_key: Secret::new(API_KEY.to_string()),
            pid: 1400,
            debug: false,
        };
        CregisApi::new(config).expect("Could not build test API client")
    }

    pub fn sample_order(id: i64, status: OrderStatus) -> Order {
        Order {
            id,
            order_number: format!("10{id:02}"),
            order_key: format!("wc_order_key_{id}"),
            status,
            total: "125.50".parse().unwrap(),
            currency: "USD".to_string(),
            customer_id: Some(7),
            billing_name: "Alex Doe".to_string(),
            billing_email: "alex@example.com".to_string(),
            line_items: vec![LineItem {
                product_id: 11,
                name: "Widget".to_string(),
                quantity: 2,
                total: 110.0,
            }],
            shipping_total: 10.0,
            tax_total: 5.5,
        }
    }
}
