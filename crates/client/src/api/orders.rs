//! Order endpoints under `/orders`.

use serde_json::Value;
use teamall_core::{Envelope, OrderId, OrderStatus};
use tracing::instrument;

use crate::error::Result;
use crate::gateway::{ApiRequest, RequestGateway};

/// Payment method used when the caller does not choose one.
pub const DEFAULT_PAYMENT_METHOD: &str = "ALIPAY";

#[derive(Clone)]
pub struct OrdersApi {
    gateway: RequestGateway,
}

impl OrdersApi {
    #[must_use]
    pub const fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn list(&self) -> Result<Envelope> {
        self.gateway.send(ApiRequest::get("/orders")).await
    }

    /// Search with a JSON filter body (status, date range, paging).
    ///
    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn search(&self, filter: &Value) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::post("/orders/search").json(filter))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn get(&self, id: OrderId) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::get(format!("/orders/{id}")))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn create(&self, order: &Value) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::post("/orders").json(order))
            .await
    }

    /// Pay for an order. `None` pays with [`DEFAULT_PAYMENT_METHOD`].
    ///
    /// # Errors
    ///
    /// Any gateway failure.
    #[instrument(skip(self))]
    pub async fn pay(&self, id: OrderId, payment_method: Option<&str>) -> Result<Envelope> {
        let method = payment_method.unwrap_or(DEFAULT_PAYMENT_METHOD);
        let request = ApiRequest::post(format!("/orders/{id}/pay")).query("paymentMethod", method);
        self.gateway.send(request).await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn cancel(&self, id: OrderId) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::post(format!("/orders/{id}/cancel")))
            .await
    }

    /// Confirm receipt.
    ///
    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn complete(&self, id: OrderId) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::post(format!("/orders/{id}/complete")))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn delete(&self, id: OrderId) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::delete(format!("/orders/{id}")))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Envelope> {
        let request = ApiRequest::put(format!("/orders/{id}/status")).query("status", status);
        self.gateway.send(request).await
    }
}
