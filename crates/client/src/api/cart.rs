//! Server-side cart endpoints under `/cart`.
//!
//! Independent of the local [`CartState`](crate::cart::CartState); the
//! backend keeps its own copy keyed by cart line id.

use std::num::NonZeroU32;

use serde_json::{Value, json};
use teamall_core::{CartLineId, Envelope, ProductId};

use crate::error::Result;
use crate::gateway::{ApiRequest, RequestGateway};

#[derive(Clone)]
pub struct CartApi {
    gateway: RequestGateway,
}

impl CartApi {
    #[must_use]
    pub const fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn list(&self) -> Result<Envelope<Vec<Value>>> {
        self.gateway.send_as(ApiRequest::get("/cart")).await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn add(&self, product_id: ProductId, quantity: NonZeroU32) -> Result<Envelope> {
        let body = json!({ "productId": product_id, "quantity": quantity.get() });
        self.gateway.send(ApiRequest::post("/cart").json(&body)).await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn update_quantity(&self, id: CartLineId, quantity: NonZeroU32) -> Result<Envelope> {
        let request = ApiRequest::put(format!("/cart/{id}/quantity")).query("quantity", quantity);
        self.gateway.send(request).await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn remove(&self, id: CartLineId) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::delete(format!("/cart/{id}")))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn set_selected(&self, id: CartLineId, selected: bool) -> Result<Envelope> {
        let request = ApiRequest::put(format!("/cart/{id}/selected")).query("selected", selected);
        self.gateway.send(request).await
    }
}
