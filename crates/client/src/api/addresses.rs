//! Shipping address endpoints under `/addresses`.

use serde_json::Value;
use teamall_core::{AddressId, Envelope};

use crate::error::Result;
use crate::gateway::{ApiRequest, RequestGateway};

#[derive(Clone)]
pub struct AddressesApi {
    gateway: RequestGateway,
}

impl AddressesApi {
    #[must_use]
    pub const fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn list(&self) -> Result<Envelope> {
        self.gateway.send(ApiRequest::get("/addresses")).await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn add(&self, address: &Value) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::post("/addresses").json(address))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn update(&self, id: AddressId, address: &Value) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::put(format!("/addresses/{id}")).json(address))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn delete(&self, id: AddressId) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::delete(format!("/addresses/{id}")))
            .await
    }

    /// Make `id` the default shipping address.
    ///
    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn set_default(&self, id: AddressId) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::put(format!("/addresses/{id}/default")))
            .await
    }
}
