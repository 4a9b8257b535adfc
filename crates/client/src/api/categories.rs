//! Category endpoints under `/categories`.

use serde_json::Value;
use teamall_core::{CategoryId, Envelope};

use crate::error::Result;
use crate::gateway::{ApiRequest, RequestGateway};

#[derive(Clone)]
pub struct CategoriesApi {
    gateway: RequestGateway,
}

impl CategoriesApi {
    #[must_use]
    pub const fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn list(&self) -> Result<Envelope> {
        self.gateway.send(ApiRequest::get("/categories")).await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn get(&self, id: CategoryId) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::get(format!("/categories/{id}")))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn create(&self, category: &Value) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::post("/categories").json(category))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn update(&self, id: CategoryId, category: &Value) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::put(format!("/categories/{id}")).json(category))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn delete(&self, id: CategoryId) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::delete(format!("/categories/{id}")))
            .await
    }
}
