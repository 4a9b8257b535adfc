//! Catalog endpoints under `/products`.

use serde_json::Value;
use teamall_core::{Envelope, ProductId};

use crate::error::Result;
use crate::gateway::{ApiRequest, RequestGateway};

#[derive(Clone)]
pub struct ProductsApi {
    gateway: RequestGateway,
}

impl ProductsApi {
    #[must_use]
    pub const fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// List products. `params` is a JSON object of filters and paging
    /// (`page`, `size`, `categoryId`, ...), sent as query parameters.
    ///
    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn list(&self, params: &Value) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::get("/products").query_object(params))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn get(&self, id: ProductId) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::get(format!("/products/{id}")))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn create(&self, product: &Value) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::post("/products").json(product))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn update(&self, id: ProductId, product: &Value) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::put(format!("/products/{id}")).json(product))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn delete(&self, id: ProductId) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::delete(format!("/products/{id}")))
            .await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn search(&self, keyword: &str) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::get("/products/search").query("keyword", keyword))
            .await
    }
}
