//! Product review endpoints under `/reviews`.

use serde_json::Value;
use teamall_core::{Envelope, ProductId, ReviewId};

use crate::error::Result;
use crate::gateway::{ApiRequest, RequestGateway};

#[derive(Clone)]
pub struct ReviewsApi {
    gateway: RequestGateway,
}

impl ReviewsApi {
    #[must_use]
    pub const fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// Reviews of one product; `params` carries paging.
    ///
    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn for_product(&self, product_id: ProductId, params: &Value) -> Result<Envelope> {
        let request = ApiRequest::get(format!("/reviews/product/{product_id}")).query_object(params);
        self.gateway.send(request).await
    }

    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn create(&self, review: &Value) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::post("/reviews").json(review))
            .await
    }

    /// Reviews written by the signed-in user.
    ///
    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn mine(&self, params: &Value) -> Result<Envelope> {
        self.gateway
            .send(ApiRequest::get("/reviews/user").query_object(params))
            .await
    }

    /// Merchant reply to a review.
    ///
    /// # Errors
    ///
    /// Any gateway failure.
    pub async fn reply(&self, id: ReviewId, reply: &str) -> Result<Envelope> {
        let request = ApiRequest::post(format!("/reviews/{id}/reply")).query("reply", reply);
        self.gateway.send(request).await
    }
}
