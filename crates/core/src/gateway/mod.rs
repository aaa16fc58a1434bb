pub mod gemini;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::GatewayError, request::ModelPayload};

pub use gemini::GeminiGateway;

/// Remote model capability: one payload in, raw response text out.
///
/// Implementations issue exactly one call per invocation and never retry.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn invoke(&self, payload: &ModelPayload) -> Result<String, GatewayError>;
}

#[async_trait]
impl<G: ModelGateway + ?Sized> ModelGateway for Arc<G> {
    async fn invoke(&self, payload: &ModelPayload) -> Result<String, GatewayError> {
        (**self).invoke(payload).await
    }
}

#[async_trait]
impl<G: ModelGateway + ?Sized> ModelGateway for Box<G> {
    async fn invoke(&self, payload: &ModelPayload) -> Result<String, GatewayError> {
        (**self).invoke(payload).await
    }
}
