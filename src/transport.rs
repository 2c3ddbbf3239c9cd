//! The transport seam
//!
//! Iterators never talk HTTP themselves. They hand an endpoint slug and the
//! merged query parameters to a [`Transport`], which returns either a decoded
//! [`ResponseEnvelope`] or a normalized [`ApiError`].

use crate::error::ApiError;
use crate::types::{ResponseEnvelope, StringMap};
use async_trait::async_trait;
use std::sync::Arc;

/// Performs a single GET against the API
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `slug` with the given query parameters
    async fn get(
        &self,
        slug: &str,
        params: &StringMap,
    ) -> std::result::Result<ResponseEnvelope, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(
        &self,
        slug: &str,
        params: &StringMap,
    ) -> std::result::Result<ResponseEnvelope, ApiError> {
        (**self).get(slug, params).await
    }
}
