//! Request extractors whose rejections render as [`ApiError`] bodies instead
//! of axum's plain-text replies.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body extractor. Any decode failure becomes `ApiError::MalformedRequest`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let detail = rejection.body_text();
                tracing::debug!(status = %rejection.status(), detail, "rejected request body");
                ApiError::MalformedRequest(detail)
            })?;
        Ok(ApiJson(value))
    }
}

/// Path parameter extractor with the same rejection handling as [`ApiJson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                let detail = rejection.body_text();
                tracing::debug!(detail, "rejected path parameters");
                ApiError::MalformedRequest(detail)
            })?;
        Ok(ApiPath(value))
    }
}
