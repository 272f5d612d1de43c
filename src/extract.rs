//! Request extractors shared by the handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::{async_trait, Json};

use crate::error::ApiError;

/// `axum::Json` with its rejection mapped into the standard error envelope,
/// so malformed or missing bodies answer with the same `{"message": ...}`
/// shape as every other failure.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}
