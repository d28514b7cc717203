use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::db::{PageRequest, QUESTIONS_PER_PAGE};
use crate::server::error::ApiError;

/// JSON body decoded regardless of `Content-Type`. A missing body is
/// unprocessable, a body that does not match `T` is a bad request.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Unprocessable(rejection.body_text()))?;
        if bytes.is_empty() {
            return Err(ApiError::Unprocessable("request body is empty".to_owned()));
        }
        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|error| ApiError::BadRequest(error.to_string()))
    }
}

#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct PathId<T>(pub T);

#[derive(Deserialize)]
struct PageParams {
    page: Option<u64>,
}

/// `?page=N`, 1-based, defaulting to the first page.
pub struct PageQuery(pub PageRequest);

impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PageParams>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        match params.page.unwrap_or(1) {
            0 => Err(ApiError::BadRequest("page numbers start at 1".to_owned())),
            number => Ok(PageQuery(PageRequest::new(number, QUESTIONS_PER_PAGE))),
        }
    }
}
