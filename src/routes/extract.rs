//! Request extractors whose rejections render as [`AppError`]
//!
//! axum's own `Json`, `Query` and `Path` reject malformed input with a
//! plain-text body; these wrappers report it as a 400 `{"error": ...}` like
//! every other invalid input.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts},
    Json,
};

use crate::error::{AppError, AppResult};

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Body of endpoints that also accept bodiless requests
///
/// A request without a JSON content type has no body; a JSON body that fails
/// to parse is still invalid input.
pub fn optional_json<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<Option<T>> {
    match body {
        Ok(Json(value)) => Ok(Some(value)),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(None),
        Err(rejection) => Err(rejection.into()),
    }
}
