//! Request extractors that answer with the API's error shape

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body extractor; rejections become `{"detail": ...}` responses with
/// the status axum would have used (415, 400 or 422)
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
