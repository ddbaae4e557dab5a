use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejections (bad syntax, wrong types, missing content type)
/// are reported as `{"error": ...}` with status 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
