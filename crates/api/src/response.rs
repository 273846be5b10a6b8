use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;

pub const CONTENT_TYPE: &str = "application/json;charset=UTF-8";

pub type ApiResult = Result<Response, ApiError>;

/// 原样写出的文本响应体
pub fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        Body::from(body.into()),
    )
        .into_response()
}

pub fn json<T: Serialize>(value: &T) -> ApiResult {
    let body = serde_json::to_vec(value)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        Body::from(body),
    )
        .into_response())
}
