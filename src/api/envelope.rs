use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Numeric response codes carried alongside the HTTP status. Clients
/// switch on these rather than on status codes alone.
pub mod codes {
    pub const OK: u32 = 0;
    pub const INVALID_DATA: u32 = 3000;
    pub const INTERNAL_SERVER_ERROR: u32 = 6000;
    pub const NOT_FOUND: u32 = 6002;
    pub const CONFLICT: u32 = 6004;
}

/// Success body: `{code, message, data}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: u32,
    pub message: String,
    pub data: T,
}

pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    respond(StatusCode::OK, message, data)
}

pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    respond(StatusCode::CREATED, message, data)
}

fn respond<T: Serialize>(status: StatusCode, message: impl Into<String>, data: T) -> Response {
    let body = Envelope {
        code: codes::OK,
        message: message.into(),
        data,
    };
    (status, Json(body)).into_response()
}
