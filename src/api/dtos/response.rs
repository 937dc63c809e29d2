use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

/// Envelope every endpoint answers with, `code` mirrors the http status
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub msg: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new<M: Into<String>>(status: StatusCode, msg: M, data: Option<T>) -> Self {
        Self {
            code: status.as_u16(),
            msg: msg.into(),
            data,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        HttpResponse::build(status).json(self)
    }
}

/// 200 with a payload
pub fn ok<T: Serialize, M: Into<String>>(msg: M, data: T) -> HttpResponse {
    ApiResponse::new(StatusCode::OK, msg, Some(data)).into_response()
}

/// 200 without a payload
pub fn ok_empty<M: Into<String>>(msg: M) -> HttpResponse {
    ApiResponse::<()>::new(StatusCode::OK, msg, None).into_response()
}

/// 201 with the created resource
pub fn created<T: Serialize, M: Into<String>>(msg: M, data: T) -> HttpResponse {
    ApiResponse::new(StatusCode::CREATED, msg, Some(data)).into_response()
}
