use actix_web::{body::BoxBody, error::BlockingError, http, HttpResponse, ResponseError};
use derive_more::Display;
use diesel::result::Error as DBError;
use std::convert::From;

use super::dtos::response::ApiResponse;

#[derive(Debug, Display, PartialEq, Eq)]
pub enum TodoApiError {
    #[display(fmt = "Internal Server Error")]
    InternalServerError,

    #[display(fmt = "{}", _0)]
    BadRequest(String),

    #[display(fmt = "Database Connection Error")]
    DatabaseConnectionError,

    #[display(fmt = "{} Not Found", _0)]
    NotFound(String),
}

impl TodoApiError {
    pub fn to_response(&self) -> HttpResponse {
        self.error_response()
    }
}

impl std::error::Error for TodoApiError {}

impl ResponseError for TodoApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            TodoApiError::BadRequest(_) => http::StatusCode::BAD_REQUEST,
            TodoApiError::NotFound(_) => http::StatusCode::NOT_FOUND,
            TodoApiError::InternalServerError | TodoApiError::DatabaseConnectionError => {
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();

        HttpResponse::build(status).json(ApiResponse::<()>::new(status, self.to_string(), None))
    }
}

impl From<r2d2::Error> for TodoApiError {
    fn from(err: r2d2::Error) -> Self {
        log::error!("Could not check out a database connection: {}", err);
        TodoApiError::DatabaseConnectionError
    }
}

impl From<BlockingError> for TodoApiError {
    fn from(err: BlockingError) -> Self {
        log::error!("Blocking task failed: {}", err);
        TodoApiError::InternalServerError
    }
}

impl From<DBError> for TodoApiError {
    fn from(error: DBError) -> Self {
        match error {
            DBError::NotFound => TodoApiError::NotFound(String::from("Todo")),
            e => {
                log::error!("Database error: {}", e);
                TodoApiError::InternalServerError
            }
        }
    }
}
