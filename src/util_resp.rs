use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use hypertext::{Rendered, prelude::*};
use serde_json::{Value, json};

use crate::{brackets::BracketError, widgets::alert::ErrorAlert};

pub fn bad_request(html: Rendered<String>) -> StandardResponse {
    Err(FailureResponse::BadRequest(html))
}

pub fn success(html: Rendered<String>) -> StandardResponse {
    Ok(SuccessResponse::Success(html))
}

pub fn json_ok(value: Value) -> StandardResponse {
    Ok(SuccessResponse::Json(StatusCode::OK, value))
}

pub fn json_created(value: Value) -> StandardResponse {
    Ok(SuccessResponse::Json(StatusCode::CREATED, value))
}

pub fn json_err(status: StatusCode, msg: impl ToString) -> StandardResponse {
    Err(FailureResponse::Api(status, json!({ "error": msg.to_string() })))
}

pub type StandardResponse = Result<SuccessResponse, FailureResponse>;

pub enum SuccessResponse {
    Success(Rendered<String>),
    Json(StatusCode, Value),
}

impl IntoResponse for SuccessResponse {
    fn into_response(self) -> Response {
        match self {
            SuccessResponse::Success(html) => {
                Html(html.into_inner()).into_response()
            }
            SuccessResponse::Json(status, value) => {
                (status, Json(value)).into_response()
            }
        }
    }
}

#[derive(Debug)]
pub enum FailureResponse {
    BadRequest(Rendered<String>),
    NotFound(()),
    Conflict(Rendered<String>),
    ServerError(()),
    /// Error body for the JSON endpoints.
    Api(StatusCode, Value),
}

impl FailureResponse {
    /// Renders a bracket error as an HTML fragment.
    pub fn fragment(err: BracketError) -> Self {
        let msg = err.to_string();
        let html = maud! { ErrorAlert msg=(&msg); }.render();
        match err {
            BracketError::NotFound => FailureResponse::NotFound(()),
            BracketError::InvalidState(_) => FailureResponse::Conflict(html),
            BracketError::ConstraintViolation(_) => {
                FailureResponse::BadRequest(html)
            }
        }
    }

    /// Renders a bracket error as a JSON body.
    pub fn api(err: BracketError) -> Self {
        let status = match err {
            BracketError::NotFound => StatusCode::NOT_FOUND,
            BracketError::InvalidState(_) => StatusCode::CONFLICT,
            BracketError::ConstraintViolation(_) => StatusCode::BAD_REQUEST,
        };
        FailureResponse::Api(status, json!({ "error": err.to_string() }))
    }
}

impl From<diesel::result::Error> for FailureResponse {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => FailureResponse::NotFound(()),
            err => {
                tracing::error!("database error: {err}");
                FailureResponse::ServerError(())
            }
        }
    }
}

impl From<BracketError> for FailureResponse {
    fn from(err: BracketError) -> Self {
        FailureResponse::fragment(err)
    }
}

impl IntoResponse for FailureResponse {
    fn into_response(self) -> Response {
        match self {
            FailureResponse::BadRequest(html) => {
                (StatusCode::BAD_REQUEST, Html(html.into_inner()))
                    .into_response()
            }
            FailureResponse::NotFound(()) => {
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
            FailureResponse::Conflict(html) => {
                (StatusCode::CONFLICT, Html(html.into_inner())).into_response()
            }
            FailureResponse::ServerError(()) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                    .into_response()
            }
            FailureResponse::Api(status, value) => {
                (status, Json(value)).into_response()
            }
        }
    }
}
