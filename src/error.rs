//! API error type shared by the resource handlers.
//!
//! Every failure is scoped to the request that produced it. Store failures are
//! logged here and surfaced with a generic message; nothing is retried.

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// A single entry of a `{"errors": [...]}` body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'static str>,
}

impl FieldError {
    pub fn body_field(param: &str, msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
            param: Some(param.to_string()),
            location: Some("body"),
        }
    }

    pub fn message(msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
            param: None,
            location: None,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 with an `errors` array
    Validation(Vec<FieldError>),
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    /// Upstream store or service failure
    Internal(anyhow::Error),
}

impl ApiError {
    /// 400 carrying one message-only entry in the `errors` array.
    pub fn rejected(msg: &str) -> Self {
        ApiError::Validation(vec![FieldError::message(msg)])
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

/// Body rejections keep the JSON error shape. A body that parses but has a
/// field of the wrong type is reported like any other validation failure.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                ApiError::Validation(vec![FieldError::message(&err.body_text())])
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// `Json` extractor whose rejection is an [`ApiError`]
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::BadRequest(msg) => msg_response(StatusCode::BAD_REQUEST, &msg),
            ApiError::Unauthorized(msg) => msg_response(StatusCode::UNAUTHORIZED, &msg),
            ApiError::NotFound(msg) => msg_response(StatusCode::NOT_FOUND, &msg),
            ApiError::Internal(err) => {
                error!("Request failed: {:#}", err);
                msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
        }
    }
}

/// `{"msg": ...}` with the given status.
pub fn msg_response(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "msg": msg }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err = anyhow::anyhow!("disk full");
        let api_err: ApiError = err.into();

        match api_err {
            ApiError::Internal(_) => (),
            _ => panic!("Expected Internal error"),
        }
    }

    #[test]
    fn test_api_error_statuses() {
        assert_eq!(
            ApiError::rejected("Invalid Credentials").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("User unauthorized".into())
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("Post not found".into())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_field_error_serialization() {
        let with_param = serde_json::to_value(FieldError::body_field("email", "bad")).unwrap();
        assert_eq!(
            with_param,
            json!({ "msg": "bad", "param": "email", "location": "body" })
        );

        let bare = serde_json::to_value(FieldError::message("Invalid Credentials")).unwrap();
        assert_eq!(bare, json!({ "msg": "Invalid Credentials" }));
    }
}
