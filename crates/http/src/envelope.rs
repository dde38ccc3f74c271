//! Response envelope shared by every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// JSON body wrapper used by every response: a `status` discriminator plus
/// optional `message` and `data` members.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    pub fn success() -> Self {
        Self {
            status: "success",
            message: None,
            data: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: "fail",
            message: Some(message.into()),
            data: None,
        }
    }
}

/// A successful response: status code plus envelope body.
///
/// Built fluently by handlers, e.g.
/// `ApiResponse::created().message("...").data(json!({ "bookId": id }))`.
#[derive(Debug)]
pub struct ApiResponse {
    status_code: StatusCode,
    body: Envelope,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            status_code: StatusCode::OK,
            body: Envelope::success(),
        }
    }

    pub fn created() -> Self {
        Self {
            status_code: StatusCode::CREATED,
            body: Envelope::success(),
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.body.message = Some(message.into());
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.body.data = Some(data);
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status_code, Json(self.body)).into_response()
    }
}
