// HTTP error body shared by every non-2xx response this service produces.
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::collections::HashMap;

/// Uniform error payload: numeric status, human-readable message, the
/// request path, and the query parameters as name -> values.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub status: u16,
    pub message: String,
    pub url: String,
    pub params: HashMap<String, Vec<String>>,
}

impl ErrorInfo {
    pub fn new(status: StatusCode, message: impl Into<String>, uri: &Uri) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            url: uri.path().to_string(),
            params: query_params(uri.query()),
        }
    }
}

impl IntoResponse for ErrorInfo {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

fn query_params(query: Option<&str>) -> HashMap<String, Vec<String>> {
    let mut params: HashMap<String, Vec<String>> = HashMap::new();
    if let Some(query) = query {
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.entry(name.into_owned()).or_default().push(value.into_owned());
        }
    }
    params
}
