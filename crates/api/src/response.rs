//! Response shapes shared by the resource handlers.
//!
//! Resource endpoints answer with `{ "data": ... }`. The auth and admin
//! endpoints return their payloads bare.

use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use hearth_core::types::DbId;

/// Prefix of every resource URL, matching where `api_routes` is nested.
pub const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `201 Created` with the enveloped resource and a `Location` header
/// pointing at where it can be fetched.
#[derive(Debug)]
pub struct Created<T: Serialize> {
    pub location: String,
    pub data: T,
}

impl<T: Serialize> Created<T> {
    /// `collection` is the path segment under [`API_PREFIX`], e.g. `spaces`.
    pub fn at(collection: &str, id: DbId, data: T) -> Self {
        Self {
            location: format!("{API_PREFIX}/{collection}/{id}"),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response =
            (StatusCode::CREATED, Json(DataResponse { data: self.data })).into_response();
        match HeaderValue::try_from(self.location) {
            Ok(location) => {
                response.headers_mut().insert(LOCATION, location);
            }
            Err(e) => tracing::warn!(error = %e, "Skipping unrepresentable Location header"),
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_sets_status_and_location() {
        let response = Created::at("spaces", 12, serde_json::json!({ "id": 12 })).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[LOCATION], "/api/v1/spaces/12");
    }
}
