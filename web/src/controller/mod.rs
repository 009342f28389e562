use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub(crate) mod health_check_controller;
pub(crate) mod oauth_controller;
pub(crate) mod page_controller;
pub(crate) mod protected_controller;

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self {
            status_code,
            data: Some(data),
        }
    }
}

/// `302 Found` redirect, the status browsers and the identity provider expect.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_serialize_api_response_with_some() {
        let response = ApiResponse::new(StatusCode::OK.into(), json!({ "sub": "user-1" }));
        let serialized = serde_json::to_string(&response).unwrap();

        // Compare as values: key order in the serialized string is not guaranteed.
        let deserialized_value: serde_json::Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(
            deserialized_value,
            json!({ "data": { "sub": "user-1" }, "status_code": 200 })
        );
    }

    #[tokio::test]
    async fn test_serialize_api_response_with_none() {
        let response: ApiResponse<()> = ApiResponse {
            status_code: StatusCode::NO_CONTENT.into(),
            data: None,
        };
        let serialized = serde_json::to_string(&response).unwrap();
        assert_eq!(serialized, r#"{"status_code":204}"#);
    }

    #[test]
    fn test_found_sets_location() {
        let response = found("/dashboard");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/dashboard"
        );
    }
}
