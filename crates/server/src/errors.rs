use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::ServiceError;
use tracing::error;

/// Error returned by every handler; rendered as `{"error": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub missing: Vec<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), missing: Vec::new() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation { message, missing } => Self { status: StatusCode::BAD_REQUEST, message, missing },
            ServiceError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, message),
            ServiceError::Persistence(detail) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("persistence error: {detail}"))
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        }
        let mut body = serde_json::json!({ "error": self.message });
        if !self.missing.is_empty() {
            body["missing"] = serde_json::json!(self.missing);
        }
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status_codes() {
        let e: JsonApiError = ServiceError::missing_fields("Faltan datos en el producto.", vec!["stock".into()]).into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.missing, vec!["stock"]);

        let e: JsonApiError = ServiceError::not_found("Producto no encontrado.").into();
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        assert_eq!(e.message, "Producto no encontrado.");

        let e: JsonApiError = ServiceError::Persistence("disk full".into()).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
