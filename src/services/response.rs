//! JSON response envelopes
//!
//! All successful responses share the shape `{"status": "success", "data": ...}`;
//! mutations without a payload return `{"status": "success"}`.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub data: T,
}

/// Wrap a payload in the success envelope
pub fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        status: "success",
        data,
    })
}

#[derive(Debug, Serialize)]
pub struct EmptyEnvelope {
    pub status: &'static str,
}

/// Success envelope without a data payload
pub fn success_empty() -> Json<EmptyEnvelope> {
    Json(EmptyEnvelope { status: "success" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let Json(envelope) = success(vec![1, 2, 3]);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_empty_shape() {
        let Json(envelope) = success_empty();
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, serde_json::json!({ "status": "success" }));
    }
}
