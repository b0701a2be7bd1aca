//! Response envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::observability::Event;

use super::errors::ApiResult;

/// `{"statusCode": .., "body": ..}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl ApiResponse {
    /// 200 with the JSON-serialized result
    pub fn ok(data: &Value) -> Self {
        Self {
            status_code: 200,
            body: data.to_string(),
        }
    }

    /// Error status with the message as body
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            body: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::json!({ "statusCode": self.status_code, "body": self.body }).to_string()
    }
}

/// Map an operation outcome onto the response envelope
pub fn respond(result: ApiResult<Value>) -> ApiResponse {
    match result {
        Ok(data) => {
            info!(event = %Event::RequestHandled, status = 200);
            ApiResponse::ok(&data)
        }
        Err(err) => {
            warn!(
                event = %Event::RequestFailed,
                status = err.status_code(),
                kind = %err.kind(),
                reason = %err.message(),
            );
            ApiResponse::error(err.status_code(), err.message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let resp = respond(Ok(json!({"id": "1"})));
        assert_eq!(resp.status_code, 200);
        assert_eq!(serde_json::from_str::<Value>(&resp.body).unwrap(), json!({"id": "1"}));
    }

    #[test]
    fn test_error_envelope() {
        let resp = respond(Err(ApiError::invalid_request("Missing request body")));
        assert_eq!(resp.status_code, 500);
        assert_eq!(resp.body, "Missing request body");
    }

    #[test]
    fn test_serialized_field_names() {
        let json: Value = serde_json::from_str(&ApiResponse::ok(&json!([])).to_json()).unwrap();
        assert_eq!(json, json!({"statusCode": 200, "body": "[]"}));

        let via_serde = serde_json::to_value(ApiResponse::error(500, "x")).unwrap();
        assert_eq!(via_serde, json!({"statusCode": 500, "body": "x"}));
    }
}
