//! API request types
//!
//! Requests arrive as gateway events:
//!
//! ```json
//! {"pathParameters": {"id": "..."}, "body": "{\"first_name\": \"Ada\"}"}
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{ApiError, ApiResult};

/// Record operation named by the route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Get,
    Post,
    Put,
    Delete,
    List,
    All,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Post => "post",
            Operation::Put => "put",
            Operation::Delete => "delete",
            Operation::List => "list",
            Operation::All => "all",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Operation::Get),
            "post" => Ok(Operation::Post),
            "put" => Ok(Operation::Put),
            "delete" => Ok(Operation::Delete),
            "list" => Ok(Operation::List),
            "all" => Ok(Operation::All),
            other => Err(ApiError::invalid_request(format!("Unknown operation: {}", other))),
        }
    }
}

/// Raw gateway event
#[derive(Debug, Default, Deserialize)]
struct GatewayEvent {
    #[serde(rename = "pathParameters", default)]
    path_parameters: Option<HashMap<String, Value>>,
    #[serde(default)]
    body: Option<Value>,
}

/// A request: the path id and the raw body, both optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiRequest {
    pub path_id: Option<String>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(path_id: Option<String>, body: Option<String>) -> Self {
        Self { path_id, body }
    }

    /// Build a request from a gateway event value.
    ///
    /// A body that is already JSON (rather than a string) is re-serialized.
    pub fn from_event(event: Value) -> ApiResult<Self> {
        let event: GatewayEvent = match event {
            Value::Null => GatewayEvent::default(),
            other => serde_json::from_value(other)
                .map_err(|e| ApiError::invalid_request(format!("Invalid event: {}", e)))?,
        };

        let path_id = event
            .path_parameters
            .and_then(|mut params| params.remove("id"))
            .and_then(|id| match id {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            });

        let body = match event.body {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };

        Ok(Self { path_id, body })
    }

    /// Parse a gateway event from JSON text
    pub fn from_event_json(json: &str) -> ApiResult<Self> {
        let event: Value = serde_json::from_str(json)
            .map_err(|e| ApiError::invalid_request(format!("Invalid JSON: {}", e)))?;
        Self::from_event(event)
    }

    /// The path id; required by get, put and delete
    pub fn require_id(&self) -> ApiResult<&str> {
        match self.path_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ApiError::invalid_request("Missing path parameter: id")),
        }
    }

    /// The body parsed as JSON; required by post and put
    pub fn json_body(&self) -> ApiResult<Value> {
        let body = self
            .body
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| ApiError::invalid_request("Missing request body"))?;

        serde_json::from_str(body)
            .map_err(|e| ApiError::invalid_request(format!("Invalid JSON body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;
    use serde_json::json;

    #[test]
    fn test_from_event_with_string_body() {
        let req = ApiRequest::from_event(json!({
            "pathParameters": {"id": "abc"},
            "body": "{\"first_name\": \"Ada\"}"
        }))
        .unwrap();

        assert_eq!(req.require_id().unwrap(), "abc");
        assert_eq!(req.json_body().unwrap(), json!({"first_name": "Ada"}));
    }

    #[test]
    fn test_from_event_with_null_parts() {
        let req = ApiRequest::from_event(json!({"pathParameters": null, "body": null})).unwrap();
        assert_eq!(req, ApiRequest::default());

        let req = ApiRequest::from_event(Value::Null).unwrap();
        assert!(req.require_id().is_err());
    }

    #[test]
    fn test_from_event_with_object_body() {
        let req = ApiRequest::from_event(json!({"body": {"a": 1}})).unwrap();
        assert_eq!(req.json_body().unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_missing_and_bad_body() {
        let req = ApiRequest::new(None, None);
        let err = req.json_body().unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::InvalidRequest);

        let req = ApiRequest::new(None, Some("{oops".into()));
        assert!(req.json_body().unwrap_err().message().starts_with("Invalid JSON body"));
    }

    #[test]
    fn test_operation_from_str() {
        assert_eq!("GET".parse::<Operation>().unwrap(), Operation::Get);
        assert_eq!("all".parse::<Operation>().unwrap(), Operation::All);
        assert!("patch".parse::<Operation>().is_err());
    }
}
