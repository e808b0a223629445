//! JSON-RPC 2.0 envelope used on the host/plugin channel
//!
//! Plain JSON-RPC without batching or notifications: every message on the
//! wire is either a request or the response to one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::CliError;

/// JSON-RPC version string
pub const JSONRPC_VERSION: &str = "2.0";

/// Request ID for JSON-RPC correlation
pub type RequestId = Value; // string | number | null

/// JSON-RPC request message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID for correlation
    pub id: RequestId,
    /// Method name being called
    pub method: String,
    /// Method parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC response message, carrying either a result or an error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID for correlation
    pub id: RequestId,
    /// Result of the method call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

/// Error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorObject {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request
    pub fn new<T: Serialize>(
        id: RequestId,
        method: impl Into<String>,
        params: Option<T>,
    ) -> Result<Self, serde_json::Error> {
        let params = match params {
            Some(p) => Some(serde_json::to_value(p)?),
            None => None,
        };

        Ok(Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        })
    }
}

impl JsonRpcResponse {
    /// Create a successful JSON-RPC response
    pub fn success<T: Serialize>(id: RequestId, result: T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(serde_json::to_value(result)?),
            error: None,
        })
    }

    /// Create an error JSON-RPC response
    pub fn error(id: RequestId, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(ErrorObject {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Build an error response from a crate error, choosing the JSON-RPC code
    pub fn from_error(id: RequestId, error: &CliError) -> Self {
        let code = match error {
            CliError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            CliError::InvalidParams(_) | CliError::Serialization(_) => error_codes::INVALID_PARAMS,
            _ => error_codes::INTERNAL_ERROR,
        };
        Self::error(id, code, error.to_string())
    }

    /// Turn the response into the decoded result or the carried error
    pub fn into_result<T: serde::de::DeserializeOwned>(self) -> Result<T, CliError> {
        if let Some(error) = self.error {
            return Err(match error.code {
                error_codes::METHOD_NOT_FOUND => CliError::MethodNotFound(error.message),
                error_codes::INVALID_PARAMS => CliError::InvalidParams(error.message),
                _ => CliError::Protocol(format!("{} (code {})", error.message, error.code)),
            });
        }

        let result = self
            .result
            .ok_or_else(|| CliError::protocol("Response carried neither result nor error"))?;
        Ok(serde_json::from_value(result)?)
    }
}

/// Standard JSON-RPC error codes
pub mod error_codes {
    /// Invalid JSON was received
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist / is not available
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameter(s)
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest::new(json!(1), "CliRpcCmd.CallCoreCommand", Some(["version"]))
            .unwrap();
        let text = serde_json::to_string(&request).unwrap();
        assert_eq!(
            text,
            r#"{"jsonrpc":"2.0","id":1,"method":"CliRpcCmd.CallCoreCommand","params":["version"]}"#
        );
    }

    #[test]
    fn test_success_response_decodes_result() {
        let response = JsonRpcResponse::success(json!(7), true).unwrap();
        assert!(response.error.is_none());
        let value: bool = response.into_result().unwrap();
        assert!(value);
    }

    #[test]
    fn test_error_response_maps_codes() {
        let response = JsonRpcResponse::from_error(
            json!(2),
            &CliError::MethodNotFound("CliRpcCmd.Nope".to_string()),
        );
        assert_eq!(
            response.error.as_ref().map(|e| e.code),
            Some(error_codes::METHOD_NOT_FOUND)
        );

        let decoded: Result<bool, _> = response.into_result();
        assert!(matches!(decoded, Err(CliError::MethodNotFound(_))));
    }

    #[test]
    fn test_response_without_result_is_protocol_error() {
        let response: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 3})).unwrap();
        let decoded: Result<bool, _> = response.into_result();
        assert!(matches!(decoded, Err(CliError::Protocol(_))));
    }
}
