//! Wire types exchanged with the proxy runtime.
//!
//! Every invocation arrives as one [`InvocationEnvelope`] on the input stream
//! and is answered by exactly one [`OutputEnvelope`] on the output stream.
//! Field names follow the gateway's JSON shape exactly.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer, Serialize};

/// One decoded unit of input: the proxied request plus its invocation context.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationEnvelope {
    /// The proxied HTTP request.
    #[serde(rename = "event")]
    pub request: ProxyRequest,
    /// Runtime metadata describing this invocation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub context: InvocationContext,
}

/// The gateway's representation of an inbound HTTP request.
///
/// Absent mappings are frequently sent as JSON `null`; they decode as empty
/// maps so handlers never need to distinguish the two.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    /// Resource pattern the gateway matched, for example `/{proxy+}`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource: String,
    /// Request path relative to the stage.
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    /// HTTP method token.
    #[serde(default, deserialize_with = "null_as_default")]
    pub http_method: String,
    /// Request headers, keys case-preserved as received.
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, String>,
    /// Decoded query-string parameters.
    #[serde(default, deserialize_with = "null_as_default")]
    pub query_string_parameters: BTreeMap<String, String>,
    /// Path parameters extracted by the gateway's resource pattern.
    #[serde(default, deserialize_with = "null_as_default")]
    pub path_parameters: BTreeMap<String, String>,
    /// Stage variables configured on the deployment.
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_variables: BTreeMap<String, String>,
    /// Gateway request metadata.
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_context: RequestContext,
    /// Request body as text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    /// Whether `body` carries base64-encoded bytes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_base64_encoded: bool,
}

/// Gateway-side metadata about a proxied request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Account that owns the gateway.
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_id: String,
    /// Gateway identifier of the matched resource.
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_id: String,
    /// Deployment stage that received the request.
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage: String,
    /// Gateway-assigned request identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_id: String,
    /// Caller identity attributes. The gateway sends `null` for unknown ones.
    #[serde(default, deserialize_with = "null_as_default")]
    pub identity: BTreeMap<String, Option<String>>,
    /// Resource path template the gateway matched.
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_path: String,
    /// Method the gateway recorded for the request.
    #[serde(default, deserialize_with = "null_as_default")]
    pub http_method: String,
    /// Identifier of the API the request was made to.
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_id: String,
}

/// Runtime metadata for one invocation.
///
/// Attached to every translated request and retrievable with
/// [`invocation_context`](crate::request::invocation_context).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationContext {
    /// Identifier of this invocation.
    #[serde(rename = "awsRequestId", default, deserialize_with = "null_as_default")]
    pub aws_request_id: String,
    /// Name of the function being invoked.
    #[serde(rename = "functionName", default, deserialize_with = "null_as_default")]
    pub function_name: String,
    /// Version of the function being invoked.
    #[serde(rename = "functionVersion", default, deserialize_with = "null_as_default")]
    pub function_version: String,
    /// Legacy invocation identifier.
    #[serde(rename = "invokeid", default, deserialize_with = "null_as_default")]
    pub invoke_id: String,
    /// Whether the invoked version is the default one.
    #[serde(
        rename = "isDefaultFunctionVersion",
        default,
        deserialize_with = "null_as_default"
    )]
    pub is_default_function_version: bool,
    /// Log group receiving the function's output.
    #[serde(rename = "logGroupName", default, deserialize_with = "null_as_default")]
    pub log_group_name: String,
    /// Log stream receiving the function's output.
    #[serde(rename = "logStreamName", default, deserialize_with = "null_as_default")]
    pub log_stream_name: String,
    /// Memory limit in megabytes. Accepted as a JSON string or number.
    #[serde(rename = "memoryLimitInMB", default, deserialize_with = "string_or_number")]
    pub memory_limit_in_mb: String,
}

/// The response written back to the runtime for one invocation.
///
/// Error envelopes use status 500 with the error text as body and no headers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputEnvelope {
    /// HTTP status of the response.
    pub status_code: u16,
    /// Response headers, one value per canonical name.
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub headers: BTreeMap<String, String>,
    /// Response body as text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
}

impl OutputEnvelope {
    /// Status code used for every error-shaped envelope.
    pub const ERROR_STATUS: u16 = 500;

    /// Build the error-shaped envelope for `error`.
    ///
    /// ```
    /// use lambdaframe::envelope::OutputEnvelope;
    ///
    /// let out = OutputEnvelope::from_error(&"boom");
    /// assert_eq!(out.status_code, 500);
    /// assert_eq!(out.body, "boom");
    /// assert!(out.headers.is_empty());
    /// ```
    #[must_use]
    pub fn from_error(error: &dyn fmt::Display) -> Self {
        Self {
            status_code: Self::ERROR_STATUS,
            headers: BTreeMap::new(),
            body: error.to_string(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) => text,
        Some(Raw::Number(number)) => number.to_string(),
        None => String::new(),
    })
}
