use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The parts of an invocation payload that decide how the caller is answered.
///
/// Scheduled and direct invocations carry arbitrary payloads; Function URL and
/// API Gateway invocations carry a `requestContext`. Only key presence is
/// inspected, so a marker present with a `null` value still counts. A
/// `requestContext` that is not a JSON object is read as absent and does not
/// hide a top-level `httpMethod`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InvocationEvent {
    #[serde(rename = "requestContext", default, deserialize_with = "object_only")]
    pub request_context: Option<RequestContext>,
    #[serde(rename = "httpMethod", default, deserialize_with = "present")]
    pub http_method: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestContext {
    #[serde(default, deserialize_with = "present")]
    pub http: Option<Value>,
    #[serde(rename = "httpMethod", default, deserialize_with = "present")]
    pub http_method: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedEvent {
    pub reason: String,
}

impl InvocationEvent {
    pub fn from_value(payload: &Value) -> Result<Self, UnrecognizedEvent> {
        if !payload.is_object() {
            return Err(UnrecognizedEvent {
                reason: format!("payload is {}, not an object", kind_of(payload)),
            });
        }

        Self::deserialize(payload).map_err(|error| UnrecognizedEvent {
            reason: error.to_string(),
        })
    }

    pub fn is_http(&self) -> bool {
        let context_marker = self
            .request_context
            .as_ref()
            .map(|context| context.http.is_some() || context.http_method.is_some())
            .unwrap_or(false);

        context_marker || self.http_method.is_some()
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn object_only<'de, D>(deserializer: D) -> Result<Option<RequestContext>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(fields) => RequestContext::deserialize(Value::Object(fields))
            .map(Some)
            .map_err(D::Error::custom),
        _ => Ok(None),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
