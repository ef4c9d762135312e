use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{json, Value};

pub const STARTED_MESSAGE: &str = "Server start requested.";
pub const ALREADY_RUNNING_MESSAGE: &str = "Server is already running or starting.";

/// Desired count requested when the service is found scaled to zero.
pub const RUNNING_DESIRED_COUNT: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvocationOutcome {
    Started,
    AlreadyRunning,
}

impl InvocationOutcome {
    pub fn from_desired_count(desired_count: u32) -> Self {
        if desired_count == 0 {
            Self::Started
        } else {
            Self::AlreadyRunning
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::AlreadyRunning => "already_running",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Started => STARTED_MESSAGE,
            Self::AlreadyRunning => ALREADY_RUNNING_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusBody {
    pub status: InvocationOutcome,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DirectResponse {
    pub outcome: InvocationOutcome,
    pub message: String,
}

impl From<InvocationOutcome> for DirectResponse {
    fn from(outcome: InvocationOutcome) -> Self {
        Self {
            outcome,
            message: outcome.message().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum InvocationResponse {
    Http(ApiGatewayResponse),
    Direct(DirectResponse),
}

impl InvocationResponse {
    pub fn for_outcome(outcome: InvocationOutcome, http: bool) -> Result<Self, serde_json::Error> {
        if http {
            status_response(outcome).map(Self::Http)
        } else {
            Ok(Self::Direct(outcome.into()))
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

pub fn status_response(outcome: InvocationOutcome) -> Result<ApiGatewayResponse, serde_json::Error> {
    let body = StatusBody {
        status: outcome,
        message: outcome.message().to_string(),
    };
    success_response(200, &body)
}

/// Content-Type only. Cross-origin headers come from the Function URL CORS
/// configuration and would be duplicated if sent here too.
pub fn response_headers() -> Value {
    json!({"Content-Type": "application/json"})
}

fn success_response(
    status_code: u16,
    payload: &impl Serialize,
) -> Result<ApiGatewayResponse, serde_json::Error> {
    Ok(ApiGatewayResponse {
        status_code,
        headers: response_headers(),
        body: to_spaced_json(payload)?,
    })
}

/// Serializes on one line with `", "` and `": "` separators.
pub fn to_spaced_json(value: &impl Serialize) -> Result<String, serde_json::Error> {
    let mut buffer = Vec::with_capacity(64);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, SpacedFormatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}
