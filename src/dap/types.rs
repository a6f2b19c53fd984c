//! DAP message types
//!
//! Base protocol envelopes plus the custom command vocabulary spoken by the
//! CDF backend. See: https://microsoft.github.io/debug-adapter-protocol/specification

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::common::{Error, Result};

// === Base Protocol Messages ===

/// Base message type for DAP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProtocolMessage {
    Request(RequestMessage),
    Response(ResponseMessage),
    Event(EventMessage),
}

impl ProtocolMessage {
    /// Command of a request or response; events have none
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Request(r) => Some(&r.command),
            Self::Response(r) => Some(&r.command),
            Self::Event(_) => None,
        }
    }

    /// Payload of the message: `body` for responses and events,
    /// `arguments` for requests
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Request(r) => r.arguments.as_ref(),
            Self::Response(r) => r.body.as_ref(),
            Self::Event(e) => e.body.as_ref(),
        }
    }
}

/// DAP request message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMessage {
    pub seq: i64,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// DAP response message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub seq: i64,
    pub request_seq: i64,
    pub success: bool,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// DAP event message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub seq: i64,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

// === Request Arguments ===

/// Initialize request arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeArguments {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(rename = "adapterID")]
    pub adapter_id: String,
    #[serde(default = "default_true")]
    pub lines_start_at1: bool,
    #[serde(default = "default_true")]
    pub columns_start_at1: bool,
    #[serde(default)]
    pub supports_variable_type: bool,
    #[serde(default)]
    pub supports_run_in_terminal_request: bool,
}

fn default_true() -> bool {
    true
}

impl Default for InitializeArguments {
    fn default() -> Self {
        Self {
            client_id: Some("cdf-debug".to_string()),
            client_name: Some("CDF Debug Bridge".to_string()),
            adapter_id: "cdf".to_string(),
            lines_start_at1: true,
            columns_start_at1: true,
            supports_variable_type: true,
            supports_run_in_terminal_request: false,
        }
    }
}

// === Custom Commands ===

/// DAP command name carrying every CDF-specific request
pub const CUSTOM_COMMAND: &str = "custom";

/// Source artifact embedded in a CDF file
///
/// `path` is backend-defined and need not exist on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub path: String,
    pub contents: String,
}

/// Source reference of a breakpoint, by file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointSource {
    pub name: String,
}

/// Breakpoint as understood by the `addBreakpoint` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomBreakpoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<BreakpointSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

/// Internal data of a witness allocated by the circuit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    pub id: usize,
    /// Constraint that produced the witness, if any
    pub constraint: Option<usize>,
    /// Allocated value, hex encoded
    pub value: String,
    /// Source name of the declaration
    pub source: String,
    pub line: u64,
}

/// A request in the CDF backend's custom vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomRequest {
    /// Load a CDF file. A missing path is forwarded as-is.
    LoadCdf { path: Option<String> },
    /// Ask for the sources embedded in the loaded CDF file
    SourceContents,
    AddBreakpoint { breakpoint: CustomBreakpoint },
    RemoveBreakpoint { id: u64 },
    Witness { id: usize },
}

impl CustomRequest {
    /// Name carried in the `command` field of the arguments
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadCdf { .. } => "loadCdf",
            Self::SourceContents => "sourceContents",
            Self::AddBreakpoint { .. } => "addBreakpoint",
            Self::RemoveBreakpoint { .. } => "removeBreakpoint",
            Self::Witness { .. } => "witness",
        }
    }

    /// Arguments object for the `custom` request
    pub fn to_arguments(&self) -> Value {
        let mut args = Map::new();
        args.insert("command".into(), Value::from(self.name()));

        match self {
            Self::LoadCdf { path } => {
                if let Some(path) = path {
                    args.insert("path".into(), Value::from(path.as_str()));
                }
            }
            Self::SourceContents => {}
            Self::AddBreakpoint { breakpoint } => {
                let mut fields = Map::new();
                if let Some(source) = &breakpoint.source {
                    fields.insert("source".into(), json!({ "name": source.name }));
                }
                if let Some(line) = breakpoint.line {
                    fields.insert("line".into(), Value::from(line));
                }
                args.insert("breakpoint".into(), Value::Object(fields));
            }
            Self::RemoveBreakpoint { id } => {
                args.insert("id".into(), Value::from(*id));
            }
            Self::Witness { id } => {
                args.insert("id".into(), Value::from(*id));
            }
        }

        Value::Object(args)
    }
}

/// A response in the CDF backend's custom vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomResponse {
    LoadCdf,
    SourceContents { sources: Vec<SourceEntry> },
    AddBreakpoint { id: u64 },
    RemoveBreakpoint { id: u64, removed: bool },
    Witness { witness: Witness },
}

fn invalid(what: &str) -> Error {
    Error::DapProtocol(format!("custom response: {}", what))
}

/// `command` field of a custom body, if the body is an object carrying one
pub fn custom_command(body: Option<&Value>) -> Option<&str> {
    body.and_then(Value::as_object)
        .and_then(|b| b.get("command"))
        .and_then(Value::as_str)
}

fn sources_of(body: &Map<String, Value>) -> Result<Vec<SourceEntry>> {
    let sources = body
        .get("sources")
        .filter(|s| s.is_array())
        .ok_or_else(|| invalid("invalid sources attribute"))?;
    Vec::<SourceEntry>::deserialize(sources)
        .map_err(|e| invalid(&format!("invalid source entry: {}", e)))
}

/// Sources of a `sourceContents` body
///
/// The whole list is validated before anything is returned.
pub fn parse_source_contents(body: Option<&Value>) -> Result<Vec<SourceEntry>> {
    let body = body
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("body should be an object"))?;
    sources_of(body)
}

impl TryFrom<Option<&Value>> for CustomResponse {
    type Error = Error;

    fn try_from(body: Option<&Value>) -> Result<Self> {
        let body = body
            .and_then(Value::as_object)
            .ok_or_else(|| invalid("body should be an object"))?;

        let command = body
            .get("command")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("body should contain a command"))?;

        match command {
            "loadCdf" => Ok(Self::LoadCdf),

            "sourceContents" => Ok(Self::SourceContents {
                sources: sources_of(body)?,
            }),

            "addBreakpoint" => body
                .get("id")
                .and_then(Value::as_u64)
                .map(|id| Self::AddBreakpoint { id })
                .ok_or_else(|| invalid("invalid id attribute")),

            "removeBreakpoint" => {
                let id = body
                    .get("id")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| invalid("invalid id attribute"))?;
                let removed = body
                    .get("removed")
                    .and_then(Value::as_bool)
                    .ok_or_else(|| invalid("invalid removed attribute"))?;
                Ok(Self::RemoveBreakpoint { id, removed })
            }

            "witness" => {
                let witness = body
                    .get("witness")
                    .ok_or_else(|| invalid("witness is mandatory"))?;
                let witness = Witness::deserialize(witness)
                    .map_err(|e| invalid(&format!("invalid witness: {}", e)))?;
                Ok(Self::Witness { witness })
            }

            other => Err(invalid(&format!("unknown command '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_custom_response_message() {
        let raw = json!({
            "seq": 7,
            "type": "response",
            "request_seq": 3,
            "success": true,
            "command": "custom",
            "body": { "command": "loadCdf" }
        });

        let msg: ProtocolMessage = serde_json::from_value(raw).unwrap();
        assert_eq!(msg.command(), Some(CUSTOM_COMMAND));
        assert_eq!(custom_command(msg.payload()), Some("loadCdf"));
        assert_eq!(
            CustomResponse::try_from(msg.payload()).unwrap(),
            CustomResponse::LoadCdf
        );
    }

    #[test]
    fn test_load_cdf_without_path_omits_field() {
        let args = CustomRequest::LoadCdf { path: None }.to_arguments();
        assert_eq!(args, json!({ "command": "loadCdf" }));

        let args = CustomRequest::LoadCdf {
            path: Some("/tmp/circuit.cdf".into()),
        }
        .to_arguments();
        assert_eq!(args, json!({ "command": "loadCdf", "path": "/tmp/circuit.cdf" }));
    }

    #[test]
    fn test_add_breakpoint_arguments() {
        let args = CustomRequest::AddBreakpoint {
            breakpoint: CustomBreakpoint {
                source: Some(BreakpointSource {
                    name: "gadget.rs".into(),
                }),
                line: Some(12),
            },
        }
        .to_arguments();

        assert_eq!(
            args,
            json!({
                "command": "addBreakpoint",
                "breakpoint": { "source": { "name": "gadget.rs" }, "line": 12 }
            })
        );

        let args = CustomRequest::AddBreakpoint {
            breakpoint: CustomBreakpoint {
                source: None,
                line: None,
            },
        }
        .to_arguments();
        assert_eq!(args, json!({ "command": "addBreakpoint", "breakpoint": {} }));
    }

    #[test]
    fn test_source_contents_requires_array() {
        let body = json!({ "command": "sourceContents", "sources": "nope" });
        assert!(CustomResponse::try_from(Some(&body)).is_err());

        let body = json!({ "command": "sourceContents", "sources": [{ "path": "a" }] });
        assert!(CustomResponse::try_from(Some(&body)).is_err());

        let body = json!({
            "command": "sourceContents",
            "sources": [{ "path": "a", "contents": "A" }]
        });
        assert_eq!(
            CustomResponse::try_from(Some(&body)).unwrap(),
            CustomResponse::SourceContents {
                sources: vec![SourceEntry {
                    path: "a".into(),
                    contents: "A".into()
                }]
            }
        );
    }

    #[test]
    fn test_witness_response() {
        let body = json!({
            "command": "witness",
            "witness": {
                "id": 4,
                "constraint": null,
                "value": "0x01",
                "source": "gadget.rs",
                "line": 9
            }
        });

        match CustomResponse::try_from(Some(&body)).unwrap() {
            CustomResponse::Witness { witness } => {
                assert_eq!(witness.id, 4);
                assert_eq!(witness.constraint, None);
                assert_eq!(witness.line, 9);
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_remove_breakpoint_requires_flag() {
        let body = json!({ "command": "removeBreakpoint", "id": 2 });
        assert!(CustomResponse::try_from(Some(&body)).is_err());
    }
}
