//! Mock CDF debug backend for integration testing
//!
//! Speaks DAP over TCP like the real backend, without any circuit logic.
//! A "CDF file" here is a JSON array of `{path, contents}` objects; those
//! become the sources returned by `sourceContents`.
//!
//! Usage: `mock_backend --bind 127.0.0.1:8989`

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};

fn main() {
    let bind = std::env::args()
        .skip_while(|a| a != "--bind")
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8989".to_string());

    let listener = match TcpListener::bind(&bind) {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("mock_backend: cannot bind {}: {}", bind, e);
            std::process::exit(1);
        }
    };

    for stream in listener.incoming().flatten() {
        std::thread::spawn(move || serve(stream));
    }
}

fn serve(stream: TcpStream) {
    let Ok(write_half) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(stream);
    let mut writer = write_half;
    let mut state = MockState::default();

    while let Some(message) = read_message(&mut reader) {
        let replies = state.process_message(&message);
        for reply in &replies {
            send_message(&mut writer, reply);
        }
        if state.closed {
            break;
        }
    }
}

fn read_message<R: BufRead>(reader: &mut R) -> Option<Value> {
    let mut content_length = None;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some(len) = line.strip_prefix("Content-Length:") {
            content_length = len.trim().parse::<usize>().ok();
        }
    }

    let mut body = vec![0u8; content_length?];
    reader.read_exact(&mut body).ok()?;
    serde_json::from_slice(&body).ok()
}

fn send_message<W: Write>(writer: &mut W, message: &Value) {
    let body = message.to_string();
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).ok();
    writer.write_all(body.as_bytes()).ok();
    writer.flush().ok();
}

#[derive(Default)]
struct MockState {
    seq: i64,
    sources: Option<Vec<Value>>,
    breakpoints: BTreeMap<u64, Value>,
    next_breakpoint: u64,
    closed: bool,
}

impl MockState {
    fn next_seq(&mut self) -> i64 {
        self.seq += 1;
        self.seq
    }

    fn event(&mut self, event: &str, body: Value) -> Value {
        json!({ "seq": self.next_seq(), "type": "event", "event": event, "body": body })
    }

    fn response(&mut self, request: &Value, body: Option<Value>) -> Value {
        let mut response = json!({
            "seq": self.next_seq(),
            "type": "response",
            "request_seq": request["seq"],
            "success": true,
            "command": request["command"],
        });
        if let Some(body) = body {
            response["body"] = body;
        }
        response
    }

    fn error(&mut self, request: &Value, message: &str) -> Value {
        json!({
            "seq": self.next_seq(),
            "type": "response",
            "request_seq": request["seq"],
            "success": false,
            "command": request["command"],
            "message": message,
        })
    }

    fn process_message(&mut self, message: &Value) -> Vec<Value> {
        if message["type"] != "request" {
            return Vec::new();
        }

        match message["command"].as_str().unwrap_or_default() {
            "initialize" => {
                let caps = json!({ "supportsRestartRequest": true, "supportsStepBack": true });
                let response = self.response(message, Some(caps));
                let initialized = self.event("initialized", Value::Null);
                vec![response, initialized]
            }
            "custom" => self.custom(message),
            "restart" => {
                if self.sources.is_none() {
                    return vec![self.error(message, "the debugger is not initialized with a CDF file")];
                }
                let process = self.event("process", json!({ "name": "cdf", "isLocalProcess": true }));
                let response = self.response(message, None);
                vec![process, response]
            }
            "disconnect" => {
                self.closed = true;
                vec![self.response(message, None)]
            }
            _ => vec![self.error(message, "not supported")],
        }
    }

    fn custom(&mut self, message: &Value) -> Vec<Value> {
        let args = &message["arguments"];

        match args["command"].as_str().unwrap_or_default() {
            "loadCdf" => {
                let Some(path) = args["path"].as_str() else {
                    return vec![self.error(message, "invalid path attribute")];
                };

                let sources = std::fs::read_to_string(path)
                    .ok()
                    .and_then(|s| serde_json::from_str::<Vec<Value>>(&s).ok());
                let Some(sources) = sources else {
                    return vec![self.error(message, &format!("cannot open {}", path))];
                };
                self.sources = Some(sources);

                let thread = self.event("thread", json!({ "reason": "started", "threadId": 0 }));
                let stopped = self.event(
                    "stopped",
                    json!({ "reason": "step", "threadId": 0, "allThreadsStopped": true }),
                );
                let response = self.response(message, Some(json!({ "command": "loadCdf" })));
                vec![thread, stopped, response]
            }
            "sourceContents" => match self.sources.clone() {
                Some(sources) => {
                    let body = json!({ "command": "sourceContents", "sources": sources });
                    vec![self.response(message, Some(body))]
                }
                None => vec![self.error(message, "the debugger is not initialized with a CDF file")],
            },
            "addBreakpoint" => {
                if self.sources.is_none() {
                    return vec![self.error(message, "the debugger is not initialized with a CDF file")];
                }
                let breakpoint = &args["breakpoint"];
                if breakpoint["source"]["name"].as_str().is_none() {
                    return vec![self.error(message, "the breakpoint name wasn't provided")];
                }
                self.next_breakpoint += 1;
                let id = self.next_breakpoint;
                self.breakpoints.insert(id, breakpoint.clone());
                let body = json!({ "command": "addBreakpoint", "id": id });
                vec![self.response(message, Some(body))]
            }
            "removeBreakpoint" => {
                if self.sources.is_none() {
                    return vec![self.error(message, "the debugger is not initialized with a CDF file")];
                }
                let id = args["id"].as_u64().unwrap_or_default();
                let removed = self.breakpoints.remove(&id).is_some();
                let body = json!({ "command": "removeBreakpoint", "id": id, "removed": removed });
                vec![self.response(message, Some(body))]
            }
            "witness" => {
                let id = args["id"].as_u64().unwrap_or_default();
                let witness = json!({
                    "id": id,
                    "constraint": if id == 0 { Value::Null } else { json!(id - 1) },
                    "value": format!("0x{:064x}", id * 7),
                    "source": "gadget.rs",
                    "line": 10 + id,
                });
                let body = json!({ "command": "witness", "witness": witness });
                vec![self.response(message, Some(body))]
            }
            _ => vec![self.error(message, "unknown command")],
        }
    }
}
