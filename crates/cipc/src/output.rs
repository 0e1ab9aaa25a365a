use std::io::{IsTerminal, Write};

use cipc_msg::{Message, MessageError, MessageType};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::value::ArgValue;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageOutput {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub call_id: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<u64>,
    pub payload_size: usize,
    pub payload_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(skip)]
    payload: Vec<u8>,
}

impl MessageOutput {
    /// Summarize a validated message. `value` is the decoded payload, if any.
    pub fn new(message: &Message, value: Option<&ArgValue>) -> Result<Self, MessageError> {
        let (kind, method_id, object_id, payload) = match message.message_type()? {
            MessageType::Request => (
                "request",
                Some(message.method_id()?),
                Some(message.object_id()?),
                message.args_data()?,
            ),
            MessageType::Response => ("response", None, None, message.return_value()?),
        };
        Ok(Self {
            kind,
            call_id: message.call_id(),
            method_id,
            object_id,
            payload_size: payload.len(),
            payload_hex: hex::encode(payload.as_bytes()),
            value: value.map(ArgValue::to_json),
            payload: payload.as_bytes().to_vec(),
        })
    }
}

pub fn print_message(out: &MessageOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            table.add_row(vec!["type".to_string(), out.kind.to_string()]);
            table.add_row(vec!["call_id".to_string(), out.call_id.to_string()]);
            if let Some(method_id) = out.method_id {
                table.add_row(vec!["method_id".to_string(), format!("{method_id:#x}")]);
            }
            if let Some(object_id) = out.object_id {
                table.add_row(vec!["object_id".to_string(), object_id.to_string()]);
            }
            table.add_row(vec!["size".to_string(), out.payload_size.to_string()]);
            table.add_row(vec!["payload".to_string(), out.payload_hex.clone()]);
            if let Some(value) = &out.value {
                table.add_row(vec!["value".to_string(), value.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let mut line = format!("{} call_id={}", out.kind, out.call_id);
            if let (Some(method_id), Some(object_id)) = (out.method_id, out.object_id) {
                line.push_str(&format!(" method={method_id:#x} object={object_id}"));
            }
            line.push_str(&format!(" size={}", out.payload_size));
            match &out.value {
                Some(value) => line.push_str(&format!(" value={value}")),
                None => line.push_str(&format!(" payload={}", out.payload_hex)),
            }
            println!("{line}");
        }
        OutputFormat::Raw => print_raw(&out.payload),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_summary_includes_ids() {
        let message = Message::build_request(3, 0x10, 9, &(1u16,)).unwrap();
        let out = MessageOutput::new(&message, None).unwrap();
        let json = serde_json::to_value(&out).unwrap();

        assert_eq!(json["type"], "request");
        assert_eq!(json["call_id"], 3);
        assert_eq!(json["method_id"], 0x10);
        assert_eq!(json["object_id"], 9);
        assert_eq!(json["payload_size"], 2);
        assert_eq!(json["payload_hex"], "0100");
        assert!(json.get("value").is_none());
    }

    #[test]
    fn response_summary_omits_request_fields() {
        let message = Message::build_response(4, &42u32).unwrap();
        let out = MessageOutput::new(&message, Some(&ArgValue::U32(42))).unwrap();
        let json = serde_json::to_value(&out).unwrap();

        assert_eq!(json["type"], "response");
        assert!(json.get("method_id").is_none());
        assert!(json.get("object_id").is_none());
        assert_eq!(json["value"], 42);
        assert!(json.get("payload").is_none());
    }
}
