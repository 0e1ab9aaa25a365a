//! Typed command-line values (`TYPE:VALUE`) and their wire encoding.

use std::fmt;
use std::str::FromStr;

use cipc_codec::{Decode, Encode, Reader, Writer};
use clap::ValueEnum;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueKind {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    Str,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::U8 => "u8",
            ValueKind::U16 => "u16",
            ValueKind::U32 => "u32",
            ValueKind::U64 => "u64",
            ValueKind::I8 => "i8",
            ValueKind::I16 => "i16",
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::Bool => "bool",
            ValueKind::Str => "str",
        }
    }
}

/// One argument or return value with its wire type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Str(String),
}

macro_rules! with_inner {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            ArgValue::U8($inner) => $body,
            ArgValue::U16($inner) => $body,
            ArgValue::U32($inner) => $body,
            ArgValue::U64($inner) => $body,
            ArgValue::I8($inner) => $body,
            ArgValue::I16($inner) => $body,
            ArgValue::I32($inner) => $body,
            ArgValue::I64($inner) => $body,
            ArgValue::F32($inner) => $body,
            ArgValue::F64($inner) => $body,
            ArgValue::Bool($inner) => $body,
            ArgValue::Str($inner) => $body,
        }
    };
}

impl ArgValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ArgValue::U8(_) => ValueKind::U8,
            ArgValue::U16(_) => ValueKind::U16,
            ArgValue::U32(_) => ValueKind::U32,
            ArgValue::U64(_) => ValueKind::U64,
            ArgValue::I8(_) => ValueKind::I8,
            ArgValue::I16(_) => ValueKind::I16,
            ArgValue::I32(_) => ValueKind::I32,
            ArgValue::I64(_) => ValueKind::I64,
            ArgValue::F32(_) => ValueKind::F32,
            ArgValue::F64(_) => ValueKind::F64,
            ArgValue::Bool(_) => ValueKind::Bool,
            ArgValue::Str(_) => ValueKind::Str,
        }
    }

    /// Parse the text after `TYPE:`.
    pub fn parse(kind: ValueKind, text: &str) -> Result<Self, String> {
        let bad = |err: &dyn fmt::Display| format!("invalid {} value '{text}': {err}", kind.name());
        let value = match kind {
            ValueKind::U8 => ArgValue::U8(narrow(parse_unsigned(text)?).map_err(|e| bad(&e))?),
            ValueKind::U16 => ArgValue::U16(narrow(parse_unsigned(text)?).map_err(|e| bad(&e))?),
            ValueKind::U32 => ArgValue::U32(narrow(parse_unsigned(text)?).map_err(|e| bad(&e))?),
            ValueKind::U64 => ArgValue::U64(parse_unsigned(text)?),
            ValueKind::I8 => ArgValue::I8(text.parse().map_err(|e| bad(&e))?),
            ValueKind::I16 => ArgValue::I16(text.parse().map_err(|e| bad(&e))?),
            ValueKind::I32 => ArgValue::I32(text.parse().map_err(|e| bad(&e))?),
            ValueKind::I64 => ArgValue::I64(text.parse().map_err(|e| bad(&e))?),
            ValueKind::F32 => ArgValue::F32(text.parse().map_err(|e| bad(&e))?),
            ValueKind::F64 => ArgValue::F64(text.parse().map_err(|e| bad(&e))?),
            ValueKind::Bool => ArgValue::Bool(match text {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(bad(&"expected true, false, 1 or 0")),
            }),
            ValueKind::Str => ArgValue::Str(text.to_string()),
        };
        Ok(value)
    }

    /// Decode one value of `kind` from the reader.
    pub fn decode_as(kind: ValueKind, reader: &mut Reader<'_>) -> cipc_codec::Result<Self> {
        Ok(match kind {
            ValueKind::U8 => ArgValue::U8(u8::decode(reader)?),
            ValueKind::U16 => ArgValue::U16(u16::decode(reader)?),
            ValueKind::U32 => ArgValue::U32(u32::decode(reader)?),
            ValueKind::U64 => ArgValue::U64(u64::decode(reader)?),
            ValueKind::I8 => ArgValue::I8(i8::decode(reader)?),
            ValueKind::I16 => ArgValue::I16(i16::decode(reader)?),
            ValueKind::I32 => ArgValue::I32(i32::decode(reader)?),
            ValueKind::I64 => ArgValue::I64(i64::decode(reader)?),
            ValueKind::F32 => ArgValue::F32(f32::decode(reader)?),
            ValueKind::F64 => ArgValue::F64(f64::decode(reader)?),
            ValueKind::Bool => ArgValue::Bool(bool::decode(reader)?),
            ValueKind::Str => ArgValue::Str(String::decode(reader)?),
        })
    }

    pub fn to_json(&self) -> JsonValue {
        with_inner!(self, v => serde_json::json!(v))
    }
}

impl Encode for ArgValue {
    fn serialized_size(&self) -> usize {
        with_inner!(self, v => v.serialized_size())
    }

    fn encode(&self, writer: &mut Writer<'_>) -> cipc_codec::Result<()> {
        with_inner!(self, v => v.encode(writer))
    }
}

impl FromStr for ArgValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, text) = s
            .split_once(':')
            .ok_or_else(|| format!("expected TYPE:VALUE, got '{s}'"))?;
        let kind = ValueKind::from_str(kind, true)?;
        ArgValue::parse(kind, text)
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.kind().name())?;
        with_inner!(self, v => write!(f, "{v}"))
    }
}

/// Unsigned integer in decimal or `0x` hex.
pub fn parse_unsigned(text: &str) -> Result<u64, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|err| format!("invalid unsigned integer '{text}': {err}"))
}

fn narrow<T: TryFrom<u64>>(value: u64) -> Result<T, T::Error> {
    T::try_from(value)
}

pub fn parse_call_id(text: &str) -> Result<u16, String> {
    narrow(parse_unsigned(text)?).map_err(|_| format!("call id '{text}' does not fit in u16"))
}

pub fn parse_method_id(text: &str) -> Result<u32, String> {
    narrow(parse_unsigned(text)?).map_err(|_| format!("method id '{text}' does not fit in u32"))
}

pub fn parse_object_id(text: &str) -> Result<u64, String> {
    parse_unsigned(text)
}
