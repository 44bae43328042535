//! XML-RPC wire values: request encoding and response decoding.
//!
//! The wire format represents an absent variant field with its type's
//! zero/default value (empty string, `0`, `false`, `0.0`, empty
//! collections), so a decoded `<value>` cannot distinguish "integer 0" from
//! "nothing set" by shape alone. [`RawValue::decode`] resolves this with a
//! fixed precedence order that existing daemon clients rely on:
//!
//! 1. non-empty string → string
//! 2. non-zero int, or no other field set → int (including a legitimate 0)
//! 3. boolean true → bool
//! 4. non-zero double → double
//! 5. non-empty array → array, decoded recursively
//! 6. non-empty struct → struct, decoded recursively, member order kept
//! 7. otherwise → nil
//!
//! Reordering these branches silently changes decoded values.

use quick_xml::escape::escape;
use serde::Deserialize;
use thiserror::Error;

/// A decoded XML-RPC value.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    String(String),
    Int(i64),
    Bool(bool),
    Double(f64),
    Array(Vec<WireValue>),
    /// Ordered name→value members, preserved as they appeared on the wire.
    Struct(Vec<(String, WireValue)>),
    /// Produced by the decoder when no field survives the precedence rule.
    Nil,
}

impl WireValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            WireValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[WireValue]> {
        match self {
            WireValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// First struct member with the given name.
    pub fn member(&self, name: &str) -> Option<&WireValue> {
        match self {
            WireValue::Struct(members) => members
                .iter()
                .find_map(|(n, v)| (n == name).then_some(v)),
            _ => None,
        }
    }
}

/// Codec-level failures, kept separate from transport failures so the
/// façade can log which layer gave up.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed method response: {0}")]
    Malformed(#[from] quick_xml::DeError),

    /// The daemon answered with a structured fault.
    #[error("fault: {0}")]
    Fault(String),
}

// ---------------------------------------------------------------------------
// Request encoding
// ---------------------------------------------------------------------------

/// Encode a `<methodCall>` document.
///
/// Parameters with no wire encoding (doubles, structs, nil) are silently
/// omitted; callers must not rely on the omission signaling anything.
pub fn encode_method_call(method: &str, params: &[WireValue]) -> String {
    let mut xml = String::with_capacity(256);
    xml.push_str(r#"<?xml version="1.0"?>"#);
    xml.push_str("<methodCall><methodName>");
    xml.push_str(&escape(method));
    xml.push_str("</methodName><params>");
    for param in params {
        if let Some(value) = encode_value(param) {
            xml.push_str("<param>");
            xml.push_str(&value);
            xml.push_str("</param>");
        }
    }
    xml.push_str("</params></methodCall>");
    xml
}

fn encode_value(value: &WireValue) -> Option<String> {
    let body = match value {
        WireValue::String(s) => format!("<string>{}</string>", escape(s)),
        WireValue::Int(i) => format!("<int>{i}</int>"),
        WireValue::Bool(b) => format!("<boolean>{}</boolean>", i32::from(*b)),
        WireValue::Array(items) => {
            let mut inner = String::new();
            for item in items {
                if let Some(encoded) = encode_value(item) {
                    inner.push_str(&encoded);
                }
            }
            format!("<array><data>{inner}</data></array>")
        }
        WireValue::Double(_) | WireValue::Struct(_) | WireValue::Nil => return None,
    };
    Some(format!("<value>{body}</value>"))
}

// ---------------------------------------------------------------------------
// Response decoding
// ---------------------------------------------------------------------------

/// Raw `<value>` element as it appears on the wire. Absent variant fields
/// land on their type defaults, which is exactly what the precedence rule
/// untangles.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawValue {
    string: String,
    int: i64,
    boolean: bool,
    double: f64,
    array: RawArray,
    #[serde(rename = "struct")]
    structure: RawStruct,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawArray {
    data: RawArrayData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawArrayData {
    #[serde(rename = "value")]
    values: Vec<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStruct {
    #[serde(rename = "member")]
    members: Vec<RawMember>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMember {
    name: String,
    value: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawResponse {
    params: RawResponseParams,
    fault: Option<RawFault>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawResponseParams {
    #[serde(rename = "param")]
    params: Vec<RawResponseParam>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawResponseParam {
    value: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFault {
    value: RawValue,
}

impl RawValue {
    /// Apply the decode precedence rule (see module docs).
    fn decode(&self) -> WireValue {
        if !self.string.is_empty() {
            return WireValue::String(self.string.clone());
        }
        let nothing_else_set = !self.boolean
            && self.double == 0.0
            && self.array.data.values.is_empty()
            && self.structure.members.is_empty();
        if self.int != 0 || nothing_else_set {
            return WireValue::Int(self.int);
        }
        if self.boolean {
            return WireValue::Bool(true);
        }
        if self.double != 0.0 {
            return WireValue::Double(self.double);
        }
        if !self.array.data.values.is_empty() {
            return WireValue::Array(self.array.data.values.iter().map(RawValue::decode).collect());
        }
        if !self.structure.members.is_empty() {
            return WireValue::Struct(
                self.structure
                    .members
                    .iter()
                    .map(|m| (m.name.clone(), m.value.decode()))
                    .collect(),
            );
        }
        WireValue::Nil
    }
}

/// Decode a `<methodResponse>` body.
///
/// `Ok(None)` means the response carried no parameters, which the daemon
/// uses for calls with no return value. A fault body becomes
/// [`CodecError::Fault`] carrying the `faultString` member when present.
pub fn decode_method_response(body: &str) -> Result<Option<WireValue>, CodecError> {
    let raw: RawResponse = quick_xml::de::from_str(body)?;

    if let Some(fault) = raw.fault {
        let message = fault
            .value
            .structure
            .members
            .iter()
            .find(|m| m.name == "faultString")
            .map(|m| m.value.string.clone())
            .unwrap_or_else(|| "unknown fault".to_string());
        return Err(CodecError::Fault(message));
    }

    Ok(raw.params.params.first().map(|p| p.value.decode()))
}
