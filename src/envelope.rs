//! The `{ code, message, data }` wrapper every Gossip response is sent in.

use crate::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Server response wrapper.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Envelope {
    /// Application status code. `None` when absent or not numeric.
    pub code: Option<i64>,
    pub message: Option<String>,
    /// `Some(Value::Null)` when the server sent `"data": null`; `None` when the key is absent.
    pub data: Option<Value>,
}

impl Envelope {
    /// Builds an envelope from a parsed body.
    ///
    /// `code` is read loosely, so `"200"` and `200.0` count as `200`. Bodies that are not
    /// JSON objects yield an envelope with no code.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };

        let code = map.get("code").and_then(|c| match c {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_number)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
            }
            _ => None,
        });
        let message = map
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        let data = map.remove("data");

        Self {
            code,
            message,
            data,
        }
    }

    /// Parses a raw response body into an envelope.
    ///
    /// A body that decodes to a JSON string is decoded a second time; some
    /// deployments send the envelope with a text content type.
    pub fn parse(body: &str) -> std::result::Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(body)?;
        let value = match value {
            Value::String(inner) => serde_json::from_str(&inner)?,
            other => other,
        };
        Ok(Self::from_value(value))
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(crate::error_kind::CODE_OK)
    }

    /// The successful result this envelope carries.
    pub fn into_payload(self) -> Payload {
        match self.data {
            Some(data) => Payload::Data(data),
            None => Payload::Done,
        }
    }
}

fn whole_number(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then(|| f as i64)
}

/// What a successful call returns: the envelope's `data`, or a bare success marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Data(Value),
    /// Success with no `data` field. Renders as JSON `true`.
    Done,
}

impl Payload {
    pub fn is_done(&self) -> bool {
        matches!(self, Payload::Done)
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Payload::Data(v) => Some(v),
            Payload::Done => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Payload::Data(v) => v,
            Payload::Done => Value::Bool(true),
        }
    }

    /// Deserializes the payload into a typed value.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.into_value())?)
    }
}
