use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::keys::PropertyKey;

/// A native scalar held by one account property.
///
/// On disk the value is an opaque self-describing MessagePack blob; this enum
/// is the only decoded form the rest of the crate sees. Encodings produced by
/// different encoders for the same scalar are not guaranteed byte-identical,
/// so dirty tracking compares the raw blobs, never decoded values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl PropertyValue {
    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        rmp_serde::to_vec(self).map_err(|e| CoreError::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        rmp_serde::from_slice(bytes).map_err(|e| CoreError::Decode(e.to_string()))
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Validate a stored blob at load time, fixing one known legacy malformation:
/// some old writers archived `PortNumber` as text. When the payload for that
/// key decodes to a string holding an integer, re-encode it as a native
/// integer so reads and byte-wise dirty comparisons behave as if it had
/// always been numeric. Every other well-formed payload passes through with
/// its original bytes intact.
///
/// Called once per property on load, never on write.
pub fn normalize(key: PropertyKey, bytes: Vec<u8>) -> Result<Vec<u8>, CoreError> {
    let value = PropertyValue::decode(&bytes)?;

    if key == PropertyKey::PortNumber
        && let PropertyValue::Text(s) = &value
        && let Ok(n) = s.parse::<i64>()
    {
        return PropertyValue::Integer(n).encode();
    }

    Ok(bytes)
}
