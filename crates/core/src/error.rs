use thiserror::Error;

use crate::keys::PropertyKey;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("unknown property key: {0}")]
    UnknownKey(String),

    #[error("property key is not writable: {0}")]
    UnwritableKey(PropertyKey),

    #[error("no property loaded for key: {0}")]
    MissingProperty(PropertyKey),
}
