//! Record encodings.
//!
//! Two forms are supported:
//! - binary: compact `bincode` encoding, not self-describing
//! - text: pretty-printed JSON with a trailing newline, meant to be read and
//!   edited by hand
//!
//! Everything here is pure; reading and writing files is done by the message
//! functions re-exported at the crate root.

use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record the store can persist.
///
/// Implemented for every type that serde can both serialize and deserialize.
pub trait Message: Serialize + DeserializeOwned {}

impl<T: Serialize + DeserializeOwned> Message for T {}

/// Encode a record in binary form.
pub fn marshal<T: Message>(msg: &T) -> Result<Vec<u8>> {
    bincode::serialize(msg).map_err(|e| Error::encode(e.to_string()))
}

/// Decode a record from binary form.
pub fn unmarshal<T: Message>(data: &[u8]) -> Result<T> {
    bincode::deserialize(data).map_err(|e| Error::decode(e.to_string()))
}

/// Encode a record in text form.
pub fn marshal_text<T: Message>(msg: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(msg).map_err(|e| Error::encode(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

/// Decode a record from text form.
///
/// Takes bytes rather than `&str` so invalid UTF-8 surfaces as a decode error.
pub fn unmarshal_text<T: Message>(data: &[u8]) -> Result<T> {
    serde_json::from_slice(data).map_err(|e| Error::decode(e.to_string()))
}
