//! Reading and writing single records to files.
//!
//! These work on any path and do not know about stores. A missing file is a
//! plain I/O error here; only [`crate::Store::get`] reports "not found" as a
//! distinct outcome.

use crate::codec::{self, Message};
use crate::error::Result;
use crate::safeio;
use std::fs;
use std::path::Path;

/// Read a binary-encoded record from `path`.
pub fn read_message<T: Message>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    codec::unmarshal(&data).map_err(|e| e.in_file(path))
}

/// Read a text-encoded record from `path`.
pub fn read_text_message<T: Message>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    codec::unmarshal_text(&data).map_err(|e| e.in_file(path))
}

/// Encode `msg` in binary form and atomically write it to `path`.
pub fn write_message<T: Message>(path: impl AsRef<Path>, msg: &T, mode: u32) -> Result<()> {
    let data = codec::marshal(msg)?;
    safeio::write_file(path.as_ref(), &data, mode)
}

/// Encode `msg` in text form and atomically write it to `path`.
pub fn write_text_message<T: Message>(path: impl AsRef<Path>, msg: &T, mode: u32) -> Result<()> {
    let data = codec::marshal_text(msg)?;
    safeio::write_file(path.as_ref(), data.as_bytes(), mode)
}
