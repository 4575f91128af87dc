//! # msgstore core
//!
//! Crash-safe storage of serialized records, one file per identifier.
//!
//! A [`Store`] binds a directory to a namespace of caller-chosen string
//! identifiers. Each record lives in its own file, written atomically in a
//! human-readable text form, so a store can be inspected and edited by hand.
//!
//! ## Features
//!
//! - Atomic writes: readers see the old record or the new one, never a mix
//! - Arbitrary identifiers: escaped into safe file names
//! - Directory scan as the index: no cache to go stale
//! - Foreign files in the store directory are ignored
//! - Free functions for reading and writing single records in binary or text form
//!
//! ## Example
//!
//! ```no_run
//! use msgstore_core::Store;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Domain {
//!     name: String,
//!     users: Vec<String>,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Open (and create if needed) a store
//! let store = Store::open("./domains")?;
//!
//! // Write a record
//! let domain = Domain { name: "example.com".into(), users: vec!["alice".into()] };
//! store.put("example.com", &domain)?;
//!
//! // Read it back
//! if let Some(domain) = store.get::<Domain>("example.com")? {
//!     println!("{} has {} users", domain.name, domain.users.len());
//! }
//!
//! // Enumerate everything in the store
//! for id in store.list_ids()? {
//!     println!("{}", id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
mod error;
pub mod escape;
mod message;
pub mod safeio;
mod store;

pub use codec::Message;
pub use error::{Error, Result};
pub use message::{read_message, read_text_message, write_message, write_text_message};
pub use store::{DIR_MODE, FILE_MODE, ListReport, STORE_ID_PREFIX, Store};
