//! DendroScan object storage
//!
//! Uploads crops and framed images, downloads source photos. Uploads that fail
//! degrade to a placeholder URL through [`upload_or_placeholder`]; downloads
//! report typed errors so the server can tell a missing photo from an outage.

pub mod config;
pub mod error;

mod http;
mod memory;
mod store;
mod url;

pub use crate::config::{StorageConfig, DEFAULT_PLACEHOLDER_URL};
pub use crate::error::StorageError;
pub use crate::http::HttpObjectStore;
pub use crate::memory::MemoryObjectStore;
pub use crate::store::{build_store, upload_or_placeholder, ObjectStore};
pub use crate::url::resolve_public_url;
