//! Trust-info store for the credo trust layer.
//!
//! A [`TrustStore`] maps identities to keys to certificates and keeps the
//! default-pointer bookkeeping. [`MemoryTrustStore`] is the in-memory
//! reference backend: a minimal harness for the validation engine that
//! reports enumeration, deletion and revocation as `NotImplemented`
//! rather than pretending to support them.
//!
//! # Example
//!
//! ```rust,ignore
//! use credo_store::{MemoryTrustStore, TrustStore};
//!
//! let store = MemoryTrustStore::new();
//! store.add_certificate(&anchor);
//! assert!(store.does_identity_exist(&"/alice".into()));
//! ```

#![doc(html_root_url = "https://docs.rs/credo-store/0.1.0")]

mod memory;
mod store;

pub use memory::MemoryTrustStore;
pub use store::{KeyRecord, TrustStore};
