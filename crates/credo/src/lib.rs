//! Named-data trust layer: certificate codec, trust store, and chain
//! validation engine.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use credo::{
//!     AcceptAllPolicy, Certificate, MemoryTrustStore, SignedObject, TrustStore, Validator,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     // Anchor a certificate in the local trust store.
//!     let store = Arc::new(MemoryTrustStore::new());
//!     store.add_certificate(&anchor);
//!
//!     // Validate a signed object; the policy decides, the fetcher
//!     // retrieves chain links the store doesn't know.
//!     let validator = Validator::new(Arc::new(AcceptAllPolicy), fetcher);
//!     let outcome = validator.validate(Arc::new(object)).await;
//!     println!("{outcome}");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/credo/0.1.0")]

// Re-export core types
pub use credo_core::*;

// Re-export the trust store
pub use credo_store::{KeyRecord, MemoryTrustStore, TrustStore};

// Re-export the validation engine
pub use credo_validator::{
    AcceptAllPolicy, CertificateFetcher, ChainPolicy, PolicyDecision, SignatureVerifier,
    TrustPolicy, ValidationOutcome, ValidationRequest, Validator, ValidatorConfig,
};

// Re-export runtime for convenience
pub use serde;
pub use tokio;
