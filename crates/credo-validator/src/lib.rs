//! Policy-driven certificate chain validation for the credo trust layer.
//!
//! The [`Validator`] engine decides whether a signed object should be
//! trusted by recursively validating the certificate chain vouching for
//! its signing key, bounded against infinite and cyclic chains. The trust
//! decision itself lives in a pluggable [`TrustPolicy`]; certificates not
//! yet known locally come from a [`CertificateFetcher`]; signature
//! checking is delegated to a [`SignatureVerifier`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use credo_validator::{AcceptAllPolicy, Validator};
//!
//! let validator = Validator::new(Arc::new(AcceptAllPolicy), fetcher);
//! let outcome = validator.validate(object).await;
//! if let Some(reason) = outcome.failure_reason() {
//!     eprintln!("rejected: {reason}");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/credo-validator/0.1.0")]

mod chain;
mod fetch;
mod policy;
mod validator;
mod verify;

pub use chain::ChainPolicy;
pub use fetch::CertificateFetcher;
pub use policy::{AcceptAllPolicy, PolicyDecision, TrustPolicy, ValidationRequest};
pub use validator::{ValidationOutcome, Validator, ValidatorConfig};
pub use verify::SignatureVerifier;
