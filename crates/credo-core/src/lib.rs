//! Core types and the certificate codec for the credo trust layer.
//!
//! This crate provides the foundational pieces shared across credo:
//!
//! - **Names**: hierarchical [`Name`]s addressing identities, keys and
//!   certificates
//! - **Signed objects**: the [`SignedObject`] container validation decides
//!   about
//! - **Certificates**: the [`Certificate`] entity with its canonical
//!   binary codec and validity-window checks
//! - **Errors**: shared error handling with [`CredoError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use credo_core::{Certificate, CertificateSummary, Result, SignedObject};
//!
//! fn inspect(object: &SignedObject) -> Result<()> {
//!     let cert = Certificate::from_signed_object(object)?;
//!     println!("{}", cert.summary());
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/credo-core/0.1.0")]

pub mod certificate;
pub mod der;
mod error;
pub mod key;
pub mod name;
pub mod object;

pub use certificate::{
    Certificate, CertificateExtension, CertificateSummary, ExtensionSummary, SubjectDescription,
    ID_CERT_COMPONENT,
};
pub use der::Oid;
pub use error::{CredoError, Result};
pub use key::{KeyType, PublicKey};
pub use name::Name;
pub use object::{ContentType, SignatureInfo, SignedObject};
