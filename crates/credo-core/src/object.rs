//! The signed-object container.
//!
//! A signed object is a named unit of content plus signature metadata --
//! the thing validation decides about. Certificates are signed objects
//! whose content carries the encoded certificate schema; the key locator
//! in the signature names the certificate vouching for the signing key.

use crate::name::Name;

/// What the content bytes carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentType {
    /// Opaque application payload
    #[default]
    Blob,
    /// An encoded certificate
    Key,
}

/// Signature metadata attached to a signed object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureInfo {
    /// Name of the certificate whose key signed this object. Empty when
    /// the object was built locally and not yet signed.
    pub key_locator: Name,
    /// Raw signature bytes, opaque to the trust core.
    pub value: Vec<u8>,
}

impl SignatureInfo {
    /// Signature metadata pointing at the given signer certificate.
    #[must_use]
    pub fn new(key_locator: Name, value: Vec<u8>) -> Self {
        Self { key_locator, value }
    }
}

/// A named, signed unit of data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedObject {
    /// Hierarchical name of the object
    pub name: Name,
    /// Payload bytes
    pub content: Vec<u8>,
    /// Payload kind
    pub content_type: ContentType,
    /// Signature metadata
    pub signature: SignatureInfo,
}

impl SignedObject {
    /// A blob-typed object with empty signature metadata.
    #[must_use]
    pub fn new(name: Name, content: Vec<u8>) -> Self {
        Self {
            name,
            content,
            content_type: ContentType::Blob,
            signature: SignatureInfo::default(),
        }
    }

    /// Attach signature metadata, builder style.
    #[must_use]
    pub fn with_signature(mut self, signature: SignatureInfo) -> Self {
        self.signature = signature;
        self
    }
}
