//! The trust-info store contract.
//!
//! A trust store is the registry of known identities, their public keys,
//! and the certificates vouching for those keys. The validation engine
//! consults it as a local source of trust anchors and already-known
//! certificates.
//!
//! Contract invariants every backend must honor:
//!
//! - existence checks return booleans and never fail
//! - adds are idempotent and never fail; adding a certificate first
//!   ensures its owning key and identity exist (certificates never exist
//!   without an implied identity and key record)
//! - `get` operations fail with `NotFound` when the name is absent
//! - setting the default identity to an unknown name clears the default;
//!   the key-name and certificate-name default setters are deliberately
//!   *not* existence-checked (preserved backend asymmetry)
//! - operations a minimal backend does not support fail with a distinct
//!   `NotImplemented` error instead of silently no-opping

use std::sync::Arc;

use credo_core::{Certificate, KeyType, Name, PublicKey, Result};

/// A stored public key: its type plus the key material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    /// Key algorithm family
    pub key_type: KeyType,
    /// The key itself
    pub key: PublicKey,
}

impl KeyRecord {
    /// Pair a key with its type.
    #[must_use]
    pub const fn new(key_type: KeyType, key: PublicKey) -> Self {
        Self { key_type, key }
    }
}

/// Registry of identities, keys and certificates with default bookkeeping.
pub trait TrustStore: Send + Sync {
    /// True when the identity is present. Never fails.
    fn does_identity_exist(&self, identity: &Name) -> bool;

    /// Record an identity; a no-op when it already exists.
    fn add_identity(&self, identity: &Name);

    /// Revoke an identity.
    ///
    /// # Errors
    ///
    /// `NotImplemented` in the reference backend.
    fn revoke_identity(&self) -> Result<()>;

    /// True when the key is present. Never fails.
    fn does_public_key_exist(&self, key_name: &Name) -> bool;

    /// Record a public key, first ensuring its owning identity (the key
    /// name minus its last component) exists.
    fn add_public_key(&self, key_name: &Name, key_type: KeyType, key: &PublicKey);

    /// Look up a key record.
    ///
    /// # Errors
    ///
    /// `NotFound` when the key name is absent.
    fn public_key(&self, key_name: &Name) -> Result<KeyRecord>;

    /// True when the certificate is present. Never fails.
    fn does_certificate_exist(&self, certificate_name: &Name) -> bool;

    /// Record a certificate, first ensuring its owning key and identity
    /// exist (the cascade registers the key as [`KeyType::Rsa`]).
    fn add_certificate(&self, certificate: &Certificate);

    /// Look up a certificate.
    ///
    /// # Errors
    ///
    /// `NotFound` when the certificate name is absent.
    fn certificate(&self, certificate_name: &Name) -> Result<Arc<Certificate>>;

    /// The default identity; empty when never set or when the last set
    /// target did not exist at set time.
    fn default_identity(&self) -> Name;

    /// Set the default identity. Existence-checked: an unknown name
    /// clears the default instead of pointing at a nonexistent identity.
    fn set_default_identity(&self, identity: &Name);

    /// The default key name recorded for an identity.
    fn default_key_name_for_identity(&self, identity: &Name) -> Name;

    /// Set the default key name. Not existence-checked.
    fn set_default_key_name_for_identity(&self, key_name: &Name);

    /// The default certificate name recorded for a key.
    fn default_certificate_name_for_key(&self, key_name: &Name) -> Name;

    /// Set the default certificate name. Not existence-checked.
    fn set_default_certificate_name_for_key(&self, certificate_name: &Name);

    /// Enumerate identities, optionally only the default one.
    ///
    /// # Errors
    ///
    /// `NotImplemented` in the reference backend.
    fn all_identities(&self, default_only: bool) -> Result<Vec<Name>>;

    /// Enumerate key names, optionally only defaults.
    ///
    /// # Errors
    ///
    /// `NotImplemented` in the reference backend.
    fn all_key_names(&self, default_only: bool) -> Result<Vec<Name>>;

    /// Enumerate key names owned by an identity, optionally only defaults.
    ///
    /// # Errors
    ///
    /// `NotImplemented` in the reference backend.
    fn all_key_names_of_identity(&self, identity: &Name, default_only: bool) -> Result<Vec<Name>>;

    /// Enumerate certificate names, optionally only defaults.
    ///
    /// # Errors
    ///
    /// `NotImplemented` in the reference backend.
    fn all_certificate_names(&self, default_only: bool) -> Result<Vec<Name>>;

    /// Enumerate certificate names owned by a key, optionally only
    /// defaults.
    ///
    /// # Errors
    ///
    /// `NotImplemented` in the reference backend.
    fn all_certificate_names_of_key(&self, key_name: &Name, default_only: bool)
        -> Result<Vec<Name>>;

    /// Delete a certificate record.
    ///
    /// # Errors
    ///
    /// `NotImplemented` in the reference backend.
    fn delete_certificate_info(&self, certificate_name: &Name) -> Result<()>;

    /// Delete a key record.
    ///
    /// # Errors
    ///
    /// `NotImplemented` in the reference backend.
    fn delete_public_key_info(&self, key_name: &Name) -> Result<()>;

    /// Delete an identity record.
    ///
    /// # Errors
    ///
    /// `NotImplemented` in the reference backend.
    fn delete_identity_info(&self, identity: &Name) -> Result<()>;
}
