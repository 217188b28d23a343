//! The cryptographic-provider boundary.
//!
//! Signature verification is opaque to the trust core: policies hand an
//! object and the candidate public key to a [`SignatureVerifier`] and act
//! on the boolean. Deployments plug in their crypto provider here; tests
//! plug in stubs.

use credo_core::{PublicKey, Result, SignedObject};

/// Opaque signature-verification provider.
pub trait SignatureVerifier: Send + Sync {
    /// True when `object`'s signature verifies under `key`.
    ///
    /// # Errors
    ///
    /// Provider-specific failures (malformed key material, unsupported
    /// algorithm); policies treat an error as a failed check.
    fn verify(&self, object: &SignedObject, key: &PublicKey) -> Result<bool>;
}
