//! The certificate-fetch collaborator boundary.
//!
//! The engine never talks to a network itself; it asks a fetcher for the
//! signed object carrying a named certificate and treats every failure
//! uniformly as "this chain link cannot be validated". Timeout handling
//! is entirely the fetcher's concern -- a timed-out fetch surfaces as an
//! error like any other.

use async_trait::async_trait;

use credo_core::{Name, Result, SignedObject};

/// Asynchronous source of certificate objects.
#[async_trait]
pub trait CertificateFetcher: Send + Sync {
    /// Fetch the signed object carrying the named certificate.
    ///
    /// # Errors
    ///
    /// `CredoError::Fetch` for not-found, timeout, or transport failures.
    async fn fetch(&self, certificate_name: &Name) -> Result<SignedObject>;
}
