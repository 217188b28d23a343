//! The trust-policy extension point.
//!
//! A policy is the pluggable decision logic for one evaluation step: given
//! the object under validation, the current step count, and whatever
//! certificate material has been fetched so far, it decides to accept, to
//! reject with a reason, or to name the certificates still needed. New
//! trust models are new [`TrustPolicy`] implementations, not engine
//! changes.

use std::sync::Arc;

use credo_core::{Certificate, Name, SignedObject};

/// A certificate the policy still needs before it can decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    /// Name of the certificate to fetch
    pub certificate_name: Name,
}

impl ValidationRequest {
    /// Request the certificate with the given name.
    #[must_use]
    pub const fn new(certificate_name: Name) -> Self {
        Self { certificate_name }
    }
}

/// Outcome of one policy evaluation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// The object is trusted; validation ends.
    Accept,
    /// The object is not trusted; validation ends with this reason.
    Reject(String),
    /// More certificates are needed. Returning an empty request list is a
    /// contract violation the engine converts to a rejection.
    Pending(Vec<ValidationRequest>),
}

/// Pluggable trust decision logic.
pub trait TrustPolicy: Send + Sync {
    /// Evaluate one step. `chain` holds the certificates fetched so far
    /// for this validation attempt, in fetch order.
    fn evaluate(
        &self,
        object: &SignedObject,
        step: u32,
        chain: &[Arc<Certificate>],
    ) -> PolicyDecision;
}

/// The no-trust-checking policy: accepts every object on first
/// evaluation with zero pending requests. Doubles as the minimal example
/// of the policy interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllPolicy;

impl TrustPolicy for AcceptAllPolicy {
    fn evaluate(
        &self,
        _object: &SignedObject,
        _step: u32,
        _chain: &[Arc<Certificate>],
    ) -> PolicyDecision {
        PolicyDecision::Accept
    }
}
