//! The validation engine.
//!
//! One validation attempt is a cooperative chain of suspend/resume steps:
//! the engine calls the policy synchronously; when the policy names
//! certificates it still needs, the engine fetches them, appends the
//! decoded material to the attempt's chain, and re-enters the policy with
//! the step counter incremented. The step bound is the sole safeguard
//! against cyclic certificate graphs -- there is no identity-based cycle
//! detection.
//!
//! Independent attempts share nothing and may run concurrently; the steps
//! of a single attempt never overlap.

use std::fmt;
use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::{debug, warn};

use credo_core::{Certificate, Name, Result, SignedObject};

use crate::fetch::CertificateFetcher;
use crate::policy::{PolicyDecision, TrustPolicy};

/// Engine configuration.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorConfig {
    /// Maximum number of recursive re-entries before unconditional
    /// rejection, regardless of what the policy would decide.
    pub max_steps: u32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { max_steps: 10 }
    }
}

impl ValidatorConfig {
    /// The default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_steps: 10 }
    }

    /// Set the step bound.
    #[must_use]
    pub const fn max_steps(mut self, max: u32) -> Self {
        self.max_steps = max;
        self
    }
}

/// Terminal state of one validation attempt. Exactly one outcome is
/// produced per top-level [`Validator::validate`] call.
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    /// The object is trusted.
    Validated(Arc<SignedObject>),
    /// The object is not trusted, with a diagnostic reason.
    Failed {
        /// The object that failed validation
        object: Arc<SignedObject>,
        /// Human-readable failure reason
        reason: String,
    },
}

impl ValidationOutcome {
    /// True for the accepting outcome.
    #[must_use]
    pub const fn is_validated(&self) -> bool {
        matches!(self, Self::Validated(_))
    }

    /// The failure reason, if the attempt failed.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Validated(_) => None,
            Self::Failed { reason, .. } => Some(reason),
        }
    }

    /// The object the attempt was about.
    #[must_use]
    pub const fn object(&self) -> &Arc<SignedObject> {
        match self {
            Self::Validated(object) | Self::Failed { object, .. } => object,
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validated(object) => write!(f, "validated {}", object.name),
            Self::Failed { object, reason } => write!(f, "failed {}: {reason}", object.name),
        }
    }
}

/// Policy-driven recursive certificate-chain validator.
pub struct Validator {
    policy: Arc<dyn TrustPolicy>,
    fetcher: Arc<dyn CertificateFetcher>,
    config: ValidatorConfig,
}

impl Validator {
    /// Build a validator with the default configuration.
    #[must_use]
    pub fn new(policy: Arc<dyn TrustPolicy>, fetcher: Arc<dyn CertificateFetcher>) -> Self {
        Self::with_config(policy, fetcher, ValidatorConfig::default())
    }

    /// Build a validator with an explicit configuration.
    #[must_use]
    pub const fn with_config(
        policy: Arc<dyn TrustPolicy>,
        fetcher: Arc<dyn CertificateFetcher>,
        config: ValidatorConfig,
    ) -> Self {
        Self { policy, fetcher, config }
    }

    /// Run one validation attempt to its terminal state.
    ///
    /// The object and all fetched certificates stay alive across every
    /// suspension point via shared ownership; the outcome is delivered
    /// exactly once as the return value.
    pub async fn validate(&self, object: Arc<SignedObject>) -> ValidationOutcome {
        let mut step: u32 = 0;
        let mut chain: Vec<Arc<Certificate>> = Vec::new();

        loop {
            if step > self.config.max_steps {
                debug!(object = %object.name, step, "step bound exhausted");
                return ValidationOutcome::Failed {
                    object,
                    reason: format!(
                        "maximum validation steps exceeded ({})",
                        self.config.max_steps
                    ),
                };
            }

            match self.policy.evaluate(&object, step, &chain) {
                PolicyDecision::Accept => {
                    debug!(object = %object.name, step, "policy accepted");
                    return ValidationOutcome::Validated(object);
                }
                PolicyDecision::Reject(reason) => {
                    debug!(object = %object.name, step, reason = %reason, "policy rejected");
                    return ValidationOutcome::Failed { object, reason };
                }
                PolicyDecision::Pending(requests) if requests.is_empty() => {
                    // A policy that neither decides nor requests anything
                    // would stall the attempt forever.
                    warn!(object = %object.name, step, "policy returned no decision and no requests");
                    return ValidationOutcome::Failed {
                        object,
                        reason: "policy produced no decision and no pending requests".into(),
                    };
                }
                PolicyDecision::Pending(requests) => {
                    debug!(
                        object = %object.name,
                        step,
                        pending = requests.len(),
                        "fetching certificates for pending requests"
                    );
                    let fetches = requests
                        .iter()
                        .map(|request| self.fetch_certificate(&request.certificate_name));
                    match try_join_all(fetches).await {
                        Ok(certificates) => {
                            chain.extend(certificates);
                            step += 1;
                        }
                        Err(e) => {
                            return ValidationOutcome::Failed {
                                object,
                                reason: format!("certificate fetch failed: {e}"),
                            };
                        }
                    }
                }
            }
        }
    }

    /// Fetch and decode one certificate. Bytes that fail certificate
    /// decoding are a chain-link failure, never a usable certificate.
    async fn fetch_certificate(&self, name: &Name) -> Result<Arc<Certificate>> {
        let object = self.fetcher.fetch(name).await?;
        let certificate = Certificate::from_signed_object(&object)?;
        Ok(Arc::new(certificate))
    }
}
