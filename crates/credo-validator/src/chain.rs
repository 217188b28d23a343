//! Hierarchical chain-walking policy.
//!
//! `ChainPolicy` follows key locators from the object under validation up
//! through fetched certificate material until it reaches a certificate
//! anchored in the trust store. Every link is checked for validity window
//! and signature; the first signer certificate that is neither anchored
//! nor already fetched becomes a pending fetch request.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use credo_core::{Certificate, Name, SignedObject};
use credo_store::TrustStore;

use crate::policy::{PolicyDecision, TrustPolicy, ValidationRequest};
use crate::verify::SignatureVerifier;

/// Policy that accepts an object once its certificate chain reaches a
/// store-anchored certificate with every link verified.
pub struct ChainPolicy {
    store: Arc<dyn TrustStore>,
    verifier: Arc<dyn SignatureVerifier>,
}

impl ChainPolicy {
    /// Build a chain policy over the given trust anchors and crypto
    /// provider.
    #[must_use]
    pub fn new(store: Arc<dyn TrustStore>, verifier: Arc<dyn SignatureVerifier>) -> Self {
        Self { store, verifier }
    }

    /// The signer certificate for a locator: anchored in the store, or
    /// already fetched, or absent. The boolean marks an anchor.
    fn resolve_signer(
        &self,
        locator: &Name,
        chain: &[Arc<Certificate>],
    ) -> Option<(Arc<Certificate>, bool)> {
        if let Ok(anchor) = self.store.certificate(locator) {
            return Some((anchor, true));
        }
        chain
            .iter()
            .find(|certificate| certificate.name() == locator)
            .map(|certificate| (certificate.clone(), false))
    }
}

impl TrustPolicy for ChainPolicy {
    fn evaluate(
        &self,
        object: &SignedObject,
        _step: u32,
        chain: &[Arc<Certificate>],
    ) -> PolicyDecision {
        let mut target = object.clone();
        let mut seen: HashSet<Name> = HashSet::new();

        loop {
            let locator = target.signature.key_locator.clone();
            if locator.is_empty() {
                return PolicyDecision::Reject(format!(
                    "object {} carries no key locator",
                    target.name
                ));
            }
            if !seen.insert(locator.clone()) {
                return PolicyDecision::Reject(format!(
                    "certificate chain through {locator} loops without reaching a trust anchor"
                ));
            }

            let Some((signer, anchored)) = self.resolve_signer(&locator, chain) else {
                debug!(certificate = %locator, "signer certificate not yet known");
                return PolicyDecision::Pending(vec![ValidationRequest::new(locator)]);
            };

            if signer.is_too_early() || signer.is_too_late() {
                return PolicyDecision::Reject(format!(
                    "signer certificate {} is outside its validity window",
                    signer.name()
                ));
            }

            match self.verifier.verify(&target, signer.key()) {
                Ok(true) => {}
                Ok(false) => {
                    return PolicyDecision::Reject(format!(
                        "signature verification failed for {}",
                        target.name
                    ));
                }
                Err(e) => {
                    return PolicyDecision::Reject(format!(
                        "signature verification error for {}: {e}",
                        target.name
                    ));
                }
            }

            if anchored {
                debug!(anchor = %signer.name(), "chain reached trust anchor");
                return PolicyDecision::Accept;
            }

            // Climb one link: the fetched signer certificate becomes the
            // next object to verify.
            match signer.signature() {
                Some(signature) if !signature.key_locator.is_empty() => {
                    target = signer.to_signed_object();
                }
                _ => {
                    return PolicyDecision::Reject(format!(
                        "certificate {} is not anchored and names no signer",
                        signer.name()
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use credo_core::{KeyType, PublicKey, Result, SignatureInfo};
    use credo_store::MemoryTrustStore;

    struct StubVerifier {
        outcome: bool,
    }

    impl SignatureVerifier for StubVerifier {
        fn verify(&self, _object: &SignedObject, _key: &PublicKey) -> Result<bool> {
            Ok(self.outcome)
        }
    }

    fn key(byte: u8) -> PublicKey {
        PublicKey::new(KeyType::Rsa, vec![byte; 4])
    }

    fn cert(name: &str, signer: Option<&str>) -> Certificate {
        let mut certificate = Certificate::new(
            Name::from_uri(name),
            Utc::now() - Duration::days(1),
            Utc::now() + Duration::days(1),
            key(0xaa),
        );
        if let Some(signer) = signer {
            let object = certificate
                .to_signed_object()
                .with_signature(SignatureInfo::new(Name::from_uri(signer), vec![0x5a]));
            certificate = Certificate::from_signed_object(&object).unwrap();
        }
        certificate
    }

    fn object_signed_by(locator: &str) -> SignedObject {
        SignedObject::new(Name::from_uri("/data/1"), vec![1, 2, 3])
            .with_signature(SignatureInfo::new(Name::from_uri(locator), vec![0x5a]))
    }

    fn policy(store: &Arc<MemoryTrustStore>, outcome: bool) -> ChainPolicy {
        ChainPolicy::new(store.clone(), Arc::new(StubVerifier { outcome }))
    }

    #[test]
    fn anchored_signer_accepts() {
        let store = Arc::new(MemoryTrustStore::new());
        store.add_certificate(&cert("/root/ksk-1/ID-CERT/1", None));

        let decision = policy(&store, true).evaluate(&object_signed_by("/root/ksk-1/ID-CERT/1"), 0, &[]);
        assert_eq!(decision, PolicyDecision::Accept);
    }

    #[test]
    fn unknown_signer_is_requested() {
        let store = Arc::new(MemoryTrustStore::new());
        let decision = policy(&store, true).evaluate(&object_signed_by("/root/ksk-1/ID-CERT/1"), 0, &[]);
        assert_eq!(
            decision,
            PolicyDecision::Pending(vec![ValidationRequest::new(Name::from_uri(
                "/root/ksk-1/ID-CERT/1"
            ))])
        );
    }

    #[test]
    fn fetched_intermediate_climbs_to_anchor() {
        let store = Arc::new(MemoryTrustStore::new());
        store.add_certificate(&cert("/root/ksk-1/ID-CERT/1", None));

        let intermediate = Arc::new(cert("/root/alice/ksk-2/ID-CERT/1", Some("/root/ksk-1/ID-CERT/1")));
        let chain = vec![intermediate];

        let decision =
            policy(&store, true).evaluate(&object_signed_by("/root/alice/ksk-2/ID-CERT/1"), 1, &chain);
        assert_eq!(decision, PolicyDecision::Accept);
    }

    #[test]
    fn failed_signature_rejects() {
        let store = Arc::new(MemoryTrustStore::new());
        store.add_certificate(&cert("/root/ksk-1/ID-CERT/1", None));

        let decision = policy(&store, false).evaluate(&object_signed_by("/root/ksk-1/ID-CERT/1"), 0, &[]);
        match decision {
            PolicyDecision::Reject(reason) => assert!(reason.contains("signature verification failed")),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn expired_signer_rejects() {
        let store = Arc::new(MemoryTrustStore::new());
        let mut expired = Certificate::new(
            Name::from_uri("/root/ksk-1/ID-CERT/1"),
            Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap(),
            key(0xaa),
        );
        expired.add_subject_description(credo_core::SubjectDescription::new(
            "2.5.4.41".parse().unwrap(),
            "Old Root",
        ));
        store.add_certificate(&expired);

        let decision = policy(&store, true).evaluate(&object_signed_by("/root/ksk-1/ID-CERT/1"), 0, &[]);
        match decision {
            PolicyDecision::Reject(reason) => assert!(reason.contains("validity window")),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn missing_key_locator_rejects() {
        let store = Arc::new(MemoryTrustStore::new());
        let unsigned = SignedObject::new(Name::from_uri("/data/1"), vec![1]);
        let decision = policy(&store, true).evaluate(&unsigned, 0, &[]);
        match decision {
            PolicyDecision::Reject(reason) => assert!(reason.contains("no key locator")),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn unanchored_loop_rejects_instead_of_spinning() {
        let store = Arc::new(MemoryTrustStore::new());
        let a = Arc::new(cert("/a/ksk-1/ID-CERT/1", Some("/b/ksk-1/ID-CERT/1")));
        let b = Arc::new(cert("/b/ksk-1/ID-CERT/1", Some("/a/ksk-1/ID-CERT/1")));
        let chain = vec![a, b];

        let decision = policy(&store, true).evaluate(&object_signed_by("/a/ksk-1/ID-CERT/1"), 2, &chain);
        match decision {
            PolicyDecision::Reject(reason) => assert!(reason.contains("loops")),
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
