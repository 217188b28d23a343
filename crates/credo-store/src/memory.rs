//! In-memory reference trust store.
//!
//! A minimal harness for the validation engine, not a production
//! registry: enumeration, deletion and revocation report
//! `NotImplemented`. Reads are concurrent; writes serialize on an
//! internal lock so a completed add is atomically visible.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use credo_core::{Certificate, CredoError, KeyType, Name, PublicKey, Result};

use crate::store::{KeyRecord, TrustStore};

/// In-memory [`TrustStore`] backend.
#[derive(Debug, Default)]
pub struct MemoryTrustStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    identities: HashSet<String>,
    keys: HashMap<String, KeyRecord>,
    certificates: HashMap<String, Arc<Certificate>>,
    // One default slot per kind for the whole store, not per identity or
    // per key. The identity default is existence-checked; the other two
    // are not.
    default_identity: Name,
    default_key_name: Name,
    default_certificate_name: Name,
}

impl MemoryTrustStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("trust store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("trust store lock poisoned")
    }
}

impl Inner {
    fn add_identity(&mut self, identity: &Name) {
        self.identities.insert(identity.to_uri());
    }

    fn add_public_key(&mut self, key_name: &Name, key_type: KeyType, key: &PublicKey) {
        self.add_identity(&key_name.parent());
        self.keys
            .insert(key_name.to_uri(), KeyRecord::new(key_type, key.clone()));
    }
}

const fn not_implemented<T>(operation: &'static str) -> Result<T> {
    Err(CredoError::NotImplemented { operation })
}

impl TrustStore for MemoryTrustStore {
    fn does_identity_exist(&self, identity: &Name) -> bool {
        self.read().identities.contains(&identity.to_uri())
    }

    fn add_identity(&self, identity: &Name) {
        self.write().add_identity(identity);
    }

    fn revoke_identity(&self) -> Result<()> {
        not_implemented("revoke_identity")
    }

    fn does_public_key_exist(&self, key_name: &Name) -> bool {
        self.read().keys.contains_key(&key_name.to_uri())
    }

    fn add_public_key(&self, key_name: &Name, key_type: KeyType, key: &PublicKey) {
        self.write().add_public_key(key_name, key_type, key);
    }

    fn public_key(&self, key_name: &Name) -> Result<KeyRecord> {
        self.read()
            .keys
            .get(&key_name.to_uri())
            .cloned()
            .ok_or_else(|| CredoError::NotFound { name: key_name.to_uri() })
    }

    fn does_certificate_exist(&self, certificate_name: &Name) -> bool {
        self.read()
            .certificates
            .contains_key(&certificate_name.to_uri())
    }

    fn add_certificate(&self, certificate: &Certificate) {
        let Some(key_name) = certificate.public_key_name() else {
            warn!(
                name = %certificate.name(),
                "certificate name has no ID-CERT marker, skipping"
            );
            return;
        };

        let mut inner = self.write();
        inner.add_identity(&key_name.parent());
        inner.add_public_key(&key_name, KeyType::Rsa, certificate.key());
        inner
            .certificates
            .insert(certificate.name().to_uri(), Arc::new(certificate.clone()));
        debug!(name = %certificate.name(), key = %key_name, "certificate recorded");
    }

    fn certificate(&self, certificate_name: &Name) -> Result<Arc<Certificate>> {
        self.read()
            .certificates
            .get(&certificate_name.to_uri())
            .cloned()
            .ok_or_else(|| CredoError::NotFound { name: certificate_name.to_uri() })
    }

    fn default_identity(&self) -> Name {
        self.read().default_identity.clone()
    }

    fn set_default_identity(&self, identity: &Name) {
        let mut inner = self.write();
        if inner.identities.contains(&identity.to_uri()) {
            inner.default_identity = identity.clone();
        } else {
            // Never point the default at a nonexistent identity.
            inner.default_identity = Name::empty();
        }
    }

    fn default_key_name_for_identity(&self, _identity: &Name) -> Name {
        self.read().default_key_name.clone()
    }

    fn set_default_key_name_for_identity(&self, key_name: &Name) {
        self.write().default_key_name = key_name.clone();
    }

    fn default_certificate_name_for_key(&self, _key_name: &Name) -> Name {
        self.read().default_certificate_name.clone()
    }

    fn set_default_certificate_name_for_key(&self, certificate_name: &Name) {
        self.write().default_certificate_name = certificate_name.clone();
    }

    fn all_identities(&self, _default_only: bool) -> Result<Vec<Name>> {
        not_implemented("all_identities")
    }

    fn all_key_names(&self, _default_only: bool) -> Result<Vec<Name>> {
        not_implemented("all_key_names")
    }

    fn all_key_names_of_identity(&self, _identity: &Name, _default_only: bool) -> Result<Vec<Name>> {
        not_implemented("all_key_names_of_identity")
    }

    fn all_certificate_names(&self, _default_only: bool) -> Result<Vec<Name>> {
        not_implemented("all_certificate_names")
    }

    fn all_certificate_names_of_key(
        &self,
        _key_name: &Name,
        _default_only: bool,
    ) -> Result<Vec<Name>> {
        not_implemented("all_certificate_names_of_key")
    }

    fn delete_certificate_info(&self, _certificate_name: &Name) -> Result<()> {
        not_implemented("delete_certificate_info")
    }

    fn delete_public_key_info(&self, _key_name: &Name) -> Result<()> {
        not_implemented("delete_public_key_info")
    }

    fn delete_identity_info(&self, _identity: &Name) -> Result<()> {
        not_implemented("delete_identity_info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use credo_core::KeyType;

    fn rsa_key() -> PublicKey {
        PublicKey::new(KeyType::Rsa, vec![0x01, 0x02, 0x03])
    }

    fn cert(name: &str) -> Certificate {
        Certificate::new(
            Name::from_uri(name),
            Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap(),
            rsa_key(),
        )
    }

    #[test]
    fn add_identity_is_idempotent() {
        let store = MemoryTrustStore::new();
        let alice = Name::from_uri("/alice");

        assert!(!store.does_identity_exist(&alice));
        store.add_identity(&alice);
        assert!(store.does_identity_exist(&alice));
        store.add_identity(&alice);
        assert!(store.does_identity_exist(&alice));
        assert_eq!(store.read().identities.len(), 1);
    }

    #[test]
    fn add_public_key_cascades_to_identity() {
        let store = MemoryTrustStore::new();
        let key_name = Name::from_uri("/alice/ksk-1");

        store.add_public_key(&key_name, KeyType::Ecdsa, &rsa_key());
        assert!(store.does_public_key_exist(&key_name));
        assert!(store.does_identity_exist(&Name::from_uri("/alice")));

        let record = store.public_key(&key_name).unwrap();
        assert_eq!(record.key_type, KeyType::Ecdsa);
    }

    #[test]
    fn add_certificate_cascades_to_key_and_identity() {
        let store = MemoryTrustStore::new();
        let certificate = cert("/alice/ksk-1/ID-CERT/1");

        store.add_certificate(&certificate);

        assert!(store.does_certificate_exist(&Name::from_uri("/alice/ksk-1/ID-CERT/1")));
        assert!(store.does_public_key_exist(&Name::from_uri("/alice/ksk-1")));
        assert!(store.does_identity_exist(&Name::from_uri("/alice")));

        // The cascade registers keys with the fixed default type.
        let record = store.public_key(&Name::from_uri("/alice/ksk-1")).unwrap();
        assert_eq!(record.key_type, KeyType::Rsa);

        let stored = store.certificate(certificate.name()).unwrap();
        assert_eq!(*stored, certificate);
    }

    #[test]
    fn certificate_without_marker_is_skipped_not_fatal() {
        let store = MemoryTrustStore::new();
        store.add_certificate(&cert("/alice/no-marker"));
        assert!(!store.does_certificate_exist(&Name::from_uri("/alice/no-marker")));
        assert!(!store.does_identity_exist(&Name::from_uri("/alice")));
    }

    #[test]
    fn missing_lookups_are_not_found() {
        let store = MemoryTrustStore::new();
        assert!(store.public_key(&Name::from_uri("/nobody/ksk-1")).unwrap_err().is_not_found());
        assert!(store
            .certificate(&Name::from_uri("/nobody/ksk-1/ID-CERT/1"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn default_identity_is_existence_checked() {
        let store = MemoryTrustStore::new();
        assert!(store.default_identity().is_empty());

        store.add_identity(&Name::from_uri("/alice"));
        store.set_default_identity(&Name::from_uri("/alice"));
        assert_eq!(store.default_identity(), Name::from_uri("/alice"));

        // Setting an unknown identity clears the default.
        store.set_default_identity(&Name::from_uri("/mallory"));
        assert!(store.default_identity().is_empty());
    }

    #[test]
    fn key_and_certificate_defaults_are_not_existence_checked() {
        let store = MemoryTrustStore::new();

        // Neither name was ever added; both sets still stick.
        store.set_default_key_name_for_identity(&Name::from_uri("/ghost/ksk-9"));
        store.set_default_certificate_name_for_key(&Name::from_uri("/ghost/ksk-9/ID-CERT/9"));

        assert_eq!(
            store.default_key_name_for_identity(&Name::from_uri("/anyone")),
            Name::from_uri("/ghost/ksk-9")
        );
        assert_eq!(
            store.default_certificate_name_for_key(&Name::from_uri("/anyone/ksk-1")),
            Name::from_uri("/ghost/ksk-9/ID-CERT/9")
        );
    }

    #[test]
    fn default_key_slot_ignores_identity_argument() {
        let store = MemoryTrustStore::new();
        store.set_default_key_name_for_identity(&Name::from_uri("/alice/ksk-1"));

        // Single slot for the whole store.
        assert_eq!(
            store.default_key_name_for_identity(&Name::from_uri("/bob")),
            Name::from_uri("/alice/ksk-1")
        );
    }

    #[test]
    fn unsupported_operations_say_so() {
        let store = MemoryTrustStore::new();
        let name = Name::from_uri("/alice");

        assert!(store.revoke_identity().unwrap_err().is_not_implemented());
        assert!(store.all_identities(false).unwrap_err().is_not_implemented());
        assert!(store.all_key_names(true).unwrap_err().is_not_implemented());
        assert!(store
            .all_key_names_of_identity(&name, false)
            .unwrap_err()
            .is_not_implemented());
        assert!(store.all_certificate_names(false).unwrap_err().is_not_implemented());
        assert!(store
            .all_certificate_names_of_key(&name, false)
            .unwrap_err()
            .is_not_implemented());
        assert!(store.delete_certificate_info(&name).unwrap_err().is_not_implemented());
        assert!(store.delete_public_key_info(&name).unwrap_err().is_not_implemented());
        assert!(store.delete_identity_info(&name).unwrap_err().is_not_implemented());
    }
}
