//! The certificate entity and its canonical binary codec.
//!
//! A certificate is a signed object whose content attests that a public
//! key belongs to a subject for a bounded validity window. The content
//! encoding is a DER structure layered on the signed-object container:
//!
//! ```text
//! IdCert ::= SEQUENCE {
//!     validity   SEQUENCE { notBefore GeneralizedTime,
//!                           notAfter  GeneralizedTime },
//!     subject    SEQUENCE OF SEQUENCE { OID, PrintableString },
//!     keyInfo    SubjectPublicKeyInfo,
//!     extensions SEQUENCE OF SEQUENCE { OID, BOOLEAN, OCTET STRING }
//!                OPTIONAL }
//! ```
//!
//! The extensions sub-sequence is emitted only when the extension list is
//! non-empty; a decoder treats end-of-parent as "zero extensions" rather
//! than an error. Certificate names follow the convention
//! `<key-name>/ID-CERT/<certificate-id>`.

use std::fmt;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::der::{self, Oid, Reader};
use crate::error::Result;
use crate::key::PublicKey;
use crate::name::Name;
use crate::object::{ContentType, SignatureInfo, SignedObject};

/// Name component marking a certificate name.
pub const ID_CERT_COMPONENT: &str = "ID-CERT";

/// One subject attribute: an OID and its string value. Order within a
/// certificate is significant for encoding only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectDescription {
    /// Attribute type, e.g. `2.5.4.41` (name)
    pub oid: Oid,
    /// Attribute value
    pub value: String,
}

impl SubjectDescription {
    /// Pair an attribute OID with its value.
    #[must_use]
    pub fn new(oid: Oid, value: impl Into<String>) -> Self {
        Self { oid, value: value.into() }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut entry = Vec::new();
        der::write_oid(&mut entry, &self.oid);
        der::write_printable_string(&mut entry, &self.value);
        der::write_sequence(out, &entry);
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let mut entry = reader.read_sequence()?;
        let oid = entry.read_oid()?;
        let value = entry.read_string()?;
        entry.finish()?;
        Ok(Self { oid, value })
    }
}

/// One certificate extension: id, criticality, opaque value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateExtension {
    /// Extension id
    pub id: Oid,
    /// Whether a consumer must understand this extension
    pub critical: bool,
    /// Opaque extension bytes
    pub value: Vec<u8>,
}

impl CertificateExtension {
    /// Build an extension triple.
    #[must_use]
    pub fn new(id: Oid, critical: bool, value: Vec<u8>) -> Self {
        Self { id, critical, value }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut entry = Vec::new();
        der::write_oid(&mut entry, &self.id);
        der::write_boolean(&mut entry, self.critical);
        der::write_octet_string(&mut entry, &self.value);
        der::write_sequence(out, &entry);
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let mut entry = reader.read_sequence()?;
        let id = entry.read_oid()?;
        // critical defaults to false and may be omitted by DER producers.
        let critical = match entry.peek_tag() {
            Some(der::tag::BOOLEAN) => entry.read_boolean()?,
            _ => false,
        };
        let value = entry.read_octet_string()?;
        entry.finish()?;
        Ok(Self { id, critical, value })
    }
}

/// A named public-key certificate with a bounded validity window.
#[derive(Debug, Clone, PartialEq)]
pub struct Certificate {
    name: Name,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    subject: Vec<SubjectDescription>,
    key: PublicKey,
    extensions: Vec<CertificateExtension>,
    signature: Option<SignatureInfo>,
}

impl Certificate {
    /// Build a certificate by direct field assignment (the encode path).
    /// `not_before <= not_after` is expected but not enforced here; the
    /// window is checked against wall clock at validation time.
    #[must_use]
    pub const fn new(
        name: Name,
        not_before: DateTime<Utc>,
        not_after: DateTime<Utc>,
        key: PublicKey,
    ) -> Self {
        Self {
            name,
            not_before,
            not_after,
            subject: Vec::new(),
            key,
            extensions: Vec::new(),
            signature: None,
        }
    }

    /// Append a subject attribute; encoding preserves insertion order.
    pub fn add_subject_description(&mut self, description: SubjectDescription) {
        self.subject.push(description);
    }

    /// Append an extension; encoding preserves insertion order.
    pub fn add_extension(&mut self, extension: CertificateExtension) {
        self.extensions.push(extension);
    }

    /// Certificate name, `<key-name>/ID-CERT/<certificate-id>`.
    #[must_use]
    pub const fn name(&self) -> &Name {
        &self.name
    }

    /// Start of the validity window.
    #[must_use]
    pub const fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of the validity window.
    #[must_use]
    pub const fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Subject attributes in encoding order.
    #[must_use]
    pub fn subject(&self) -> &[SubjectDescription] {
        &self.subject
    }

    /// The certified public key.
    #[must_use]
    pub const fn key(&self) -> &PublicKey {
        &self.key
    }

    /// Extensions in encoding order; empty for most certificates.
    #[must_use]
    pub fn extensions(&self) -> &[CertificateExtension] {
        &self.extensions
    }

    /// Signature metadata of the carrying signed object, when this
    /// certificate was decoded from one.
    #[must_use]
    pub const fn signature(&self) -> Option<&SignatureInfo> {
        self.signature.as_ref()
    }

    /// True before the validity window opens, against wall clock.
    #[must_use]
    pub fn is_too_early(&self) -> bool {
        self.is_too_early_at(Utc::now())
    }

    /// True after the validity window closes, against wall clock.
    #[must_use]
    pub fn is_too_late(&self) -> bool {
        self.is_too_late_at(Utc::now())
    }

    /// Window-open check at an explicit instant; `not_before` itself is
    /// inside the window.
    #[must_use]
    pub fn is_too_early_at(&self, at: DateTime<Utc>) -> bool {
        at < self.not_before
    }

    /// Window-close check at an explicit instant; `not_after` itself is
    /// inside the window.
    #[must_use]
    pub fn is_too_late_at(&self, at: DateTime<Utc>) -> bool {
        at > self.not_after
    }

    /// The key name this certificate belongs to: the components before
    /// the `ID-CERT` marker. `None` when the name has no marker.
    #[must_use]
    pub fn public_key_name(&self) -> Option<Name> {
        let index = self
            .name
            .components()
            .iter()
            .position(|component| component == ID_CERT_COMPONENT)?;
        Some(self.name.prefix(index))
    }

    /// Encode the certificate content to its canonical bytes.
    #[must_use]
    pub fn encode_content(&self) -> Vec<u8> {
        let mut validity = Vec::new();
        der::write_generalized_time(&mut validity, &self.not_before);
        der::write_generalized_time(&mut validity, &self.not_after);

        let mut subject = Vec::new();
        for description in &self.subject {
            description.encode(&mut subject);
        }

        let mut body = Vec::new();
        der::write_sequence(&mut body, &validity);
        der::write_sequence(&mut body, &subject);
        self.key.encode(&mut body);

        if !self.extensions.is_empty() {
            let mut extensions = Vec::new();
            for extension in &self.extensions {
                extension.encode(&mut extensions);
            }
            der::write_sequence(&mut body, &extensions);
        }

        let mut out = Vec::new();
        der::write_sequence(&mut out, &body);
        out
    }

    /// Decode a certificate from a signed object, carrying over its name
    /// and signature metadata.
    ///
    /// # Errors
    ///
    /// Returns `CredoError::Decode` on any structural mismatch; no partial
    /// certificate value is produced.
    pub fn from_signed_object(object: &SignedObject) -> Result<Self> {
        let mut outer = Reader::new(&object.content);
        let mut cert = outer.read_sequence()?;

        let mut validity = cert.read_sequence()?;
        let not_before = validity.read_time()?;
        let not_after = validity.read_time()?;
        validity.finish()?;

        let mut subject_reader = cert.read_sequence()?;
        let mut subject = Vec::new();
        while !subject_reader.is_empty() {
            subject.push(SubjectDescription::decode(&mut subject_reader)?);
        }

        let key = PublicKey::decode(&mut cert)?;

        // Extensions are present only when the parent sequence has bytes
        // left; end-of-parent means zero extensions.
        let mut extensions = Vec::new();
        if !cert.is_empty() {
            let mut extension_reader = cert.read_sequence()?;
            while !extension_reader.is_empty() {
                extensions.push(CertificateExtension::decode(&mut extension_reader)?);
            }
            cert.finish()?;
        }
        outer.finish()?;

        Ok(Self {
            name: object.name.clone(),
            not_before,
            not_after,
            subject,
            key,
            extensions,
            signature: Some(object.signature.clone()),
        })
    }

    /// Wrap the encoded content in a key-typed signed object. Signature
    /// metadata is carried over when present, empty otherwise.
    #[must_use]
    pub fn to_signed_object(&self) -> SignedObject {
        SignedObject {
            name: self.name.clone(),
            content: self.encode_content(),
            content_type: ContentType::Key,
            signature: self.signature.clone().unwrap_or_default(),
        }
    }

    /// Human-readable report of the certificate.
    #[must_use]
    pub fn summary(&self) -> CertificateSummary {
        CertificateSummary {
            name: self.name.to_uri(),
            not_before: self.not_before,
            not_after: self.not_after,
            subject: self
                .subject
                .iter()
                .map(|d| (d.oid.to_string(), d.value.clone()))
                .collect(),
            public_key_b64: B64.encode(self.key.bits()),
            extensions: self
                .extensions
                .iter()
                .map(|e| ExtensionSummary {
                    id: e.id.to_string(),
                    critical: e.critical,
                    value_hex: hex::encode(&e.value),
                })
                .collect(),
        }
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.summary(), f)
    }
}

/// Serializable certificate report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateSummary {
    /// Certificate name URI
    pub name: String,
    /// Start of the validity window
    pub not_before: DateTime<Utc>,
    /// End of the validity window
    pub not_after: DateTime<Utc>,
    /// Subject attributes as (OID, value) pairs
    pub subject: Vec<(String, String)>,
    /// Base64 of the raw key bits
    pub public_key_b64: String,
    /// Extension reports, empty for most certificates
    pub extensions: Vec<ExtensionSummary>,
}

/// Serializable extension report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionSummary {
    /// Extension id
    pub id: String,
    /// Criticality flag
    pub critical: bool,
    /// Hex of the opaque extension bytes
    pub value_hex: String,
}

impl fmt::Display for CertificateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Certificate name:")?;
        writeln!(f, "  {}", self.name)?;
        writeln!(f, "Validity:")?;
        writeln!(f, "  NotBefore: {}", self.not_before.format("%Y-%m-%dT%H:%M:%S"))?;
        writeln!(f, "  NotAfter: {}", self.not_after.format("%Y-%m-%dT%H:%M:%S"))?;
        writeln!(f, "Subject Description:")?;
        for (oid, value) in &self.subject {
            writeln!(f, "  {oid}: {value}")?;
        }
        if !self.extensions.is_empty() {
            writeln!(f, "Extensions:")?;
            for extension in &self.extensions {
                writeln!(
                    f,
                    "  {} (critical: {}): {}",
                    extension.id, extension.critical, extension.value_hex
                )?;
            }
        }
        writeln!(f, "Public key bits:")?;
        for chunk in self.public_key_b64.as_bytes().chunks(64) {
            // chunks of an ASCII string stay ASCII
            writeln!(f, "  {}", String::from_utf8_lossy(chunk))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyType;
    use chrono::TimeZone;

    fn rsa_key() -> PublicKey {
        PublicKey::new(KeyType::Rsa, vec![0x30, 0x48, 0x02, 0x41, 0x00, 0xde, 0xad, 0xbe, 0xef])
    }

    fn alice_cert() -> Certificate {
        let mut cert = Certificate::new(
            Name::from_uri("/alice/KEY/1/ID-CERT/1"),
            Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap(),
            rsa_key(),
        );
        cert.add_subject_description(SubjectDescription::new("2.5.4.41".parse().unwrap(), "Alice"));
        cert
    }

    fn decode(cert: &Certificate) -> Certificate {
        Certificate::from_signed_object(&cert.to_signed_object()).unwrap()
    }

    #[test]
    fn round_trip_without_extensions() {
        let cert = alice_cert();
        let decoded = decode(&cert);

        assert_eq!(decoded.name().to_uri(), "/alice/KEY/1/ID-CERT/1");
        assert_eq!(decoded.not_before(), cert.not_before());
        assert_eq!(decoded.not_after(), cert.not_after());
        assert_eq!(decoded.subject(), cert.subject());
        assert_eq!(decoded.key(), cert.key());
        assert!(decoded.extensions().is_empty());
    }

    #[test]
    fn round_trip_with_extensions() {
        let mut cert = alice_cert();
        cert.add_extension(CertificateExtension::new(
            "2.5.29.19".parse().unwrap(),
            true,
            vec![0x30, 0x00],
        ));
        cert.add_extension(CertificateExtension::new(
            "2.5.29.15".parse().unwrap(),
            false,
            vec![0x03, 0x02, 0x05, 0xa0],
        ));

        let decoded = decode(&cert);
        assert_eq!(decoded.extensions(), cert.extensions());
        assert_eq!(decoded.subject(), cert.subject());
    }

    #[test]
    fn extensions_sequence_omitted_when_empty() {
        let with_extensions = {
            let mut cert = alice_cert();
            cert.add_extension(CertificateExtension::new(
                "2.5.29.19".parse().unwrap(),
                false,
                vec![],
            ));
            cert.encode_content()
        };
        let without = alice_cert().encode_content();
        assert!(without.len() < with_extensions.len());

        // The no-extensions body ends right after the key info.
        let decoded = decode(&alice_cert());
        assert!(decoded.extensions().is_empty());
    }

    #[test]
    fn absent_critical_flag_reads_as_false() {
        // A producer relying on DEFAULT FALSE omits the BOOLEAN entirely.
        let mut entry = Vec::new();
        der::write_oid(&mut entry, &"2.5.29.19".parse().unwrap());
        der::write_octet_string(&mut entry, &[0x01]);
        let mut extension = Vec::new();
        der::write_sequence(&mut extension, &entry);

        let mut reader = Reader::new(&extension);
        let decoded = CertificateExtension::decode(&mut reader).unwrap();
        assert!(!decoded.critical);
        assert_eq!(decoded.value, vec![0x01]);
    }

    #[test]
    fn truncation_before_key_info_is_contained() {
        let cert = alice_cert();
        let full = cert.encode_content();

        // Cut the content off midway through the subject sequence, well
        // before the key info begins.
        let mut object = cert.to_signed_object();
        object.content = full[..full.len() / 2].to_vec();

        let err = Certificate::from_signed_object(&object).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn garbage_content_is_a_decode_error() {
        let mut object = alice_cert().to_signed_object();
        object.content = vec![0xff, 0x00, 0x13];
        assert!(Certificate::from_signed_object(&object).unwrap_err().is_decode());
    }

    #[test]
    fn validity_window_boundaries_are_inclusive() {
        let cert = alice_cert();
        let t0 = cert.not_before();
        let t1 = cert.not_after();
        let instant = chrono::Duration::seconds(1);

        assert!(!cert.is_too_early_at(t0));
        assert!(!cert.is_too_late_at(t1));
        assert!(cert.is_too_early_at(t0 - instant));
        assert!(cert.is_too_late_at(t1 + instant));
        assert!(!cert.is_too_early_at(t0 + instant));
        assert!(!cert.is_too_late_at(t1 - instant));
    }

    #[test]
    fn public_key_name_strips_id_cert_suffix() {
        let cert = alice_cert();
        assert_eq!(cert.public_key_name(), Some(Name::from_uri("/alice/KEY/1")));

        let no_marker = Certificate::new(
            Name::from_uri("/alice/oddly-named"),
            cert.not_before(),
            cert.not_after(),
            rsa_key(),
        );
        assert!(no_marker.public_key_name().is_none());
    }

    #[test]
    fn signed_object_is_key_typed_and_keeps_signature() {
        let cert = alice_cert();
        let object = cert.to_signed_object();
        assert_eq!(object.content_type, ContentType::Key);

        let signed = object.with_signature(SignatureInfo::new(
            Name::from_uri("/root/ksk-1/ID-CERT/1"),
            vec![0x01],
        ));
        let decoded = Certificate::from_signed_object(&signed).unwrap();
        assert_eq!(
            decoded.signature().map(|s| s.key_locator.to_uri()),
            Some("/root/ksk-1/ID-CERT/1".to_string())
        );
    }

    #[test]
    fn scenario_alice_2013() {
        // Encode /alice/KEY/1/ID-CERT/1 with validity 2013-01-01..2014-01-01,
        // one subject description (2.5.4.41, "Alice"), an RSA key and no
        // extensions; decode must reproduce every field.
        let cert = alice_cert();
        let decoded = decode(&cert);

        assert_eq!(decoded.name(), cert.name());
        assert_eq!(decoded.not_before(), Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(decoded.not_after(), Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(decoded.subject().len(), 1);
        assert_eq!(decoded.subject()[0].oid.to_string(), "2.5.4.41");
        assert_eq!(decoded.subject()[0].value, "Alice");
        assert_eq!(decoded.key().bits(), cert.key().bits());
        assert!(decoded.extensions().is_empty());
    }

    #[test]
    fn summary_renders_fields() {
        let mut cert = alice_cert();
        cert.add_extension(CertificateExtension::new(
            "2.5.29.19".parse().unwrap(),
            true,
            vec![0xab, 0xcd],
        ));
        let summary = cert.summary();
        assert_eq!(summary.name, "/alice/KEY/1/ID-CERT/1");
        assert_eq!(summary.subject, vec![("2.5.4.41".to_string(), "Alice".to_string())]);
        assert_eq!(summary.extensions[0].value_hex, "abcd");

        let text = summary.to_string();
        assert!(text.contains("Certificate name:"));
        assert!(text.contains("NotBefore: 2013-01-01T00:00:00"));
        assert!(text.contains("2.5.4.41: Alice"));

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"public_key_b64\""));
    }
}
