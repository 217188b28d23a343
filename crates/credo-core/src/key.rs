//! Public-key info and its SubjectPublicKeyInfo sub-encoder.

use serde::{Deserialize, Serialize};

use crate::der::{self, Oid, Reader};
use crate::error::{CredoError, Result};

/// Key algorithm family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    /// RSA (also the fixed type used by the store's certificate cascade)
    #[default]
    Rsa,
    /// ECDSA
    Ecdsa,
}

impl KeyType {
    /// The algorithm OID written into SubjectPublicKeyInfo.
    #[must_use]
    pub fn algorithm_oid(self) -> Oid {
        let arcs = match self {
            // rsaEncryption
            Self::Rsa => vec![1, 2, 840, 113_549, 1, 1, 1],
            // id-ecPublicKey
            Self::Ecdsa => vec![1, 2, 840, 10_045, 2, 1],
        };
        Oid::new(arcs).expect("well-known algorithm OID")
    }

    fn from_oid(oid: &Oid) -> Option<Self> {
        [Self::Rsa, Self::Ecdsa]
            .into_iter()
            .find(|key_type| key_type.algorithm_oid() == *oid)
    }
}

/// Algorithm identifier plus raw key material, opaque beyond byte content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    key_type: KeyType,
    bits: Vec<u8>,
}

impl PublicKey {
    /// Wrap raw key bits.
    #[must_use]
    pub const fn new(key_type: KeyType, bits: Vec<u8>) -> Self {
        Self { key_type, bits }
    }

    /// The key's algorithm family.
    #[must_use]
    pub const fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// The raw key bits.
    #[must_use]
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// Append the SubjectPublicKeyInfo encoding:
    /// `SEQUENCE { SEQUENCE { OID, NULL }, BIT STRING }`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        let mut algorithm = Vec::new();
        der::write_oid(&mut algorithm, &self.key_type.algorithm_oid());
        der::write_null(&mut algorithm);

        let mut info = Vec::new();
        der::write_sequence(&mut info, &algorithm);
        der::write_bit_string(&mut info, &self.bits);

        der::write_sequence(out, &info);
    }

    /// Read a SubjectPublicKeyInfo. The NULL algorithm parameter may be
    /// absent on read.
    pub fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let mut info = reader.read_sequence()?;

        let mut algorithm = info.read_sequence()?;
        let oid = algorithm.read_oid()?;
        if !algorithm.is_empty() {
            algorithm.read_null()?;
        }
        algorithm.finish()?;

        let key_type = KeyType::from_oid(&oid)
            .ok_or_else(|| CredoError::Decode(format!("unsupported key algorithm {oid}")))?;

        let bits = info.read_bit_string()?;
        info.finish()?;

        Ok(Self { key_type, bits })
    }
}
