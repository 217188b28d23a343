//! Minimal DER read/write primitives for the certificate schema.
//!
//! Only the handful of universal types the certificate content uses are
//! implemented: SEQUENCE, OBJECT IDENTIFIER, BOOLEAN, OCTET STRING,
//! BIT STRING, PrintableString and GeneralizedTime. Encoding is strict
//! DER with definite lengths; decoding keeps the leniencies older
//! producers relied on (UTCTime and UTF8String accepted on read).
//!
//! Readers operate over a borrowed slice and report end-of-sequence, which
//! is what drives the presence-conditional extensions branch in the
//! certificate decoder.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{CredoError, Result};

/// Universal tag numbers used by the certificate schema.
pub mod tag {
    /// BOOLEAN
    pub const BOOLEAN: u8 = 0x01;
    /// BIT STRING
    pub const BIT_STRING: u8 = 0x03;
    /// OCTET STRING
    pub const OCTET_STRING: u8 = 0x04;
    /// NULL
    pub const NULL: u8 = 0x05;
    /// OBJECT IDENTIFIER
    pub const OID: u8 = 0x06;
    /// UTF8String
    pub const UTF8_STRING: u8 = 0x0c;
    /// PrintableString
    pub const PRINTABLE_STRING: u8 = 0x13;
    /// UTCTime
    pub const UTC_TIME: u8 = 0x17;
    /// GeneralizedTime
    pub const GENERALIZED_TIME: u8 = 0x18;
    /// SEQUENCE / SEQUENCE OF (constructed)
    pub const SEQUENCE: u8 = 0x30;
}

/// An object identifier in arc form, e.g. `2.5.4.41`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Oid(Vec<u64>);

impl Oid {
    /// Build an OID from its arcs.
    ///
    /// # Errors
    ///
    /// Returns `CredoError::Decode` if there are fewer than two arcs, the
    /// first arc exceeds 2, or the second arc exceeds 39 under arc 0 or 1.
    pub fn new(arcs: Vec<u64>) -> Result<Self> {
        if arcs.len() < 2 {
            return Err(CredoError::Decode("OID needs at least two arcs".into()));
        }
        if arcs[0] > 2 {
            return Err(CredoError::Decode(format!("OID first arc {} out of range", arcs[0])));
        }
        if arcs[0] < 2 && arcs[1] > 39 {
            return Err(CredoError::Decode(format!("OID second arc {} out of range", arcs[1])));
        }
        Ok(Self(arcs))
    }

    /// The arcs in order.
    #[must_use]
    pub fn arcs(&self) -> &[u64] {
        &self.0
    }

    fn to_der_content(&self) -> Vec<u8> {
        let mut content = Vec::new();
        write_base128(&mut content, 40 * self.0[0] + self.0[1]);
        for arc in &self.0[2..] {
            write_base128(&mut content, *arc);
        }
        content
    }

    fn from_der_content(content: &[u8]) -> Result<Self> {
        if content.is_empty() {
            return Err(CredoError::Decode("empty OID".into()));
        }
        let mut pos = 0;
        let first = read_base128(content, &mut pos)?;
        let arc0 = (first / 40).min(2);
        let mut arcs = vec![arc0, first - 40 * arc0];
        while pos < content.len() {
            arcs.push(read_base128(content, &mut pos)?);
        }
        Ok(Self(arcs))
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{arc}")?;
        }
        Ok(())
    }
}

impl FromStr for Oid {
    type Err = CredoError;

    fn from_str(s: &str) -> Result<Self> {
        let arcs = s
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| CredoError::Decode(format!("malformed OID arc {part:?}")))
            })
            .collect::<Result<Vec<u64>>>()?;
        Self::new(arcs)
    }
}

fn write_base128(out: &mut Vec<u8>, value: u64) {
    let mut stack = [0u8; 10];
    let mut n = 0;
    let mut v = value;
    loop {
        stack[n] = (v & 0x7f) as u8;
        v >>= 7;
        n += 1;
        if v == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        out.push(if i == 0 { stack[i] } else { stack[i] | 0x80 });
    }
}

fn read_base128(bytes: &[u8], pos: &mut usize) -> Result<u64> {
    let mut value: u64 = 0;
    loop {
        let byte = *bytes
            .get(*pos)
            .ok_or_else(|| CredoError::Decode("truncated OID arc".into()))?;
        *pos += 1;
        if value > (u64::MAX >> 7) {
            return Err(CredoError::Decode("OID arc overflows 64 bits".into()));
        }
        value = (value << 7) | u64::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
}

// --- writer side ---

/// Append one TLV with a definite length.
pub fn write_tlv(out: &mut Vec<u8>, tag: u8, content: &[u8]) {
    out.push(tag);
    write_len(out, content.len());
    out.extend_from_slice(content);
}

fn write_len(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

/// Append a SEQUENCE wrapping already-encoded content.
pub fn write_sequence(out: &mut Vec<u8>, content: &[u8]) {
    write_tlv(out, tag::SEQUENCE, content);
}

/// Append an OBJECT IDENTIFIER.
pub fn write_oid(out: &mut Vec<u8>, oid: &Oid) {
    write_tlv(out, tag::OID, &oid.to_der_content());
}

/// Append a BOOLEAN (`0xff` for true per DER).
pub fn write_boolean(out: &mut Vec<u8>, value: bool) {
    write_tlv(out, tag::BOOLEAN, &[if value { 0xff } else { 0x00 }]);
}

/// Append an OCTET STRING.
pub fn write_octet_string(out: &mut Vec<u8>, bytes: &[u8]) {
    write_tlv(out, tag::OCTET_STRING, bytes);
}

/// Append a BIT STRING with zero unused bits.
pub fn write_bit_string(out: &mut Vec<u8>, bits: &[u8]) {
    let mut content = Vec::with_capacity(bits.len() + 1);
    content.push(0x00);
    content.extend_from_slice(bits);
    write_tlv(out, tag::BIT_STRING, &content);
}

/// Append a NULL.
pub fn write_null(out: &mut Vec<u8>) {
    out.extend_from_slice(&[tag::NULL, 0x00]);
}

/// Append a PrintableString.
pub fn write_printable_string(out: &mut Vec<u8>, value: &str) {
    write_tlv(out, tag::PRINTABLE_STRING, value.as_bytes());
}

/// Append a GeneralizedTime in `YYYYMMDDHHMMSSZ` form.
pub fn write_generalized_time(out: &mut Vec<u8>, time: &DateTime<Utc>) {
    let text = format!("{}Z", time.format("%Y%m%d%H%M%S"));
    write_tlv(out, tag::GENERALIZED_TIME, text.as_bytes());
}

// --- reader side ---

/// Cursor over a DER-encoded slice.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Wrap a byte slice.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// True when the cursor has consumed every byte. Inside a nested
    /// sequence reader this is the sequence-boundary test.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// The next tag byte without consuming it.
    #[must_use]
    pub fn peek_tag(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn read_byte(&mut self) -> Result<u8> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| CredoError::Decode("truncated value".into()))?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_len(&mut self) -> Result<usize> {
        let first = self.read_byte()?;
        if first < 0x80 {
            return Ok(usize::from(first));
        }
        let count = usize::from(first & 0x7f);
        if count == 0 {
            return Err(CredoError::Decode("indefinite length not supported".into()));
        }
        if count > 4 {
            return Err(CredoError::Decode("length too large".into()));
        }
        let mut len: usize = 0;
        for _ in 0..count {
            len = (len << 8) | usize::from(self.read_byte()?);
        }
        Ok(len)
    }

    fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| CredoError::Decode("value extends past end of input".into()))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Read one TLV, requiring the given tag, returning its content.
    pub fn read_tlv(&mut self, expected: u8) -> Result<&'a [u8]> {
        let tag = self.read_byte()?;
        if tag != expected {
            return Err(CredoError::Decode(format!(
                "expected tag 0x{expected:02x}, got 0x{tag:02x}"
            )));
        }
        let len = self.read_len()?;
        self.read_exact(len)
    }

    /// Enter a SEQUENCE, returning a reader over its content.
    pub fn read_sequence(&mut self) -> Result<Reader<'a>> {
        Ok(Reader::new(self.read_tlv(tag::SEQUENCE)?))
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        Oid::from_der_content(self.read_tlv(tag::OID)?)
    }

    /// Read a BOOLEAN. Any non-zero content byte is true.
    pub fn read_boolean(&mut self) -> Result<bool> {
        let content = self.read_tlv(tag::BOOLEAN)?;
        if content.len() != 1 {
            return Err(CredoError::Decode("BOOLEAN must be one byte".into()));
        }
        Ok(content[0] != 0)
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Vec<u8>> {
        Ok(self.read_tlv(tag::OCTET_STRING)?.to_vec())
    }

    /// Read a BIT STRING, requiring zero unused bits.
    pub fn read_bit_string(&mut self) -> Result<Vec<u8>> {
        let content = self.read_tlv(tag::BIT_STRING)?;
        match content.split_first() {
            Some((0, bits)) => Ok(bits.to_vec()),
            Some((unused, _)) => Err(CredoError::Decode(format!(
                "BIT STRING with {unused} unused bits not supported"
            ))),
            None => Err(CredoError::Decode("empty BIT STRING".into())),
        }
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let content = self.read_tlv(tag::NULL)?;
        if content.is_empty() {
            Ok(())
        } else {
            Err(CredoError::Decode("NULL with content".into()))
        }
    }

    /// Read a PrintableString or UTF8String as UTF-8 text.
    pub fn read_string(&mut self) -> Result<String> {
        let content = match self.peek_tag() {
            Some(tag::PRINTABLE_STRING) => self.read_tlv(tag::PRINTABLE_STRING)?,
            Some(tag::UTF8_STRING) => self.read_tlv(tag::UTF8_STRING)?,
            Some(tag) => {
                return Err(CredoError::Decode(format!(
                    "expected string value, got tag 0x{tag:02x}"
                )))
            }
            None => return Err(CredoError::Decode("truncated string value".into())),
        };
        String::from_utf8(content.to_vec())
            .map_err(|_| CredoError::Decode("string value is not UTF-8".into()))
    }

    /// Read a GeneralizedTime or UTCTime as a UTC timestamp.
    pub fn read_time(&mut self) -> Result<DateTime<Utc>> {
        match self.peek_tag() {
            Some(tag::GENERALIZED_TIME) => {
                let text = self.read_tlv(tag::GENERALIZED_TIME)?;
                parse_time(text, false)
            }
            Some(tag::UTC_TIME) => {
                let text = self.read_tlv(tag::UTC_TIME)?;
                parse_time(text, true)
            }
            Some(tag) => Err(CredoError::Decode(format!(
                "expected time value, got tag 0x{tag:02x}"
            ))),
            None => Err(CredoError::Decode("truncated time value".into())),
        }
    }

    /// Require that every byte was consumed.
    pub fn finish(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CredoError::Decode(format!(
                "{} trailing bytes after value",
                self.buf.len() - self.pos
            )))
        }
    }
}

fn parse_time(text: &[u8], utc_time: bool) -> Result<DateTime<Utc>> {
    let text = std::str::from_utf8(text)
        .map_err(|_| CredoError::Decode("time value is not ASCII".into()))?;
    let digits = text
        .strip_suffix('Z')
        .ok_or_else(|| CredoError::Decode(format!("time value {text:?} does not end in Z")))?;
    let expected = if utc_time { 12 } else { 14 };
    if digits.len() != expected || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CredoError::Decode(format!("malformed time value {text:?}")));
    }

    let (year, rest) = if utc_time {
        // Two-digit years per RFC 5280: 50..=99 map to 19xx, 00..=49 to 20xx.
        let yy: i32 = digits[..2].parse().map_err(|_| bad_time(text))?;
        (if yy >= 50 { 1900 + yy } else { 2000 + yy }, &digits[2..])
    } else {
        (digits[..4].parse().map_err(|_| bad_time(text))?, &digits[4..])
    };
    let month: u32 = rest[..2].parse().map_err(|_| bad_time(text))?;
    let day: u32 = rest[2..4].parse().map_err(|_| bad_time(text))?;
    let hour: u32 = rest[4..6].parse().map_err(|_| bad_time(text))?;
    let minute: u32 = rest[6..8].parse().map_err(|_| bad_time(text))?;
    let second: u32 = rest[8..10].parse().map_err(|_| bad_time(text))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| bad_time(text))
}

fn bad_time(text: &str) -> CredoError {
    CredoError::Decode(format!("time value {text:?} out of range"))
}
