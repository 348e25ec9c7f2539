//! Timestamped signer: `value SEP base64(timestamp) SEP base64(signature)`.
//!
//! The timestamp is the signing time in Unix seconds, written as a big-endian
//! integer with leading zero bytes removed (at least one byte is always kept).
//! The outer signature covers both the value and the timestamp field.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::encoding::{base64_decode, base64_encode, concat, rsplit_once};
use crate::error::{Result, SignerError};
use crate::signer::Signer;

/// Width of the decoded timestamp integer.
const TIMESTAMP_LEN: usize = 8;

/// Minimal big-endian encoding of `timestamp`.
#[must_use]
pub fn encode_timestamp(timestamp: u64) -> Vec<u8> {
    let bytes = timestamp.to_be_bytes();
    let first = bytes
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(TIMESTAMP_LEN - 1);
    bytes.get(first..).unwrap_or_default().to_vec()
}

/// Parse a big-endian timestamp of one to eight bytes.
pub fn decode_timestamp(bytes: &[u8]) -> Result<u64> {
    if bytes.is_empty() || bytes.len() > TIMESTAMP_LEN {
        return Err(SignerError::BadTimeSignature("Malformed timestamp".into()));
    }
    let mut buf = [0u8; TIMESTAMP_LEN];
    let offset = TIMESTAMP_LEN - bytes.len();
    buf.get_mut(offset..)
        .ok_or_else(|| SignerError::BadTimeSignature("Malformed timestamp".into()))?
        .copy_from_slice(bytes);
    Ok(u64::from_be_bytes(buf))
}

/// Works like [`Signer`] but also records the signing time, so tokens can be
/// rejected once they are older than a caller-chosen age.
#[derive(Debug, Clone)]
pub struct TimestampSigner {
    signer: Signer,
}

impl TimestampSigner {
    #[must_use]
    pub fn new(signer: Signer) -> Self {
        Self { signer }
    }

    /// The signer producing the outer signature.
    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Current time in Unix seconds.
    pub fn get_timestamp() -> Result<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| SignerError::Clock(e.to_string()))
    }

    /// Convert Unix seconds to a `SystemTime`.
    pub fn timestamp_to_time(timestamp: u64) -> Result<SystemTime> {
        UNIX_EPOCH
            .checked_add(Duration::from_secs(timestamp))
            .ok_or_else(|| SignerError::BadTimeSignature("timestamp out of range".into()))
    }

    /// Sign `value` stamped with the current time.
    pub fn sign(&self, value: &[u8]) -> Result<Vec<u8>> {
        Ok(self.sign_at(value, Self::get_timestamp()?))
    }

    /// Sign `value` stamped with `timestamp` (Unix seconds).
    #[must_use]
    pub fn sign_at(&self, value: &[u8], timestamp: u64) -> Vec<u8> {
        let encoded = base64_encode(&encode_timestamp(timestamp));
        let stamped = concat(&[value, self.signer.separator(), &encoded]);
        self.signer.sign(&stamped)
    }

    /// Verify the signature and return the embedded signing time, without any age check.
    pub fn get_signed_timestamp(&self, token: &[u8]) -> Result<SystemTime> {
        let (_, timestamp) = self.open(token)?;
        Self::timestamp_to_time(timestamp)
    }

    /// Verify `token` and return its value.
    ///
    /// When `max_age > 0` the token must be at most `max_age` seconds old and not
    /// dated in the future. A `max_age` of zero or less disables the age check.
    pub fn unsign<'a>(&self, token: &'a [u8], max_age: i64) -> Result<&'a [u8]> {
        self.unsign_at(token, max_age, Self::get_timestamp()?)
    }

    /// Like [`unsign`](Self::unsign), measuring age against `now` (Unix seconds).
    pub fn unsign_at<'a>(&self, token: &'a [u8], max_age: i64, now: u64) -> Result<&'a [u8]> {
        let (value, timestamp) = self.open(token)?;
        check_age(timestamp, max_age, now)?;
        Ok(value)
    }

    /// Verify `token` and return both its value and signing time.
    pub fn unsign_with_timestamp<'a>(
        &self,
        token: &'a [u8],
        max_age: i64,
    ) -> Result<(&'a [u8], SystemTime)> {
        let (value, timestamp) = self.open(token)?;
        check_age(timestamp, max_age, Self::get_timestamp()?)?;
        Ok((value, Self::timestamp_to_time(timestamp)?))
    }

    #[must_use]
    pub fn validate(&self, token: &[u8], max_age: i64) -> bool {
        self.unsign(token, max_age).is_ok()
    }

    /// Check the outer signature, then split off and parse the timestamp field.
    fn open<'a>(&self, token: &'a [u8]) -> Result<(&'a [u8], u64)> {
        let stamped = self.signer.unsign(token)?;

        let Some((value, ts_field)) = rsplit_once(stamped, self.signer.separator()) else {
            debug!("signed value carries no timestamp field");
            return Err(SignerError::BadTimeSignature("timestamp missing".into()));
        };

        let ts_bytes = base64_decode(ts_field)?;
        let timestamp = decode_timestamp(&ts_bytes).inspect_err(|_| {
            debug!(ts_len = ts_bytes.len(), "timestamp field is malformed");
        })?;
        Ok((value, timestamp))
    }
}

impl From<Signer> for TimestampSigner {
    fn from(signer: Signer) -> Self {
        Self::new(signer)
    }
}

fn check_age(timestamp: u64, max_age: i64, now: u64) -> Result<()> {
    if max_age <= 0 {
        return Ok(());
    }

    let age = i128::from(now) - i128::from(timestamp);
    if age > i128::from(max_age) {
        debug!(%age, max_age, "signature expired");
        return Err(SignerError::SignatureExpired {
            message: format!("Signature age {age} > {max_age} seconds"),
            signed_at: timestamp,
        });
    }
    if age < 0 {
        debug!(%age, "signature dated in the future");
        return Err(SignerError::SignatureExpired {
            message: format!("Signature age {age} < 0 seconds"),
            signed_at: timestamp,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::KeyDerivation;

    const SIGNED_AT: u64 = 1_700_000_000;

    fn ts_signer() -> TimestampSigner {
        TimestampSigner::new(Signer::new("secret-key"))
    }

    #[test]
    fn test_encode_timestamp_is_minimal() {
        assert_eq!(encode_timestamp(0), vec![0]);
        assert_eq!(encode_timestamp(1), vec![1]);
        assert_eq!(encode_timestamp(255), vec![0xff]);
        assert_eq!(encode_timestamp(256), vec![1, 0]);
        assert_eq!(encode_timestamp(SIGNED_AT), vec![0x65, 0x53, 0xf1, 0x00]);
        assert_eq!(encode_timestamp(u64::MAX), vec![0xff; 8]);
    }

    #[test]
    fn test_decode_timestamp_ignores_leading_zeros() {
        assert_eq!(decode_timestamp(&[0]).unwrap(), 0);
        assert_eq!(decode_timestamp(&[0, 0, 1]).unwrap(), 1);
        assert_eq!(decode_timestamp(&[0; 8]).unwrap(), 0);
        assert_eq!(decode_timestamp(&[0x65, 0x53, 0xf1, 0x00]).unwrap(), SIGNED_AT);
        assert_eq!(decode_timestamp(&[0xff; 8]).unwrap(), u64::MAX);
    }

    #[test]
    fn test_decode_timestamp_rejects_bad_widths() {
        for bad in [&[0u8; 0][..], &[0u8; 9][..]] {
            assert_eq!(
                decode_timestamp(bad).unwrap_err(),
                SignerError::BadTimeSignature("Malformed timestamp".into())
            );
        }
    }

    #[test]
    fn test_reference_layout() {
        let token = ts_signer().sign_at(b"hello", SIGNED_AT);
        assert_eq!(token, b"hello.ZVPxAA.UQx3EIPGLNk6IyY28rz4wwlRRWI");
    }

    #[test]
    fn test_zero_timestamp_roundtrip() {
        let signer = ts_signer();
        let token = signer.sign_at(b"hello", 0);
        assert_eq!(token, b"hello.AA.qoC8JJpgziE6NTDW7TUx0ZFAFyo");
        assert_eq!(signer.unsign_at(&token, 0, 10).unwrap(), b"hello");
        assert_eq!(signer.get_signed_timestamp(&token).unwrap(), UNIX_EPOCH);
    }

    #[test]
    fn test_expiry_boundary() {
        let signer = ts_signer();
        let token = signer.sign_at(b"v", SIGNED_AT);

        assert_eq!(signer.unsign_at(&token, 60, SIGNED_AT + 60).unwrap(), b"v");

        let err = signer.unsign_at(&token, 60, SIGNED_AT + 61).unwrap_err();
        assert_eq!(
            err,
            SignerError::SignatureExpired {
                message: "Signature age 61 > 60 seconds".into(),
                signed_at: SIGNED_AT,
            }
        );
    }

    #[test]
    fn test_fresh_token_accepted() {
        let signer = ts_signer();
        let token = signer.sign_at(b"v", SIGNED_AT);
        assert_eq!(signer.unsign_at(&token, 60, SIGNED_AT).unwrap(), b"v");
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let signer = ts_signer();
        let token = signer.sign_at(b"v", SIGNED_AT + 5);
        let err = signer.unsign_at(&token, 60, SIGNED_AT).unwrap_err();
        assert_eq!(
            err,
            SignerError::SignatureExpired {
                message: "Signature age -5 < 0 seconds".into(),
                signed_at: SIGNED_AT + 5,
            }
        );
    }

    #[test]
    fn test_non_positive_max_age_skips_age_check() {
        let signer = ts_signer();
        let old = signer.sign_at(b"v", 1);
        let future = signer.sign_at(b"v", u64::MAX);
        for max_age in [0, -1, i64::MIN] {
            assert_eq!(signer.unsign_at(&old, max_age, SIGNED_AT).unwrap(), b"v");
            assert_eq!(signer.unsign_at(&future, max_age, SIGNED_AT).unwrap(), b"v");
        }
    }

    #[test]
    fn test_full_width_timestamp_roundtrip() {
        let signer = ts_signer();
        let token = signer.sign_at(b"v", u64::MAX);
        assert_eq!(signer.unsign_at(&token, 0, 0).unwrap(), b"v");
        assert!(matches!(
            signer.unsign_at(&token, 10, SIGNED_AT),
            Err(SignerError::SignatureExpired { signed_at: u64::MAX, .. })
        ));
    }

    #[test]
    fn test_value_containing_separator() {
        let signer = ts_signer();
        let token = signer.sign_at(b"a.b.c", SIGNED_AT);
        assert_eq!(signer.unsign_at(&token, 10, SIGNED_AT).unwrap(), b"a.b.c");
    }

    #[test]
    fn test_timestamp_missing() {
        let signer = ts_signer();
        let token = signer.signer().sign(b"hello");
        let err = signer.unsign_at(&token, 0, SIGNED_AT).unwrap_err();
        assert_eq!(err, SignerError::BadTimeSignature("timestamp missing".into()));
        assert_eq!(
            signer.get_signed_timestamp(&token).unwrap_err(),
            SignerError::BadTimeSignature("timestamp missing".into())
        );
    }

    #[test]
    fn test_malformed_timestamp() {
        let signer = ts_signer();
        // Twelve base64 characters decode to nine bytes.
        let oversized = signer.signer().sign(b"hello.AAAAAAAAAAAA");
        let empty = signer.signer().sign(b"hello.");
        for token in [oversized, empty] {
            assert_eq!(
                signer.unsign_at(&token, 0, SIGNED_AT).unwrap_err(),
                SignerError::BadTimeSignature("Malformed timestamp".into())
            );
        }
    }

    #[test]
    fn test_timestamp_bad_base64() {
        let signer = ts_signer();
        let token = signer.signer().sign(b"hello.!!");
        assert!(matches!(
            signer.unsign_at(&token, 0, SIGNED_AT),
            Err(SignerError::BadData(_))
        ));
    }

    #[test]
    fn test_padded_fields_rejected() {
        let signer = ts_signer();
        let mut padded_sig = signer.sign_at(b"hello", SIGNED_AT);
        padded_sig.push(b'=');
        assert!(matches!(
            signer.unsign_at(&padded_sig, 0, SIGNED_AT),
            Err(SignerError::BadData(_))
        ));

        let padded_ts = signer.signer().sign(b"hello.ZVPxAA==");
        assert_eq!(
            signer.unsign_at(&padded_ts, 0, SIGNED_AT).unwrap_err(),
            SignerError::BadData("Invalid base64-encoded data".into())
        );
    }

    #[test]
    fn test_tampered_timestamp_rejected() {
        let signer = ts_signer();
        let token = signer.sign_at(b"v", SIGNED_AT);
        let forged = String::from_utf8(token)
            .unwrap()
            .replacen("ZVPxAA", "ZVPxAQ", 1);
        assert!(matches!(
            signer.unsign_at(forged.as_bytes(), 0, SIGNED_AT),
            Err(SignerError::BadData(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = ts_signer().sign_at(b"v", SIGNED_AT);
        let other = TimestampSigner::new(Signer::new("other-key"));
        assert!(matches!(
            other.unsign_at(&token, 0, SIGNED_AT),
            Err(SignerError::BadData(_))
        ));
    }

    #[test]
    fn test_custom_configuration() {
        let signer: TimestampSigner = Signer::builder("k")
            .separator("|")
            .key_derivation(KeyDerivation::Hmac)
            .build()
            .unwrap()
            .into();
        let token = signer.sign_at(b"x|y", SIGNED_AT);
        assert_eq!(signer.unsign_at(&token, 5, SIGNED_AT + 5).unwrap(), b"x|y");
    }

    #[test]
    fn test_sign_with_system_clock() {
        let signer = ts_signer();
        let token = signer.sign(b"now").unwrap();
        assert_eq!(signer.unsign(&token, 60).unwrap(), b"now");
        assert!(signer.validate(&token, 60));

        let (value, signed_at) = signer.unsign_with_timestamp(&token, 60).unwrap();
        assert_eq!(value, b"now");
        assert_eq!(signer.get_signed_timestamp(&token).unwrap(), signed_at);
        assert!(signed_at <= SystemTime::now());
    }

    #[test]
    fn test_validate_collapses_errors() {
        let signer = ts_signer();
        let stale = signer.sign_at(b"v", 1);
        assert!(!signer.validate(&stale, 60));
        assert!(signer.validate(&stale, 0));
        assert!(!signer.validate(b"garbage", 0));
    }
}
