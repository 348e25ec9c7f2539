//! Signature algorithms: compute and check a raw MAC over a message.

use subtle::ConstantTimeEq;

use crate::types::DigestMethod;

/// A strategy that signs a message under an already-derived key.
pub trait SigningAlgorithm: Send + Sync {
    /// Raw (unencoded) signature of `message` under `key`.
    fn get_signature(&self, key: &[u8], message: &[u8]) -> Vec<u8>;

    /// Recompute the signature and compare it against `sig` in constant time.
    fn verify_signature(&self, key: &[u8], message: &[u8], sig: &[u8]) -> bool {
        let expected = self.get_signature(key, message);
        expected.as_slice().ct_eq(sig).into()
    }
}

/// Emits a fixed one-byte marker for every message.
///
/// Useful for tests and demonstrations only: any holder can forge it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneAlgorithm;

impl NoneAlgorithm {
    pub const MARKER: &'static [u8] = b"b";
}

impl SigningAlgorithm for NoneAlgorithm {
    fn get_signature(&self, _key: &[u8], _message: &[u8]) -> Vec<u8> {
        Self::MARKER.to_vec()
    }
}

/// HMAC over the configured digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacAlgorithm {
    digest_method: DigestMethod,
}

impl HmacAlgorithm {
    #[must_use]
    pub const fn new(digest_method: DigestMethod) -> Self {
        Self { digest_method }
    }
}

impl SigningAlgorithm for HmacAlgorithm {
    fn get_signature(&self, key: &[u8], message: &[u8]) -> Vec<u8> {
        self.digest_method.hmac(key, message)
    }

    /// Signatures of the wrong length are rejected without computing the MAC.
    fn verify_signature(&self, key: &[u8], message: &[u8], sig: &[u8]) -> bool {
        if sig.len() != self.digest_method.output_len() {
            return false;
        }
        let expected = self.get_signature(key, message);
        expected.as_slice().ct_eq(sig).into()
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_none_algorithm_marker() {
        let alg = NoneAlgorithm;
        assert_eq!(alg.get_signature(b"k1", b"m1"), b"b");
        assert_eq!(alg.get_signature(b"k2", b"m2"), b"b");
        assert!(alg.verify_signature(b"any", b"thing", b"b"));
        assert!(!alg.verify_signature(b"any", b"thing", b"c"));
    }

    #[test]
    fn test_hmac_algorithm_verifies_own_signature() {
        let alg = HmacAlgorithm::new(DigestMethod::Sha256);
        let sig = alg.get_signature(b"key", b"message");
        assert_eq!(sig.len(), 32);
        assert!(alg.verify_signature(b"key", b"message", &sig));
    }

    #[test]
    fn test_hmac_algorithm_rejects_wrong_key_or_message() {
        let alg = HmacAlgorithm::default();
        let sig = alg.get_signature(b"key", b"message");
        assert!(!alg.verify_signature(b"other", b"message", &sig));
        assert!(!alg.verify_signature(b"key", b"messagf", &sig));
    }

    #[test]
    fn test_hmac_algorithm_rejects_truncated_signature() {
        let alg = HmacAlgorithm::default();
        let sig = alg.get_signature(b"key", b"message");
        assert!(!alg.verify_signature(b"key", b"message", &sig[..sig.len() - 1]));
        assert!(!alg.verify_signature(b"key", b"message", b""));

        let mut extended = sig.clone();
        extended.push(0);
        assert!(!alg.verify_signature(b"key", b"message", &extended));
    }

    #[test]
    fn test_hmac_length_check_per_digest() {
        for dm in [DigestMethod::Sha224, DigestMethod::Sha384, DigestMethod::Sha512] {
            let alg = HmacAlgorithm::new(dm);
            let sig = alg.get_signature(b"key", b"message");
            assert!(alg.verify_signature(b"key", b"message", &sig));
            assert!(!alg.verify_signature(b"key", b"message", &sig[..20]));
        }
    }

    #[test]
    fn test_hmac_default_digest_is_sha1() {
        let sig = HmacAlgorithm::default().get_signature(b"key", b"message");
        assert_eq!(sig.len(), DigestMethod::Sha1.output_len());
    }

    #[test]
    fn test_algorithms_are_object_safe() {
        let algs: Vec<Box<dyn SigningAlgorithm>> =
            vec![Box::new(NoneAlgorithm), Box::new(HmacAlgorithm::default())];
        for alg in &algs {
            let sig = alg.get_signature(b"k", b"m");
            assert!(alg.verify_signature(b"k", b"m", &sig));
        }
    }
}
