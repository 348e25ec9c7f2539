//! Plain signer: `value SEP base64(signature)`.

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use zeroize::Zeroizing;

use crate::algorithm::{HmacAlgorithm, SigningAlgorithm};
use crate::encoding::{
    base64_decode, base64_encode, concat, is_ambiguous_separator, rsplit_once,
};
use crate::error::{Result, SignerError};
use crate::types::{
    DigestMethod, KeyDerivation, DEFAULT_SALT, DEFAULT_SEPARATOR, DJANGO_CONCAT_MARKER,
};

/// Signs values and verifies signed tokens under one fixed configuration.
///
/// A `Signer` never changes after [`SignerBuilder::build`] returns, so a single
/// instance can be shared across threads and reused for any number of calls.
#[derive(Clone)]
pub struct Signer {
    secret_key: Zeroizing<Vec<u8>>,
    salt: Vec<u8>,
    separator: Vec<u8>,
    key_derivation: KeyDerivation,
    digest_method: DigestMethod,
    algorithm: Arc<dyn SigningAlgorithm>,
}

impl Signer {
    /// A signer with every option at its default.
    #[must_use]
    pub fn new(secret_key: impl Into<Vec<u8>>) -> Self {
        let digest_method = DigestMethod::default();
        Self {
            secret_key: Zeroizing::new(secret_key.into()),
            salt: DEFAULT_SALT.to_vec(),
            separator: DEFAULT_SEPARATOR.to_vec(),
            key_derivation: KeyDerivation::default(),
            digest_method,
            algorithm: Arc::new(HmacAlgorithm::new(digest_method)),
        }
    }

    #[must_use]
    pub fn builder(secret_key: impl Into<Vec<u8>>) -> SignerBuilder {
        SignerBuilder::new(secret_key)
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn separator(&self) -> &[u8] {
        &self.separator
    }

    pub fn key_derivation(&self) -> KeyDerivation {
        self.key_derivation
    }

    pub fn digest_method(&self) -> DigestMethod {
        self.digest_method
    }

    /// Derive the signing key from `secret_override`, or from the configured
    /// secret when `None`.
    #[must_use]
    pub fn derive_key(&self, secret_override: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
        let secret = secret_override.unwrap_or(self.secret_key.as_slice());
        let key = match self.key_derivation {
            KeyDerivation::Concat => {
                let material = Zeroizing::new(concat(&[&self.salt, secret]));
                self.digest_method.digest(&material)
            }
            KeyDerivation::DjangoConcat => {
                let material =
                    Zeroizing::new(concat(&[&self.salt, DJANGO_CONCAT_MARKER, secret]));
                self.digest_method.digest(&material)
            }
            KeyDerivation::Hmac => self.digest_method.hmac(secret, &self.salt),
            KeyDerivation::None => secret.to_vec(),
        };
        Zeroizing::new(key)
    }

    /// Base64-encoded signature of `value`.
    #[must_use]
    pub fn get_signature(&self, value: &[u8]) -> Vec<u8> {
        let key = self.derive_key(None);
        let sig = self.algorithm.get_signature(&key, value);
        base64_encode(&sig)
    }

    /// `value ++ separator ++ signature`.
    #[must_use]
    pub fn sign(&self, value: &[u8]) -> Vec<u8> {
        let signature = self.get_signature(value);
        concat(&[value, &self.separator, &signature])
    }

    /// Check a base64-encoded signature against `value`. Undecodable signatures fail.
    #[must_use]
    pub fn verify_signature(&self, value: &[u8], encoded_sig: &[u8]) -> bool {
        let sig = match base64_decode(encoded_sig) {
            Ok(sig) => sig,
            Err(_) => {
                debug!(sig_len = encoded_sig.len(), "signature is not valid base64");
                return false;
            }
        };
        let key = self.derive_key(Some(self.secret_key.as_slice()));
        self.algorithm.verify_signature(&key, value, &sig)
    }

    /// Verify `token` and return the value it carries.
    pub fn unsign<'a>(&self, token: &'a [u8]) -> Result<&'a [u8]> {
        let Some((value, sig)) = rsplit_once(token, &self.separator) else {
            debug!(token_len = token.len(), "separator missing from token");
            return Err(SignerError::BadData(format!(
                "No {:?} found in value",
                String::from_utf8_lossy(&self.separator)
            )));
        };

        if self.verify_signature(value, sig) {
            return Ok(value);
        }

        debug!(value_len = value.len(), sig_len = sig.len(), "signature mismatch");
        Err(SignerError::BadData(format!(
            "Signature {:?} does not match",
            String::from_utf8_lossy(sig)
        )))
    }

    /// Whether `token` carries a valid signature.
    #[must_use]
    pub fn validate(&self, token: &[u8]) -> bool {
        self.unsign(token).is_ok()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("secret_key", &"[REDACTED]")
            .field("salt", &String::from_utf8_lossy(&self.salt))
            .field("separator", &String::from_utf8_lossy(&self.separator))
            .field("key_derivation", &self.key_derivation)
            .field("digest_method", &self.digest_method)
            .finish_non_exhaustive()
    }
}

/// Collects signer options; [`build`](SignerBuilder::build) fills in defaults and
/// validates the result.
pub struct SignerBuilder {
    secret_key: Zeroizing<Vec<u8>>,
    salt: Option<Vec<u8>>,
    separator: Option<Vec<u8>>,
    key_derivation: Option<KeyDerivation>,
    digest_method: Option<DigestMethod>,
    algorithm: Option<Arc<dyn SigningAlgorithm>>,
}

impl SignerBuilder {
    #[must_use]
    pub fn new(secret_key: impl Into<Vec<u8>>) -> Self {
        Self {
            secret_key: Zeroizing::new(secret_key.into()),
            salt: None,
            separator: None,
            key_derivation: None,
            digest_method: None,
            algorithm: None,
        }
    }

    #[must_use]
    pub fn salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    #[must_use]
    pub fn separator(mut self, separator: impl Into<Vec<u8>>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    #[must_use]
    pub fn key_derivation(mut self, key_derivation: KeyDerivation) -> Self {
        self.key_derivation = Some(key_derivation);
        self
    }

    #[must_use]
    pub fn digest_method(mut self, digest_method: DigestMethod) -> Self {
        self.digest_method = Some(digest_method);
        self
    }

    /// Replace the default HMAC algorithm.
    #[must_use]
    pub fn algorithm(mut self, algorithm: impl SigningAlgorithm + 'static) -> Self {
        self.algorithm = Some(Arc::new(algorithm));
        self
    }

    #[must_use]
    pub fn shared_algorithm(mut self, algorithm: Arc<dyn SigningAlgorithm>) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Resolve defaults and validate.
    ///
    /// Fails with [`SignerError::InvalidSeparator`] if the separator is empty or
    /// shares a byte with the base64url alphabet.
    pub fn build(self) -> Result<Signer> {
        let separator = self.separator.unwrap_or_else(|| DEFAULT_SEPARATOR.to_vec());
        if is_ambiguous_separator(&separator) {
            return Err(SignerError::InvalidSeparator(
                String::from_utf8_lossy(&separator).into_owned(),
            ));
        }

        let digest_method = self.digest_method.unwrap_or_default();
        let algorithm = self
            .algorithm
            .unwrap_or_else(|| Arc::new(HmacAlgorithm::new(digest_method)));

        Ok(Signer {
            secret_key: self.secret_key,
            salt: self.salt.unwrap_or_else(|| DEFAULT_SALT.to_vec()),
            separator,
            key_derivation: self.key_derivation.unwrap_or_default(),
            digest_method,
            algorithm,
        })
    }
}

impl fmt::Debug for SignerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerBuilder")
            .field("secret_key", &"[REDACTED]")
            .field("salt", &self.salt)
            .field("separator", &self.separator)
            .field("key_derivation", &self.key_derivation)
            .field("digest_method", &self.digest_method)
            .finish_non_exhaustive()
    }
}
