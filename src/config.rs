//! Serializable signer configuration.
//!
//! The secret key is deliberately not part of the configuration; it is supplied
//! separately when a signer is built.
//!
//! ```json
//! {
//!   "salt": "activate-account",
//!   "separator": ".",
//!   "key_derivation": "django-concat",
//!   "digest_method": "sha256",
//!   "algorithm": "hmac"
//! }
//! ```
//!
//! Every field is optional and falls back to the library default.

use serde::{Deserialize, Serialize};

use crate::algorithm::{HmacAlgorithm, NoneAlgorithm};
use crate::error::{Result, SignerError};
use crate::signer::{Signer, SignerBuilder};
use crate::timestamp::TimestampSigner;
use crate::types::{
    AlgorithmKind, DigestMethod, KeyDerivation, DEFAULT_SALT, DEFAULT_SEPARATOR,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignerConfig {
    pub salt: String,
    pub separator: String,
    pub key_derivation: KeyDerivation,
    pub digest_method: DigestMethod,
    pub algorithm: AlgorithmKind,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            salt: String::from_utf8_lossy(DEFAULT_SALT).into_owned(),
            separator: String::from_utf8_lossy(DEFAULT_SEPARATOR).into_owned(),
            key_derivation: KeyDerivation::default(),
            digest_method: DigestMethod::default(),
            algorithm: AlgorithmKind::default(),
        }
    }
}

impl SignerConfig {
    /// Parse a JSON document. Unknown fields and unknown enum names are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SignerError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SignerError::Config(e.to_string()))
    }

    /// A builder pre-populated from this configuration.
    #[must_use]
    pub fn builder(&self, secret_key: impl Into<Vec<u8>>) -> SignerBuilder {
        let builder = Signer::builder(secret_key)
            .salt(self.salt.as_bytes())
            .separator(self.separator.as_bytes())
            .key_derivation(self.key_derivation)
            .digest_method(self.digest_method);

        match self.algorithm {
            AlgorithmKind::Hmac => builder.algorithm(HmacAlgorithm::new(self.digest_method)),
            AlgorithmKind::None => builder.algorithm(NoneAlgorithm),
        }
    }

    pub fn build(&self, secret_key: impl Into<Vec<u8>>) -> Result<Signer> {
        self.builder(secret_key).build()
    }

    pub fn build_timestamp(&self, secret_key: impl Into<Vec<u8>>) -> Result<TimestampSigner> {
        self.build(secret_key).map(TimestampSigner::new)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SignerConfig::from_json("{}").unwrap();
        assert_eq!(config, SignerConfig::default());
        assert_eq!(config.salt, "itsdangerous.Signer");
        assert_eq!(config.separator, ".");
    }

    #[test]
    fn test_default_config_matches_default_signer() {
        let from_config = SignerConfig::default().build("secret-key").unwrap();
        let direct = Signer::new("secret-key");
        assert_eq!(from_config.sign(b"hello"), direct.sign(b"hello"));
    }

    #[test]
    fn test_parse_full_document() {
        let config = SignerConfig::from_json(
            r#"{
                "salt": "activate",
                "separator": "|",
                "key_derivation": "hmac",
                "digest_method": "sha512",
                "algorithm": "hmac"
            }"#,
        )
        .unwrap();
        assert_eq!(config.key_derivation, KeyDerivation::Hmac);
        assert_eq!(config.digest_method, DigestMethod::Sha512);

        let signer = config.build("k").unwrap();
        assert_eq!(signer.salt(), b"activate");
        assert_eq!(signer.separator(), b"|");
        let token = signer.sign(b"user:42");
        assert_eq!(signer.unsign(&token).unwrap(), b"user:42");
    }

    #[test]
    fn test_unknown_key_derivation_rejected() {
        let err = SignerConfig::from_json(r#"{"key_derivation": "bcrypt"}"#).unwrap_err();
        assert!(matches!(err, SignerError::Config(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = SignerConfig::from_json(r#"{"secret_key": "oops"}"#).unwrap_err();
        assert!(matches!(err, SignerError::Config(_)));
    }

    #[test]
    fn test_bad_separator_fails_build() {
        let config = SignerConfig::from_json(r#"{"separator": "-"}"#).unwrap();
        assert!(matches!(config.build("k"), Err(SignerError::InvalidSeparator(_))));
    }

    #[test]
    fn test_none_algorithm_from_config() {
        let config = SignerConfig {
            algorithm: AlgorithmKind::None,
            ..Default::default()
        };
        assert_eq!(config.build("k").unwrap().sign(b"v"), b"v.Yg");
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SignerConfig {
            salt: "reset".into(),
            digest_method: DigestMethod::Sha256,
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"digest_method\": \"sha256\""));
        assert_eq!(SignerConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_build_timestamp() {
        let signer = SignerConfig::default().build_timestamp("secret-key").unwrap();
        let token = signer.sign_at(b"hello", 1_700_000_000);
        assert_eq!(token, b"hello.ZVPxAA.UQx3EIPGLNk6IyY28rz4wwlRRWI");
    }
}
