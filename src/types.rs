use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::error::SignerError;

/// Default salt, naming the namespace plain signers share.
pub const DEFAULT_SALT: &[u8] = b"itsdangerous.Signer";

/// Default field separator.
pub const DEFAULT_SEPARATOR: &[u8] = b".";

/// Marker mixed into the `django-concat` derivation.
pub const DJANGO_CONCAT_MARKER: &[u8] = b"signer";

/// How the signing key is derived from the secret and salt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyDerivation {
    /// `digest(salt ++ secret)`
    Concat,
    /// `digest(salt ++ "signer" ++ secret)`
    #[default]
    DjangoConcat,
    /// `HMAC(digest, key = secret, message = salt)`
    Hmac,
    /// The secret itself.
    None,
}

impl KeyDerivation {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyDerivation::Concat => "concat",
            KeyDerivation::DjangoConcat => "django-concat",
            KeyDerivation::Hmac => "hmac",
            KeyDerivation::None => "none",
        }
    }
}

impl FromStr for KeyDerivation {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concat" => Ok(KeyDerivation::Concat),
            "django-concat" => Ok(KeyDerivation::DjangoConcat),
            "hmac" => Ok(KeyDerivation::Hmac),
            "none" => Ok(KeyDerivation::None),
            other => Err(SignerError::UnknownKeyDerivation(other.to_string())),
        }
    }
}

impl fmt::Display for KeyDerivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message digest used for key derivation and HMAC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestMethod {
    /// SHA-1, kept as the default for compatibility with existing tokens.
    #[default]
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DigestMethod::Sha1 => "sha1",
            DigestMethod::Sha224 => "sha224",
            DigestMethod::Sha256 => "sha256",
            DigestMethod::Sha384 => "sha384",
            DigestMethod::Sha512 => "sha512",
        }
    }

    /// Digest output length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            DigestMethod::Sha1 => 20,
            DigestMethod::Sha224 => 28,
            DigestMethod::Sha256 => 32,
            DigestMethod::Sha384 => 48,
            DigestMethod::Sha512 => 64,
        }
    }

    /// Hash `data` in one shot.
    #[must_use]
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestMethod::Sha1 => Sha1::digest(data).to_vec(),
            DigestMethod::Sha224 => Sha224::digest(data).to_vec(),
            DigestMethod::Sha256 => Sha256::digest(data).to_vec(),
            DigestMethod::Sha384 => Sha384::digest(data).to_vec(),
            DigestMethod::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// HMAC of `message` under `key` with this digest.
    #[must_use]
    pub fn hmac(self, key: &[u8], message: &[u8]) -> Vec<u8> {
        match self {
            DigestMethod::Sha1 => mac::<Hmac<Sha1>>(key, message),
            DigestMethod::Sha224 => mac::<Hmac<Sha224>>(key, message),
            DigestMethod::Sha256 => mac::<Hmac<Sha256>>(key, message),
            DigestMethod::Sha384 => mac::<Hmac<Sha384>>(key, message),
            DigestMethod::Sha512 => mac::<Hmac<Sha512>>(key, message),
        }
    }
}

#[allow(clippy::expect_used)] // HMAC accepts keys of any length
fn mac<M: Mac + hmac::digest::KeyInit>(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = <M as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

impl FromStr for DigestMethod {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(DigestMethod::Sha1),
            "sha224" => Ok(DigestMethod::Sha224),
            "sha256" => Ok(DigestMethod::Sha256),
            "sha384" => Ok(DigestMethod::Sha384),
            "sha512" => Ok(DigestMethod::Sha512),
            _ => Err(SignerError::UnknownDigestMethod(s.to_string())),
        }
    }
}

impl fmt::Display for DigestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in signature algorithms, selectable by name from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmKind {
    #[default]
    Hmac,
    /// Fixed marker signature; provides no integrity.
    None,
}

impl AlgorithmKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlgorithmKind::Hmac => "hmac",
            AlgorithmKind::None => "none",
        }
    }
}

impl FromStr for AlgorithmKind {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hmac" => Ok(AlgorithmKind::Hmac),
            "none" => Ok(AlgorithmKind::None),
            other => Err(SignerError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
