use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// Malformed base64, a missing separator, or a signature mismatch.
    #[error("bad data: {0}")]
    BadData(String),

    /// The outer signature is valid but the timestamp field is missing or unparseable.
    #[error("bad time signature: {0}")]
    BadTimeSignature(String),

    /// The token is authentic but older than the allowed age, or dated in the future.
    #[error("signature expired: {message}")]
    SignatureExpired { message: String, signed_at: u64 },

    #[error(
        "invalid separator {0:?}: it may be contained in the signature itself; \
         ASCII letters, digits, and '-_=' must not be used"
    )]
    InvalidSeparator(String),

    #[error("unknown key derivation method: {0}")]
    UnknownKeyDerivation(String),

    #[error("unknown digest method: {0}")]
    UnknownDigestMethod(String),

    #[error("unknown signing algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("system clock error: {0}")]
    Clock(String),
}

pub type Result<T> = std::result::Result<T, SignerError>;
