//! Tokenseal: tamper-evident signed tokens.
//!
//! A value is joined to a base64url HMAC signature with a separator
//! (`value.signature`). The timestamp variant also embeds the signing time so
//! tokens can be rejected after a maximum age (`value.timestamp.signature`).
//! Values are authenticated, not encrypted.

pub mod algorithm;
pub mod config;
pub mod encoding;
pub mod error;
pub mod signer;
pub mod timestamp;
pub mod types;

pub use algorithm::{HmacAlgorithm, NoneAlgorithm, SigningAlgorithm};
pub use config::SignerConfig;
pub use error::{Result, SignerError};
pub use signer::{Signer, SignerBuilder};
pub use timestamp::TimestampSigner;
pub use types::{AlgorithmKind, DigestMethod, KeyDerivation};
