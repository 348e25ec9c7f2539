use std::io::{self, Read as _};
use std::time::UNIX_EPOCH;

use clap::{Args, Parser, Subcommand};

use tokenseal::encoding::{base64_decode, rsplit_once};
use tokenseal::timestamp::decode_timestamp;
use tokenseal::{
    AlgorithmKind, DigestMethod, KeyDerivation, Signer, SignerConfig, TimestampSigner,
};

#[derive(Parser)]
#[command(name = "tokenseal", about = "Tamper-evident signed tokens")]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign a value and print the token.
    /// Reads the value from --value or stdin.
    Sign {
        #[command(flatten)]
        signer: SignerArgs,

        /// Embed the current time so the token can expire.
        #[arg(long, default_value_t = false)]
        timestamp: bool,

        /// Value to sign. If omitted, reads from stdin.
        #[arg(short, long)]
        value: Option<String>,
    },

    /// Verify a token and print its value as JSON.
    Unsign {
        #[command(flatten)]
        signer: SignerArgs,

        /// The token carries a timestamp field.
        #[arg(long, default_value_t = false)]
        timestamp: bool,

        /// Maximum token age in seconds (timestamped tokens only; 0 disables).
        #[arg(long, default_value_t = 0)]
        max_age: i64,

        /// Token to verify. If omitted, reads from stdin.
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Split a token into its fields without verifying it.
    Inspect {
        /// Field separator.
        #[arg(long, default_value = ".")]
        separator: String,

        /// The token carries a timestamp field.
        #[arg(long, default_value_t = false)]
        timestamp: bool,

        /// Token to inspect. If omitted, reads from stdin.
        #[arg(short, long)]
        token: Option<String>,
    },
}

/// Secret key source and signer options shared by `sign` and `unsign`.
#[derive(Args)]
struct SignerArgs {
    /// Secret key file path (raw bytes, or hex with --hex-key).
    #[arg(short, long)]
    key: String,

    /// Interpret the key file as hex-encoded.
    #[arg(long, default_value_t = false)]
    hex_key: bool,

    /// JSON signer configuration file; flags below override it.
    #[arg(short, long)]
    config: Option<String>,

    #[arg(long)]
    salt: Option<String>,

    #[arg(long)]
    separator: Option<String>,

    /// "concat", "django-concat", "hmac" or "none"
    #[arg(long)]
    key_derivation: Option<KeyDerivation>,

    /// "sha1", "sha224", "sha256", "sha384" or "sha512"
    #[arg(long)]
    digest: Option<DigestMethod>,

    /// "hmac" or "none"
    #[arg(long)]
    algorithm: Option<AlgorithmKind>,
}

impl SignerArgs {
    fn config(&self) -> Result<SignerConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => SignerConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => SignerConfig::default(),
        };
        if let Some(salt) = &self.salt {
            config.salt = salt.clone();
        }
        if let Some(separator) = &self.separator {
            config.separator = separator.clone();
        }
        if let Some(key_derivation) = self.key_derivation {
            config.key_derivation = key_derivation;
        }
        if let Some(digest) = self.digest {
            config.digest_method = digest;
        }
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        Ok(config)
    }

    fn build(&self) -> Result<Signer, Box<dyn std::error::Error>> {
        let key = read_key_file(&self.key, self.hex_key)?;
        Ok(self.config()?.build(key)?)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Command::Sign {
            signer,
            timestamp,
            value,
        } => cmd_sign(&signer, timestamp, value),
        Command::Unsign {
            signer,
            timestamp,
            max_age,
            token,
        } => cmd_unsign(&signer, timestamp, max_age, token),
        Command::Inspect {
            separator,
            timestamp,
            token,
        } => cmd_inspect(&separator, timestamp, token),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn cmd_sign(
    args: &SignerArgs,
    timestamp: bool,
    value_arg: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let signer = args.build()?;
    let from_stdin = value_arg.is_none();
    let raw = read_input(value_arg)?;
    let value = if from_stdin {
        strip_line_ending(&raw)
    } else {
        raw.as_str()
    };

    let token = if timestamp {
        TimestampSigner::new(signer).sign(value.as_bytes())?
    } else {
        signer.sign(value.as_bytes())
    };

    println!("{}", String::from_utf8_lossy(&token));
    Ok(())
}

fn cmd_unsign(
    args: &SignerArgs,
    timestamp: bool,
    max_age: i64,
    token_arg: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let signer = args.build()?;
    let token = read_input(token_arg)?;
    let token = token.trim();

    let output = if timestamp {
        let (value, signed_at) =
            TimestampSigner::new(signer).unsign_with_timestamp(token.as_bytes(), max_age)?;
        serde_json::json!({
            "value": String::from_utf8_lossy(value),
            "signed_at": signed_at.duration_since(UNIX_EPOCH)?.as_secs(),
        })
    } else {
        let value = signer.unsign(token.as_bytes())?;
        serde_json::json!({
            "value": String::from_utf8_lossy(value),
        })
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_inspect(
    separator: &str,
    timestamp: bool,
    token_arg: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = read_input(token_arg)?;
    let token = token.trim();
    let sep = separator.as_bytes();

    let (rest, signature) =
        rsplit_once(token.as_bytes(), sep).ok_or_else(|| format!("no {separator:?} in token"))?;

    let output = if timestamp {
        let (value, ts_field) =
            rsplit_once(rest, sep).ok_or("token has no timestamp field")?;
        let signed_at = decode_timestamp(&base64_decode(ts_field)?)?;
        serde_json::json!({
            "value": String::from_utf8_lossy(value),
            "signed_at": signed_at,
            "signature_hex": hex::encode(base64_decode(signature)?),
            "verified": false,
        })
    } else {
        serde_json::json!({
            "value": String::from_utf8_lossy(rest),
            "signature_hex": hex::encode(base64_decode(signature)?),
            "verified": false,
        })
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Read a value from a CLI argument or stdin, unmodified.
fn read_input(arg: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    match arg {
        Some(s) => Ok(s),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Drop one trailing `\n` or `\r\n`; all other whitespace is part of the value.
fn strip_line_ending(s: &str) -> &str {
    s.strip_suffix('\n')
        .map_or(s, |line| line.strip_suffix('\r').unwrap_or(line))
}

/// Read key bytes from a file, optionally hex-decoding.
fn read_key_file(path: &str, hex_encoded: bool) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let raw = std::fs::read(path)?;
    if hex_encoded {
        let hex_str = String::from_utf8(raw).map_err(|_| "hex key file is not valid UTF-8")?;
        Ok(hex::decode(hex_str.trim())?)
    } else {
        Ok(raw)
    }
}
