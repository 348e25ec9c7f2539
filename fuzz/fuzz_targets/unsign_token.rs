#![no_main]
use libfuzzer_sys::fuzz_target;
use tokenseal::{Signer, TimestampSigner};

fuzz_target!(|data: &[u8]| {
    // Must never panic, regardless of input.
    let signer = Signer::new("fuzz-secret");
    let _ = signer.unsign(data);
    let _ = TimestampSigner::new(signer).unsign_at(data, 60, 1_700_000_000);
});
