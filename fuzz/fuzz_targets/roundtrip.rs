#![no_main]
use libfuzzer_sys::fuzz_target;
use tokenseal::encoding::{base64_decode, base64_encode};
use tokenseal::timestamp::{decode_timestamp, encode_timestamp};
use tokenseal::{Signer, TimestampSigner};

fuzz_target!(|data: &[u8]| {
    // Any value, including ones containing the separator, must survive signing.
    let signer = Signer::new("fuzz-secret");
    let token = signer.sign(data);
    assert_eq!(signer.unsign(&token).ok(), Some(data), "signer roundtrip mismatch");

    let stamped = TimestampSigner::new(signer).sign_at(data, 1_700_000_000);
    let ts = TimestampSigner::new(Signer::new("fuzz-secret"));
    assert_eq!(ts.unsign_at(&stamped, 0, 0).ok(), Some(data), "timestamp roundtrip mismatch");

    assert_eq!(base64_decode(&base64_encode(data)).ok().as_deref(), Some(data));

    if let Ok(raw) = <[u8; 8]>::try_from(data.get(..8).unwrap_or_default()) {
        let ts = u64::from_be_bytes(raw);
        assert_eq!(decode_timestamp(&encode_timestamp(ts)).ok(), Some(ts));
    }
});
