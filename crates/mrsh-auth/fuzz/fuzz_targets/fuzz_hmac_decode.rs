//! Fuzz target for HMAC credential decoding.
//!
//! Arbitrary bytes must be rejected cleanly: no panic on malformed armor,
//! odd hex, short bodies or inconsistent length fields.
//!
//! ## Running
//!
//! ```bash
//! cd crates/mrsh-auth
//! cargo +nightly fuzz run fuzz_hmac_decode
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use mrsh_auth::{CredentialAuthority, HmacCredentialAuthority};

fuzz_target!(|data: &[u8]| {
    let authority = HmacCredentialAuthority::new(b"fuzz-key".to_vec());

    // A forged credential must never decode
    assert!(authority.decode(data).is_err());
});
