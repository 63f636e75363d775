//! Fuzz target for payload validation.
//!
//! Feeds arbitrary decoded payloads through every field stage. The
//! authenticator must never panic and must never accept a payload whose
//! fields do not all parse.
//!
//! ## Running
//!
//! ```bash
//! cd crates/mrsh-auth
//! cargo +nightly fuzz run fuzz_payload
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use mrsh_auth::adapters::testing::{
    StaticAccountDirectory, StaticCredentialAuthority, StaticInterfaces,
};
use mrsh_auth::{AuthConfig, AuthenticationService, CredentialAuthenticator};
use std::net::Ipv4Addr;

/// Fuzz input structure for payload validation.
#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    /// Uid the authority attests
    uid: u32,
    /// Port the transport observed
    port: u16,
    /// Raw payload as the authority would return it
    payload: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let service = AuthenticationService::new(
        StaticCredentialAuthority::new(input.uid, 100),
        StaticAccountDirectory::new()
            .with_account("alice", 1000, 100)
            .with_account("root", 0, 0),
        StaticInterfaces::new([Ipv4Addr::LOCALHOST, Ipv4Addr::new(10, 0, 0, 5)]),
        AuthConfig::default()
            .with_protocol_version("1.2")
            .with_max_command_len(4096),
    );

    // Must NEVER panic, regardless of input
    if let Ok(cmd) = service.authenticate(&input.payload, input.port) {
        // Anything accepted carries the attested uid and a bounded command
        assert_eq!(cmd.uid, input.uid);
        assert!(cmd.command.len() < 4096);
        assert!(cmd.uid == cmd.account.uid || cmd.uid == 0);
    }
});
