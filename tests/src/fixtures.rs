//! # Shared Fixtures
//!
//! A host with one local user (`alice`, uid 1000) and one routable address
//! (`10.0.0.5`), plus helpers to build payloads and mint credentials for it.

use mrsh_auth::adapters::testing::{FixedTimeSource, StaticAccountDirectory, StaticInterfaces};
use mrsh_auth::{AuthConfig, AuthenticationService, HmacCredentialAuthority};
use std::net::Ipv4Addr;
use tracing_subscriber::EnvFilter;

/// Cluster secret shared by client and server.
pub const CLUSTER_KEY: &[u8] = b"mrsh-tests-cluster-key";

/// Fixed "now" for minted credentials.
pub const NOW: u64 = 1_700_000_000;

/// Protocol version the test server speaks.
pub const SERVER_VERSION: &str = "1.0";

/// Alice's local uid.
pub const ALICE_UID: u32 = 1000;

/// Alice's primary gid.
pub const ALICE_GID: u32 = 100;

/// The server's own routable address.
pub const SERVER_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 5);

/// Authenticator wired to the HMAC authority and the fixture host.
pub type TestService = AuthenticationService<
    HmacCredentialAuthority<FixedTimeSource>,
    StaticAccountDirectory,
    StaticInterfaces,
>;

/// Route service logs to the test output, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Authority sharing the cluster key, clock fixed at [`NOW`].
pub fn authority() -> HmacCredentialAuthority<FixedTimeSource> {
    HmacCredentialAuthority::with_clock(CLUSTER_KEY, FixedTimeSource::new(NOW))
}

/// Accounts on the fixture host.
pub fn directory() -> StaticAccountDirectory {
    StaticAccountDirectory::new()
        .with_account("alice", ALICE_UID, ALICE_GID)
        .with_account("root", 0, 0)
}

/// Interfaces on the fixture host, loopback included.
pub fn interfaces() -> StaticInterfaces {
    StaticInterfaces::new([Ipv4Addr::LOCALHOST, SERVER_IP])
}

/// Server speaking `version`.
pub fn service_with_version(version: &str) -> TestService {
    init_tracing();
    AuthenticationService::new(
        authority(),
        directory(),
        interfaces(),
        AuthConfig::default().with_protocol_version(version),
    )
}

/// Server speaking [`SERVER_VERSION`].
pub fn service() -> TestService {
    service_with_version(SERVER_VERSION)
}

/// Join fields into a payload, NUL-terminating each.
pub fn payload(fields: &[&str]) -> Vec<u8> {
    let fields: Vec<&[u8]> = fields.iter().map(|f| f.as_bytes()).collect();
    raw_payload(&fields)
}

/// Join raw byte fields into a payload, NUL-terminating each.
pub fn raw_payload(fields: &[&[u8]]) -> Vec<u8> {
    let mut buf = Vec::new();
    for field in fields {
        buf.extend_from_slice(field);
        buf.push(0);
    }
    buf
}

/// Mint a credential the fixture server will accept as authentic.
pub fn mint(fields: &[&str], uid: u32, gid: u32) -> Vec<u8> {
    authority()
        .encode(&payload(fields), uid, gid)
        .expect("fixture credential mints")
}
