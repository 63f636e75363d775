//! # Domain Entities
//!
//! Core data structures for credential authentication.

use std::ffi::OsString;
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Output of the credential authority: the embedded payload and the
/// (uid, gid) pair the authority vouches for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedCredential {
    /// NUL-separated payload fields
    pub payload: Vec<u8>,
    /// Uid attested by the authority
    pub uid: u32,
    /// Gid attested by the authority
    pub gid: u32,
}

/// Owned copy of a local account entry.
///
/// Never borrows from the system passwd cache; every string is copied at
/// lookup time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountRecord {
    /// Login name
    pub name: String,
    /// Local uid
    pub uid: u32,
    /// Primary gid
    pub gid: u32,
    /// Login shell
    pub shell: PathBuf,
    /// Home directory
    pub home: PathBuf,
}

/// A caller that passed every stage, ready for command dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedCommand {
    /// Uid attested by the authority
    pub uid: u32,
    /// Gid attested by the authority
    pub gid: u32,
    /// Username from the payload, resolved against the account directory
    pub username: String,
    /// Command to execute, byte-for-byte as sent
    pub command: OsString,
    /// Resolved local account
    pub account: AccountRecord,
}

/// Per-call accumulator populated one stage at a time.
///
/// Created for a single authentication attempt and dropped when it ends.
#[derive(Debug, Default)]
pub struct AuthContext {
    /// Uid attested by the authority
    pub authority_uid: u32,
    /// Gid attested by the authority
    pub authority_gid: u32,
    /// Username field as sent by the caller
    pub username: Option<String>,
    /// Account the username resolved to
    pub account: Option<AccountRecord>,
    /// Claimed protocol version
    pub version: Option<String>,
    /// Claimed address of this server
    pub server_ip: Option<Ipv4Addr>,
    /// Claimed auxiliary channel port
    pub port: Option<i64>,
    /// Auxiliary channel nonce
    pub nonce: Option<i64>,
    /// Command to execute
    pub command: Option<OsString>,
}

impl AuthContext {
    /// Start a context for a credential the authority has decoded.
    pub fn new(authority_uid: u32, authority_gid: u32) -> Self {
        Self {
            authority_uid,
            authority_gid,
            ..Self::default()
        }
    }
}
