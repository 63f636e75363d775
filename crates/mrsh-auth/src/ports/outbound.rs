//! # Outbound Ports (Driven Ports / SPI)
//!
//! Traits that define the collaborators this crate needs.

use crate::domain::entities::{AccountRecord, DecodedCredential};
use std::net::Ipv4Addr;
use thiserror::Error;

/// Reasons a credential authority refuses a credential.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorityError {
    /// The credential is not in the authority's format
    #[error("Invalid credential format")]
    BadFormat,

    /// The credential was minted by an incompatible authority version
    #[error("Unsupported credential version {0}")]
    BadVersion(u8),

    /// The MAC does not verify
    #[error("Invalid credential")]
    InvalidMac,

    /// The credential's time-to-live has elapsed
    #[error("Expired credential")]
    Expired,

    /// The credential claims to have been issued in the future
    #[error("Rewound credential")]
    Rewound,

    /// The credential has already been decoded once
    #[error("Replayed credential")]
    Replayed,

    /// The authority could not process the request
    #[error("Credential authority failure: {0}")]
    Internal(String),
}

/// Trusted service that validates a credential and attests who minted it.
///
/// The authenticator never checks signatures itself; whatever this returns
/// is taken as fact.
pub trait CredentialAuthority: Send + Sync {
    /// Validate `credential` and return its payload with the attested uid/gid.
    ///
    /// # Errors
    /// Returns a diagnostic suitable for showing to the rejected caller.
    fn decode(&self, credential: &[u8]) -> Result<DecodedCredential, AuthorityError>;
}

/// Failure of the account database itself (not a missing account).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("account lookup failed for {name}: {reason}")]
pub struct DirectoryError {
    /// Name being looked up
    pub name: String,
    /// System detail
    pub reason: String,
}

/// Local account database.
pub trait AccountDirectory: Send + Sync {
    /// Look up an account by login name.
    ///
    /// Returns `Ok(None)` if no such account exists. The record is owned by
    /// the caller and shares no storage with any lookup cache.
    fn lookup_by_name(&self, name: &str) -> Result<Option<AccountRecord>, DirectoryError>;
}

/// Failure to enumerate network interfaces.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("interface enumeration failed: {0}")]
pub struct InterfaceError(pub String);

/// Source of the host's current IPv4 interface addresses.
pub trait InterfaceSource: Send + Sync {
    /// IPv4 addresses bound to active interfaces right now.
    ///
    /// May include `127.0.0.1`; callers filter it.
    fn ipv4_addresses(&self) -> Result<Vec<Ipv4Addr>, InterfaceError>;
}

/// Abstract clock for credential expiry checks.
///
/// Production implementations use system time; tests use fixed timestamps.
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> u64;
}
