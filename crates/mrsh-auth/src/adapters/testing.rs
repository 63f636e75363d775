//! # In-Memory Adapters
//!
//! Deterministic implementations of the outbound ports for tests and
//! development. Enabled with the `test-utils` feature.

use crate::domain::entities::{AccountRecord, DecodedCredential};
use crate::ports::outbound::{
    AccountDirectory, AuthorityError, CredentialAuthority, DirectoryError, InterfaceError,
    InterfaceSource, TimeSource,
};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// StaticAccountDirectory
// ============================================================================

/// Account directory over a fixed set of accounts.
#[derive(Debug, Clone, Default)]
pub struct StaticAccountDirectory {
    accounts: HashMap<String, AccountRecord>,
    fail: bool,
}

impl StaticAccountDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account with a conventional home and shell.
    #[must_use]
    pub fn with_account(mut self, name: &str, uid: u32, gid: u32) -> Self {
        self.accounts.insert(
            name.to_string(),
            AccountRecord {
                name: name.to_string(),
                uid,
                gid,
                shell: PathBuf::from("/bin/sh"),
                home: PathBuf::from(format!("/home/{name}")),
            },
        );
        self
    }

    /// Make every lookup fail as if the passwd database were unavailable.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl AccountDirectory for StaticAccountDirectory {
    fn lookup_by_name(&self, name: &str) -> Result<Option<AccountRecord>, DirectoryError> {
        if self.fail {
            return Err(DirectoryError {
                name: name.to_string(),
                reason: "directory unavailable".to_string(),
            });
        }
        Ok(self.accounts.get(name).cloned())
    }
}

// ============================================================================
// StaticInterfaces
// ============================================================================

/// Interface source reporting a fixed address list.
#[derive(Debug, Clone, Default)]
pub struct StaticInterfaces {
    addresses: Vec<Ipv4Addr>,
    fail: bool,
}

impl StaticInterfaces {
    /// Report exactly `addresses`.
    pub fn new(addresses: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        Self {
            addresses: addresses.into_iter().collect(),
            fail: false,
        }
    }

    /// Fail every enumeration.
    pub fn failing() -> Self {
        Self {
            addresses: Vec::new(),
            fail: true,
        }
    }
}

impl InterfaceSource for StaticInterfaces {
    fn ipv4_addresses(&self) -> Result<Vec<Ipv4Addr>, InterfaceError> {
        if self.fail {
            return Err(InterfaceError("SIOCGIFCONF unavailable".to_string()));
        }
        Ok(self.addresses.clone())
    }
}

// ============================================================================
// StaticCredentialAuthority
// ============================================================================

/// Authority that treats the credential bytes as the payload and attests a
/// fixed uid/gid.
#[derive(Debug, Clone)]
pub struct StaticCredentialAuthority {
    uid: u32,
    gid: u32,
    reject: Option<AuthorityError>,
}

impl StaticCredentialAuthority {
    /// Accept every credential as minted by `uid`/`gid`.
    pub fn new(uid: u32, gid: u32) -> Self {
        Self {
            uid,
            gid,
            reject: None,
        }
    }

    /// Reject every credential with `error`.
    pub fn rejecting(error: AuthorityError) -> Self {
        Self {
            uid: 0,
            gid: 0,
            reject: Some(error),
        }
    }
}

impl CredentialAuthority for StaticCredentialAuthority {
    fn decode(&self, credential: &[u8]) -> Result<DecodedCredential, AuthorityError> {
        if let Some(err) = &self.reject {
            return Err(err.clone());
        }
        Ok(DecodedCredential {
            payload: credential.to_vec(),
            uid: self.uid,
            gid: self.gid,
        })
    }
}

// ============================================================================
// FixedTimeSource
// ============================================================================

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct FixedTimeSource {
    now: AtomicU64,
}

impl FixedTimeSource {
    /// Start the clock at `now` seconds since the epoch.
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
