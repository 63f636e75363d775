//! # HMAC Credential Authority
//!
//! Shared-key credential authority in the style of a MUNGE daemon: every
//! host in the cluster holds the same secret, the client mints a credential
//! carrying its uid/gid and payload, and the server validates it.
//!
//! ## Wire Format
//!
//! ```text
//! MAUTH:<lowercase hex of body>:
//!
//! body = version u8 | uid u32 | gid u32 | issued_at u64 | ttl u32
//!      | payload_len u32 | payload | hmac_sha256 (32 bytes)
//! ```
//!
//! Integers are big-endian. The MAC covers every byte before it.
//!
//! ## Security Properties
//!
//! - **HMAC-SHA256**: constant-time verification via `Mac::verify_slice`
//! - **Time-Bounded Validity**: credentials expire `ttl` seconds after issue
//! - **Replay Prevention**: each credential decodes once within its lifetime

use super::system::SystemTimeSource;
use crate::domain::entities::DecodedCredential;
use crate::ports::outbound::{AuthorityError, CredentialAuthority, TimeSource};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::Mutex;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Armor prefix.
pub const CREDENTIAL_PREFIX: &[u8] = b"MAUTH:";

/// Armor terminator.
pub const CREDENTIAL_SUFFIX: &[u8] = b":";

/// Body layout version.
pub const CREDENTIAL_VERSION: u8 = 1;

/// Default credential lifetime (seconds).
pub const DEFAULT_TTL_SECS: u32 = 300;

/// Maximum allowed clock skew for future issue times (seconds).
pub const MAX_CLOCK_SKEW_SECS: u64 = 10;

/// Default number of live credentials remembered for replay detection.
pub const MAX_REPLAY_CACHE_SIZE: usize = 100_000;

const HEADER_LEN: usize = 1 + 4 + 4 + 8 + 4 + 4;
const MAC_LEN: usize = 32;

// =============================================================================
// REPLAY CACHE
// =============================================================================

/// Seen credential MACs and the time after which they may be forgotten.
#[derive(Debug)]
struct ReplayCache {
    capacity: usize,
    state: Mutex<ReplayState>,
}

#[derive(Debug, Default)]
struct ReplayState {
    seen: HashMap<[u8; MAC_LEN], u64>,
    /// Earliest expiry among `seen`; nothing can be evicted before it passes
    earliest_expiry: u64,
}

impl ReplayCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(ReplayState::default()),
        }
    }

    /// Record `mac` as used until `expires_at`.
    ///
    /// # Errors
    /// * `Replayed` - `mac` is already recorded and still live
    /// * `Internal` - the cache is full of live entries
    fn check_and_insert(
        &self,
        mac: [u8; MAC_LEN],
        expires_at: u64,
        now: u64,
    ) -> Result<(), AuthorityError> {
        // A poisoned lock still holds a consistent map; keep enforcing replays
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let state = &mut *guard;

        if let Some(&exp) = state.seen.get(&mac) {
            if exp >= now {
                return Err(AuthorityError::Replayed);
            }
        }

        if state.seen.len() >= self.capacity && !state.seen.contains_key(&mac) {
            // Sweep only when some entry can actually have expired
            if state.earliest_expiry < now {
                state.seen.retain(|_, exp| *exp >= now);
                state.earliest_expiry = state.seen.values().copied().min().unwrap_or(u64::MAX);
            }
            if state.seen.len() >= self.capacity {
                return Err(AuthorityError::Internal("replay cache full".to_string()));
            }
        }

        if state.seen.is_empty() || expires_at < state.earliest_expiry {
            state.earliest_expiry = expires_at;
        }
        state.seen.insert(mac, expires_at);
        Ok(())
    }

    fn len(&self) -> usize {
        self.state.lock().map(|s| s.seen.len()).unwrap_or(0)
    }
}

// =============================================================================
// AUTHORITY
// =============================================================================

/// Credential authority keyed by a cluster-wide shared secret.
pub struct HmacCredentialAuthority<T: TimeSource = SystemTimeSource> {
    key: Zeroizing<Vec<u8>>,
    ttl: u32,
    clock: T,
    replays: ReplayCache,
}

impl HmacCredentialAuthority<SystemTimeSource> {
    /// Create an authority using the system clock.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self::with_clock(key, SystemTimeSource)
    }
}

impl<T: TimeSource> HmacCredentialAuthority<T> {
    /// Create an authority with an injected clock.
    pub fn with_clock(key: impl Into<Vec<u8>>, clock: T) -> Self {
        Self {
            key: Zeroizing::new(key.into()),
            ttl: DEFAULT_TTL_SECS,
            clock,
            replays: ReplayCache::new(MAX_REPLAY_CACHE_SIZE),
        }
    }

    /// Remember at most `capacity` live credentials; beyond that decoding
    /// fails with `Internal` until entries expire.
    #[must_use]
    pub fn with_replay_capacity(mut self, capacity: usize) -> Self {
        self.replays = ReplayCache::new(capacity);
        self
    }

    /// Lifetime given to credentials minted by [`Self::encode`].
    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Mint a credential for `payload` on behalf of `uid`/`gid`.
    pub fn encode(&self, payload: &[u8], uid: u32, gid: u32) -> Result<Vec<u8>, AuthorityError> {
        let payload_len = u32::try_from(payload.len())
            .map_err(|_| AuthorityError::Internal("payload too large".to_string()))?;

        let mut body = Vec::with_capacity(HEADER_LEN + payload.len() + MAC_LEN);
        body.push(CREDENTIAL_VERSION);
        body.extend_from_slice(&uid.to_be_bytes());
        body.extend_from_slice(&gid.to_be_bytes());
        body.extend_from_slice(&self.clock.now().to_be_bytes());
        body.extend_from_slice(&self.ttl.to_be_bytes());
        body.extend_from_slice(&payload_len.to_be_bytes());
        body.extend_from_slice(payload);

        let mut mac = self.mac()?;
        mac.update(&body);
        body.extend_from_slice(&mac.finalize().into_bytes());

        let mut credential = CREDENTIAL_PREFIX.to_vec();
        credential.extend_from_slice(hex::encode(&body).as_bytes());
        credential.extend_from_slice(CREDENTIAL_SUFFIX);
        Ok(credential)
    }

    /// Number of credentials currently remembered for replay detection.
    pub fn replay_cache_len(&self) -> usize {
        self.replays.len()
    }

    fn mac(&self) -> Result<HmacSha256, AuthorityError> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| AuthorityError::Internal(e.to_string()))
    }
}

impl<T: TimeSource> CredentialAuthority for HmacCredentialAuthority<T> {
    fn decode(&self, credential: &[u8]) -> Result<DecodedCredential, AuthorityError> {
        let body = unarmor(credential)?;
        if body.len() < HEADER_LEN + MAC_LEN {
            return Err(AuthorityError::BadFormat);
        }
        if body[0] != CREDENTIAL_VERSION {
            return Err(AuthorityError::BadVersion(body[0]));
        }

        let (signed, tag) = body.split_at(body.len() - MAC_LEN);
        let mut mac = self.mac()?;
        mac.update(signed);
        mac.verify_slice(tag)
            .map_err(|_| AuthorityError::InvalidMac)?;

        let header = Header::parse(signed)?;
        let payload = &signed[HEADER_LEN..];
        if usize::try_from(header.payload_len).ok() != Some(payload.len()) {
            return Err(AuthorityError::BadFormat);
        }

        let now = self.clock.now();
        if header.issued_at > now.saturating_add(MAX_CLOCK_SKEW_SECS) {
            return Err(AuthorityError::Rewound);
        }
        let expires_at = header.issued_at.saturating_add(u64::from(header.ttl));
        if now > expires_at {
            return Err(AuthorityError::Expired);
        }

        let mut mac_key = [0u8; MAC_LEN];
        mac_key.copy_from_slice(tag);
        self.replays.check_and_insert(mac_key, expires_at, now)?;

        Ok(DecodedCredential {
            payload: payload.to_vec(),
            uid: header.uid,
            gid: header.gid,
        })
    }
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

#[derive(Debug)]
struct Header {
    uid: u32,
    gid: u32,
    issued_at: u64,
    ttl: u32,
    payload_len: u32,
}

impl Header {
    fn parse(signed: &[u8]) -> Result<Self, AuthorityError> {
        Ok(Self {
            uid: u32::from_be_bytes(array_at(signed, 1)?),
            gid: u32::from_be_bytes(array_at(signed, 5)?),
            issued_at: u64::from_be_bytes(array_at(signed, 9)?),
            ttl: u32::from_be_bytes(array_at(signed, 17)?),
            payload_len: u32::from_be_bytes(array_at(signed, 21)?),
        })
    }
}

fn array_at<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N], AuthorityError> {
    bytes
        .get(offset..offset + N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(AuthorityError::BadFormat)
}

/// Strip NUL padding and armor, returning the decoded body.
fn unarmor(credential: &[u8]) -> Result<Vec<u8>, AuthorityError> {
    let end = credential
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |last| last + 1);

    let hex_body = credential[..end]
        .strip_prefix(CREDENTIAL_PREFIX)
        .and_then(|rest| rest.strip_suffix(CREDENTIAL_SUFFIX))
        .ok_or(AuthorityError::BadFormat)?;

    hex::decode(hex_body).map_err(|_| AuthorityError::BadFormat)
}

// =============================================================================
// TESTS
// =============================================================================
