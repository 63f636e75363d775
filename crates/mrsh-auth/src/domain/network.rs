//! # Network Identity Matching
//!
//! Confirms that the server address a caller claims to be contacting is one
//! of this host's own IPv4 addresses. A credential minted for another server
//! that trusts the same authority must not be accepted here.
//!
//! Interface state is queried on every call and never cached.

use super::errors::AuthError;
use crate::ports::outbound::InterfaceSource;
use std::net::Ipv4Addr;

/// The loopback address never counts as one of this host's addresses.
pub const EXCLUDED_LOOPBACK: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Whether `addr` is among `addresses`, ignoring `127.0.0.1`.
pub fn contains_address<'a, A>(addresses: A, addr: Ipv4Addr) -> bool
where
    A: IntoIterator<Item = &'a Ipv4Addr>,
{
    addresses
        .into_iter()
        .filter(|a| **a != EXCLUDED_LOOPBACK)
        .any(|a| a.octets() == addr.octets())
}

/// Whether `addr` is currently bound to one of this host's interfaces.
///
/// # Errors
/// * `AuthError::Internal` - interfaces could not be enumerated
pub fn has_interface_address<I>(interfaces: &I, addr: Ipv4Addr) -> Result<bool, AuthError>
where
    I: InterfaceSource + ?Sized,
{
    let addresses = interfaces
        .ipv4_addresses()
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    Ok(contains_address(&addresses, addr))
}
