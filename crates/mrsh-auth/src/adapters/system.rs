//! # System Adapters
//!
//! Production implementations of the outbound ports backed by the host:
//! the passwd database, `getifaddrs(3)`, `sysconf(3)` and the system clock.

use crate::domain::entities::AccountRecord;
use crate::ports::outbound::{
    AccountDirectory, DirectoryError, InterfaceError, InterfaceSource, TimeSource,
};
use nix::ifaddrs::getifaddrs;
use nix::net::if_::InterfaceFlags;
use nix::unistd::{sysconf, SysconfVar, User};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::{SystemTime, UNIX_EPOCH};

/// `ARG_MAX` used when `sysconf` cannot report one.
pub const FALLBACK_ARG_MAX: usize = 131_072;

/// The platform's maximum argument length, `sysconf(_SC_ARG_MAX)`.
pub fn platform_arg_max() -> usize {
    match sysconf(SysconfVar::ARG_MAX) {
        Ok(Some(limit)) if limit > 0 => usize::try_from(limit).unwrap_or(FALLBACK_ARG_MAX),
        _ => FALLBACK_ARG_MAX,
    }
}

/// Account directory backed by `getpwnam_r(3)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAccountDirectory;

impl AccountDirectory for SystemAccountDirectory {
    fn lookup_by_name(&self, name: &str) -> Result<Option<AccountRecord>, DirectoryError> {
        let user = User::from_name(name).map_err(|errno| DirectoryError {
            name: name.to_string(),
            reason: errno.desc().to_string(),
        })?;

        Ok(user.map(|user| AccountRecord {
            uid: user.uid.as_raw(),
            gid: user.gid.as_raw(),
            name: user.name,
            shell: user.shell,
            home: user.dir,
        }))
    }
}

/// Interface source backed by `getifaddrs(3)`.
///
/// Only interfaces flagged up are reported; every call queries the kernel
/// afresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn ipv4_addresses(&self) -> Result<Vec<Ipv4Addr>, InterfaceError> {
        let interfaces = getifaddrs().map_err(|errno| InterfaceError(errno.desc().to_string()))?;

        Ok(interfaces
            .filter(|ifa| ifa.flags.contains(InterfaceFlags::IFF_UP))
            .filter_map(|ifa| {
                ifa.address
                    .as_ref()
                    .and_then(|addr| addr.as_sockaddr_in())
                    .map(|sin| *SocketAddrV4::from(*sin).ip())
            })
            .collect())
    }
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
