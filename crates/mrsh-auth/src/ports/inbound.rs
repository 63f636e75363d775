//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this crate.

use crate::domain::entities::AuthenticatedCommand;
use crate::domain::errors::Rejection;

/// Primary credential authentication API.
///
/// Implementations must be thread-safe (`Send + Sync`) and must not carry
/// mutable state from one call to the next: the daemon authenticates each
/// connection independently and possibly in parallel.
pub trait CredentialAuthenticator: Send + Sync {
    /// Authenticate a credential read from a connection.
    ///
    /// # Arguments
    /// * `credential` - Raw credential bytes as read from the connection
    /// * `expected_port` - Port the transport observed for this connection
    ///
    /// # Errors
    /// Returns the stage that failed and why. No partially verified result
    /// is ever returned.
    fn authenticate(
        &self,
        credential: &[u8],
        expected_port: u16,
    ) -> Result<AuthenticatedCommand, Rejection>;
}
