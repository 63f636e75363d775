//! # Credential Transport
//!
//! Reads the NUL-terminated credential a client sends first on a new
//! connection.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Size of the credential buffer; a credential and its terminator must fit.
pub const MAX_CREDENTIAL_SIZE: usize = 4096;

/// Errors reading a credential.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection failed
    #[error("credential read failed: {0}")]
    Io(#[from] std::io::Error),

    /// No terminator within the size limit
    #[error("credential exceeds {} bytes", MAX_CREDENTIAL_SIZE)]
    Oversized,
}

/// Read a credential up to its NUL terminator or EOF.
///
/// Reads one byte at a time so nothing the client sends after the
/// terminator is consumed. An immediate EOF yields an empty credential,
/// which the authenticator rejects.
pub async fn read_credential<R>(reader: &mut R) -> Result<Vec<u8>, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut credential = Vec::new();
    let mut byte = [0u8; 1];

    while credential.len() < MAX_CREDENTIAL_SIZE {
        if reader.read(&mut byte).await? == 0 || byte[0] == 0 {
            return Ok(credential);
        }
        credential.push(byte[0]);
    }

    Err(TransportError::Oversized)
}
