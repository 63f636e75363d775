//! # Authentication Errors
//!
//! Rejection reasons for credential authentication and the coarse taxonomy
//! operators triage them by.

use super::stages::Stage;
use super::tokenizer::TruncatedBuffer;
use std::fmt;
use thiserror::Error;

/// Upper bound on the caller-facing rejection message, in bytes.
pub const MAX_ERROR_MESSAGE_LEN: usize = 256;

/// Text shown to the caller for any local failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal System Error";

/// Text shown to the caller for any policy denial.
///
/// Unknown users and uid mismatches must read the same to the caller.
pub const PERMISSION_DENIED_MESSAGE: &str = "Permission Denied";

/// Rejection taxonomy.
///
/// `PermissionDenied` and `Protocol` must stay distinct in logs and
/// messages: the first is a policy decision about a well-formed request, the
/// second a non-conforming or tampered client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Local resource failure, not the caller's fault
    Internal,
    /// The credential authority rejected the credential
    AuthenticationFailure,
    /// Structurally invalid payload
    Protocol,
    /// Well-formed request that policy disallows
    PermissionDenied,
    /// Command exceeds the platform limit
    CommandTooLong,
    /// Client and server protocol versions differ
    VersionMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "internal error"),
            Self::AuthenticationFailure => write!(f, "authentication failure"),
            Self::Protocol => write!(f, "protocol error"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::CommandTooLong => write!(f, "command too long"),
            Self::VersionMismatch => write!(f, "version mismatch"),
        }
    }
}

/// Errors that can occur while authenticating a credential.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Nothing was read from the connection
    #[error("Protocol Error: null credential")]
    EmptyCredential,

    /// The authority decoded the credential but it carried no payload
    #[error("Protocol Error: empty credential payload")]
    EmptyPayload,

    /// The credential authority refused the credential
    #[error("Authentication Failure: {0}")]
    AuthenticationFailure(String),

    /// The payload ended before a required field
    #[error("Protocol Error: payload truncated at offset {offset}")]
    TruncatedPayload { offset: usize },

    /// A field could not be decoded
    #[error("Protocol Error: bad {field} field: {reason}")]
    MalformedField { field: &'static str, reason: String },

    /// The claimed username has no local account
    #[error("Permission Denied: unknown user {0}")]
    UnknownUser(String),

    /// The attested uid does not own the claimed account
    #[error("Permission Denied: uid {authority_uid} may not act as {username} (uid {account_uid})")]
    UidMismatch {
        username: String,
        account_uid: u32,
        authority_uid: u32,
    },

    /// The client speaks another protocol version
    #[error("Client protocol version ({client}) does not match server version ({server})")]
    VersionMismatch { client: String, server: String },

    /// The claimed server address is not bound on this host
    #[error("Permission Denied: {0} is not an address of this host")]
    AddressNotLocal(std::net::Ipv4Addr),

    /// The claimed port differs from the port the connection arrived with
    #[error("Protocol Error: port mismatch (expected {expected}, got {claimed})")]
    PortMismatch { expected: u16, claimed: i64 },

    /// A nonce was sent although no auxiliary channel was requested
    #[error("Protocol Error: nonce {0} sent without an auxiliary channel")]
    NonceWithoutChannel(i64),

    /// The command does not fit the platform's argument limit
    #[error("Command too long ({len} bytes, limit {max})")]
    CommandTooLong { len: usize, max: usize },

    /// Local failure unrelated to the caller
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Internal(_) => ErrorKind::Internal,
            Self::AuthenticationFailure(_) => ErrorKind::AuthenticationFailure,
            Self::EmptyCredential
            | Self::EmptyPayload
            | Self::TruncatedPayload { .. }
            | Self::MalformedField { .. }
            | Self::PortMismatch { .. }
            | Self::NonceWithoutChannel(_) => ErrorKind::Protocol,
            Self::UnknownUser(_) | Self::UidMismatch { .. } | Self::AddressNotLocal(_) => {
                ErrorKind::PermissionDenied
            }
            Self::CommandTooLong { .. } => ErrorKind::CommandTooLong,
            Self::VersionMismatch { .. } => ErrorKind::VersionMismatch,
        }
    }

    /// Whether the error means the client broke the wire protocol.
    ///
    /// Version mismatches count as protocol errors.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Protocol | ErrorKind::VersionMismatch)
    }

    /// Message safe to send back to the rejected caller.
    ///
    /// Internal and account details are withheld and the text is bounded
    /// to [`MAX_ERROR_MESSAGE_LEN`] bytes. The full detail stays in
    /// `Display` for logging.
    pub fn client_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => INTERNAL_ERROR_MESSAGE.to_string(),
            ErrorKind::PermissionDenied => PERMISSION_DENIED_MESSAGE.to_string(),
            _ => truncate_message(self.to_string()),
        }
    }
}

impl From<TruncatedBuffer> for AuthError {
    fn from(err: TruncatedBuffer) -> Self {
        Self::TruncatedPayload { offset: err.offset }
    }
}

/// Terminal failure of an authentication attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{stage}: {error}")]
pub struct Rejection {
    /// Stage whose acceptance rule failed
    pub stage: Stage,
    /// Why it failed
    #[source]
    pub error: AuthError,
}

impl Rejection {
    /// Record a failure at `stage`.
    pub fn new(stage: Stage, error: AuthError) -> Self {
        Self { stage, error }
    }

    /// Taxonomy bucket of the underlying error.
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// Bounded message for the caller.
    pub fn message(&self) -> String {
        self.error.client_message()
    }
}

fn truncate_message(mut message: String) -> String {
    if message.len() > MAX_ERROR_MESSAGE_LEN {
        let mut end = MAX_ERROR_MESSAGE_LEN;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}
