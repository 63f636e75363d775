//! # mrsh Credential Authentication
//!
//! Authenticates the caller of the remote shell daemon from a signed
//! credential and extracts the command the caller wants executed.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Payload tokenizer, field validation stages,
//!   identity and address rules. No I/O.
//! - **Ports Layer** (`ports/`): Inbound authenticator API and the outbound
//!   credential authority, account directory, interface and clock traits
//! - **Adapters Layer** (`adapters/`): HMAC credential authority, passwd and
//!   `getifaddrs` lookups, credential read from the connection
//! - **Service Layer** (`service.rs`): Wires the stages to the ports
//!
//! ## Payload Format
//!
//! Once the credential authority has decoded a credential, its payload is a
//! sequence of NUL-terminated fields:
//!
//! ```text
//! username \0 version \0 server_ip \0 port \0 nonce \0 command \0
//! ```
//!
//! ## Security Notes
//!
//! - **Authority uid is ground truth**: the username in the payload is only
//!   honoured when it resolves to the attested uid, or the attested uid is 0
//! - **Server address binding**: the claimed server address must be one of
//!   this host's own IPv4 addresses (loopback excluded), queried per call
//! - **Fail closed**: the first failing field ends validation

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::hmac_authority::HmacCredentialAuthority;
pub use adapters::system::{SystemAccountDirectory, SystemInterfaces, SystemTimeSource};
pub use adapters::transport::{read_credential, TransportError, MAX_CREDENTIAL_SIZE};
pub use config::{AuthConfig, ConfigError};
pub use domain::entities::{AccountRecord, AuthenticatedCommand, DecodedCredential};
pub use domain::errors::{AuthError, ErrorKind, Rejection};
pub use domain::stages::Stage;
pub use domain::tokenizer::{Cursor, FieldReader, Payload, TruncatedBuffer};
pub use ports::inbound::CredentialAuthenticator;
pub use ports::outbound::{
    AccountDirectory, AuthorityError, CredentialAuthority, DirectoryError, InterfaceError,
    InterfaceSource, TimeSource,
};
pub use service::AuthenticationService;
