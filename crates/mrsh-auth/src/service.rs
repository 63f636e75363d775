//! # Authentication Service
//!
//! Application service layer that implements the `CredentialAuthenticator`
//! trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`CredentialAuthenticator`)
//! - Uses the outbound ports (`CredentialAuthority`, `AccountDirectory`,
//!   `InterfaceSource`) for everything it cannot observe itself
//! - Delegates field validation to the domain layer
//!
//! The service holds no mutable state, so one instance may serve every
//! connection concurrently.

use crate::adapters::system::{SystemAccountDirectory, SystemInterfaces};
use crate::config::AuthConfig;
use crate::domain::entities::{AuthContext, AuthenticatedCommand};
use crate::domain::errors::{AuthError, ErrorKind, Rejection};
use crate::domain::stages::{validate_payload, FieldRules, Stage};
use crate::domain::tokenizer::Payload;
use crate::ports::inbound::CredentialAuthenticator;
use crate::ports::outbound::{
    AccountDirectory, AuthorityError, CredentialAuthority, InterfaceSource,
};
use tracing::{error, info, warn};

/// Credential Authentication Service.
pub struct AuthenticationService<A, D, I>
where
    A: CredentialAuthority,
    D: AccountDirectory,
    I: InterfaceSource,
{
    authority: A,
    directory: D,
    interfaces: I,
    config: AuthConfig,
}

impl<A: CredentialAuthority> AuthenticationService<A, SystemAccountDirectory, SystemInterfaces> {
    /// Create a service backed by this host's passwd database and interfaces.
    pub fn with_system(authority: A, config: AuthConfig) -> Self {
        Self::new(authority, SystemAccountDirectory, SystemInterfaces, config)
    }
}

impl<A, D, I> AuthenticationService<A, D, I>
where
    A: CredentialAuthority,
    D: AccountDirectory,
    I: InterfaceSource,
{
    /// Create a new authentication service.
    ///
    /// # Arguments
    /// * `authority` - Validates credentials and attests uid/gid
    /// * `directory` - Local account database
    /// * `interfaces` - This host's interface addresses
    /// * `config` - Protocol version and limits
    pub fn new(authority: A, directory: D, interfaces: I, config: AuthConfig) -> Self {
        Self {
            authority,
            directory,
            interfaces,
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn run(
        &self,
        credential: &[u8],
        expected_port: u16,
    ) -> Result<AuthenticatedCommand, Rejection> {
        if credential.is_empty() {
            return Err(Rejection::new(Stage::Decoded, AuthError::EmptyCredential));
        }

        // The decoded payload is owned here and dropped on every return path
        let decoded = self
            .authority
            .decode(credential)
            .map_err(|e| Rejection::new(Stage::Decoded, authority_error(e)))?;

        if decoded.payload.is_empty() {
            return Err(Rejection::new(Stage::Decoded, AuthError::EmptyPayload));
        }

        let rules = FieldRules {
            protocol_version: &self.config.protocol_version,
            max_command_len: self.config.max_command_len,
            max_username_len: self.config.max_username_len,
            expected_port,
        };

        validate_payload(
            AuthContext::new(decoded.uid, decoded.gid),
            Payload::new(&decoded.payload),
            &rules,
            &self.directory,
            &self.interfaces,
        )
    }
}

impl<A, D, I> CredentialAuthenticator for AuthenticationService<A, D, I>
where
    A: CredentialAuthority,
    D: AccountDirectory,
    I: InterfaceSource,
{
    fn authenticate(
        &self,
        credential: &[u8],
        expected_port: u16,
    ) -> Result<AuthenticatedCommand, Rejection> {
        let outcome = self.run(credential, expected_port);

        match &outcome {
            Ok(cmd) => info!(
                uid = cmd.uid,
                gid = cmd.gid,
                user = %cmd.username,
                port = expected_port,
                "credential authenticated"
            ),
            Err(rejection) => log_rejection(rejection, expected_port),
        }

        outcome
    }
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Map an authority refusal; only the authority's own breakdown is internal.
fn authority_error(err: AuthorityError) -> AuthError {
    match err {
        AuthorityError::Internal(detail) => AuthError::Internal(detail),
        other => AuthError::AuthenticationFailure(other.to_string()),
    }
}

fn log_rejection(rejection: &Rejection, port: u16) {
    let kind = rejection.kind();
    if kind == ErrorKind::Internal {
        error!(
            stage = %rejection.stage,
            detail = %rejection.error,
            port,
            "credential check failed internally"
        );
    } else {
        warn!(
            stage = %rejection.stage,
            kind = %kind,
            reason = %rejection.error,
            port,
            "credential rejected"
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================
