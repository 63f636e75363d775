//! # Protocol Field Validation
//!
//! Sequential state machine over the decoded payload:
//!
//! ```text
//! DECODED -> USER_VERIFIED -> VERSION_VERIFIED -> IP_VERIFIED
//!         -> PORT_VERIFIED -> NONCE_VERIFIED -> COMMAND_EXTRACTED -> SUCCESS
//! ```
//!
//! Each stage reads exactly one field and either advances the
//! [`AuthContext`] or ends the attempt with a [`Rejection`]. Nothing after a
//! failing field is read.

use super::entities::{AuthContext, AuthenticatedCommand};
use super::errors::{AuthError, Rejection};
use super::identity::verify_identity;
use super::network::has_interface_address;
use super::tokenizer::Payload;
use crate::ports::outbound::{AccountDirectory, InterfaceSource};
use std::ffi::OsString;
use std::fmt;
use std::net::Ipv4Addr;
use std::os::unix::ffi::OsStringExt;
use tracing::debug;

/// Steps of a single authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The authority accepted the credential and produced a payload
    Decoded,
    /// Username resolved and reconciled with the attested uid
    UserVerified,
    /// Client protocol version matches ours
    VersionVerified,
    /// Claimed server address is one of ours
    IpVerified,
    /// Claimed port matches the connection
    PortVerified,
    /// Nonce is consistent with the port
    NonceVerified,
    /// Command read and within limits
    CommandExtracted,
    /// Every stage passed
    Success,
}

impl Stage {
    /// Stages that each consume one payload field, in wire order.
    pub const FIELD_STAGES: [Stage; 6] = [
        Stage::UserVerified,
        Stage::VersionVerified,
        Stage::IpVerified,
        Stage::PortVerified,
        Stage::NonceVerified,
        Stage::CommandExtracted,
    ];

    fn field_name(self) -> &'static str {
        match self {
            Self::UserVerified => "username",
            Self::VersionVerified => "version",
            Self::IpVerified => "address",
            Self::PortVerified => "port",
            Self::NonceVerified => "nonce",
            Self::CommandExtracted => "command",
            Self::Decoded | Self::Success => "payload",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Decoded => "DECODED",
            Self::UserVerified => "USER_VERIFIED",
            Self::VersionVerified => "VERSION_VERIFIED",
            Self::IpVerified => "IP_VERIFIED",
            Self::PortVerified => "PORT_VERIFIED",
            Self::NonceVerified => "NONCE_VERIFIED",
            Self::CommandExtracted => "COMMAND_EXTRACTED",
            Self::Success => "SUCCESS",
        };
        f.write_str(name)
    }
}

/// Server-side values the payload is checked against.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules<'a> {
    /// Our protocol version, compared by exact string equality
    pub protocol_version: &'a str,
    /// Commands must be strictly shorter than this
    pub max_command_len: usize,
    /// Longest accepted username
    pub max_username_len: usize,
    /// Port the transport observed for this connection
    pub expected_port: u16,
}

/// Run every field stage over `payload`.
///
/// `ctx` must already hold the authority's uid and gid.
pub fn validate_payload<D, I>(
    mut ctx: AuthContext,
    payload: Payload<'_>,
    rules: &FieldRules<'_>,
    directory: &D,
    interfaces: &I,
) -> Result<AuthenticatedCommand, Rejection>
where
    D: AccountDirectory + ?Sized,
    I: InterfaceSource + ?Sized,
{
    let mut fields = payload.fields();

    for stage in Stage::FIELD_STAGES {
        let field = fields
            .next_field()
            .map_err(|e| Rejection::new(stage, e.into()))?;

        let outcome = match stage {
            Stage::UserVerified => verify_user(&mut ctx, field, rules.max_username_len, directory),
            Stage::VersionVerified => verify_version(&mut ctx, field, rules.protocol_version),
            Stage::IpVerified => verify_server_ip(&mut ctx, field, interfaces),
            Stage::PortVerified => verify_port(&mut ctx, field, rules.expected_port),
            Stage::NonceVerified => verify_nonce(&mut ctx, field, rules.expected_port),
            Stage::CommandExtracted => extract_command(&mut ctx, field, rules.max_command_len),
            Stage::Decoded | Stage::Success => Ok(()),
        };
        outcome.map_err(|e| Rejection::new(stage, e))?;

        debug!(stage = %stage, "credential stage passed");
    }

    finish(ctx).map_err(|e| Rejection::new(Stage::Success, e))
}

/// USER_VERIFIED: resolve the username against the account directory.
pub fn verify_user<D>(
    ctx: &mut AuthContext,
    field: &[u8],
    max_username_len: usize,
    directory: &D,
) -> Result<(), AuthError>
where
    D: AccountDirectory + ?Sized,
{
    let username = field_str(Stage::UserVerified, field)?;
    if username.len() > max_username_len {
        return Err(AuthError::MalformedField {
            field: Stage::UserVerified.field_name(),
            reason: format!("length {} exceeds {max_username_len}", username.len()),
        });
    }
    // No account has an empty name
    if username.is_empty() {
        return Err(AuthError::UnknownUser(String::new()));
    }

    let account = verify_identity(directory, username, ctx.authority_uid)?;
    ctx.username = Some(username.to_string());
    ctx.account = Some(account);
    Ok(())
}

/// VERSION_VERIFIED: exact match with our protocol version.
pub fn verify_version(
    ctx: &mut AuthContext,
    field: &[u8],
    protocol_version: &str,
) -> Result<(), AuthError> {
    let version = String::from_utf8_lossy(field);
    if version != protocol_version {
        return Err(AuthError::VersionMismatch {
            client: version.into_owned(),
            server: protocol_version.to_string(),
        });
    }

    ctx.version = Some(version.into_owned());
    Ok(())
}

/// IP_VERIFIED: the claimed server address must be bound on this host.
pub fn verify_server_ip<I>(
    ctx: &mut AuthContext,
    field: &[u8],
    interfaces: &I,
) -> Result<(), AuthError>
where
    I: InterfaceSource + ?Sized,
{
    let text = field_str(Stage::IpVerified, field)?;
    let addr: Ipv4Addr = text.parse().map_err(|_| AuthError::MalformedField {
        field: Stage::IpVerified.field_name(),
        reason: format!("{text:?} is not a dotted-decimal IPv4 address"),
    })?;

    if !has_interface_address(interfaces, addr)? {
        return Err(AuthError::AddressNotLocal(addr));
    }

    ctx.server_ip = Some(addr);
    Ok(())
}

/// PORT_VERIFIED: the claimed port must equal the one the transport saw.
pub fn verify_port(
    ctx: &mut AuthContext,
    field: &[u8],
    expected_port: u16,
) -> Result<(), AuthError> {
    let port = parse_decimal_field(Stage::PortVerified, field)?;
    if port != i64::from(expected_port) {
        return Err(AuthError::PortMismatch {
            expected: expected_port,
            claimed: port,
        });
    }

    ctx.port = Some(port);
    Ok(())
}

/// NONCE_VERIFIED: without an auxiliary channel the nonce must be zero.
pub fn verify_nonce(
    ctx: &mut AuthContext,
    field: &[u8],
    expected_port: u16,
) -> Result<(), AuthError> {
    let nonce = parse_decimal_field(Stage::NonceVerified, field)?;
    if expected_port == 0 && nonce != 0 {
        return Err(AuthError::NonceWithoutChannel(nonce));
    }

    ctx.nonce = Some(nonce);
    Ok(())
}

/// COMMAND_EXTRACTED: the command must be strictly shorter than the limit.
///
/// The bytes are passed through unchanged; no encoding is imposed.
pub fn extract_command(
    ctx: &mut AuthContext,
    field: &[u8],
    max_command_len: usize,
) -> Result<(), AuthError> {
    if field.len() >= max_command_len {
        return Err(AuthError::CommandTooLong {
            len: field.len(),
            max: max_command_len,
        });
    }

    ctx.command = Some(OsString::from_vec(field.to_vec()));
    Ok(())
}

/// Parse a decimal integer the way `strtol(s, NULL, 10)` reads it.
///
/// Leading ASCII whitespace and one sign are skipped, at least one digit is
/// required and anything after the digits is ignored. Returns `None` when
/// there are no digits or the value overflows `i64`.
pub fn parse_decimal(field: &[u8]) -> Option<i64> {
    let (negative, rest) = match field.trim_ascii_start() {
        [b'-', tail @ ..] => (true, tail),
        [b'+', tail @ ..] => (false, tail),
        rest => (false, rest),
    };

    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }

    rest[..digits].iter().try_fold(0i64, |acc, &d| {
        let d = i64::from(d - b'0');
        let acc = acc.checked_mul(10)?;
        if negative {
            acc.checked_sub(d)
        } else {
            acc.checked_add(d)
        }
    })
}

fn parse_decimal_field(stage: Stage, field: &[u8]) -> Result<i64, AuthError> {
    parse_decimal(field).ok_or_else(|| AuthError::MalformedField {
        field: stage.field_name(),
        reason: format!("{:?} is not a decimal number", String::from_utf8_lossy(field)),
    })
}

fn field_str(stage: Stage, field: &[u8]) -> Result<&str, AuthError> {
    std::str::from_utf8(field).map_err(|e| AuthError::MalformedField {
        field: stage.field_name(),
        reason: e.to_string(),
    })
}

fn finish(ctx: AuthContext) -> Result<AuthenticatedCommand, AuthError> {
    let incomplete = || AuthError::Internal("authentication context incomplete".to_string());

    Ok(AuthenticatedCommand {
        uid: ctx.authority_uid,
        gid: ctx.authority_gid,
        username: ctx.username.ok_or_else(incomplete)?,
        command: ctx.command.ok_or_else(incomplete)?,
        account: ctx.account.ok_or_else(incomplete)?,
    })
}
