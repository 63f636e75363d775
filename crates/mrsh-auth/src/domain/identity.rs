//! # Identity Verification
//!
//! Reconciles the username a caller claims with the uid the credential
//! authority attests.
//!
//! The attested uid is ground truth. A caller may act as the account it
//! claims only if that account's uid equals the attested uid, unless the
//! attested uid is 0: the superuser may act as any local account.

use super::entities::AccountRecord;
use super::errors::AuthError;
use crate::ports::outbound::AccountDirectory;

/// Uid the credential authority reports for the superuser.
pub const SUPERUSER_UID: u32 = 0;

/// Whether a caller attested as `authority_uid` may act as an account owned
/// by `account_uid`.
pub fn uid_may_act_as(account_uid: u32, authority_uid: u32) -> bool {
    account_uid == authority_uid || authority_uid == SUPERUSER_UID
}

/// Resolve `claimed_username` and check the attested uid may use it.
///
/// # Errors
/// * `AuthError::UnknownUser` - no local account has that name
/// * `AuthError::UidMismatch` - the account belongs to someone else
/// * `AuthError::Internal` - the directory lookup itself failed
pub fn verify_identity<D>(
    directory: &D,
    claimed_username: &str,
    authority_uid: u32,
) -> Result<AccountRecord, AuthError>
where
    D: AccountDirectory + ?Sized,
{
    let account = directory
        .lookup_by_name(claimed_username)
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .ok_or_else(|| AuthError::UnknownUser(claimed_username.to_string()))?;

    if !uid_may_act_as(account.uid, authority_uid) {
        return Err(AuthError::UidMismatch {
            username: claimed_username.to_string(),
            account_uid: account.uid,
            authority_uid,
        });
    }

    Ok(account)
}
