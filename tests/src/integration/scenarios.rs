//! # Acceptance Scenarios
//!
//! End-to-end scenarios through a real HMAC credential, the field stages
//! and the fixture host:
//!
//! | Scenario | Change from the happy path | Verdict |
//! |----------|---------------------------|---------|
//! | A | none | success |
//! | B | server speaks 2.0 | VersionMismatch |
//! | C | address 9.9.9.9 | PermissionDenied |
//! | D | port 0 with nonce 17 | ProtocolError |
//! | E | user bob | PermissionDenied |
//! | F | payload ends after version | ProtocolError at IP_VERIFIED |

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, mint, raw_payload, ALICE_GID, ALICE_UID};
    use mrsh_auth::{AuthError, CredentialAuthenticator, ErrorKind, Stage};
    use std::os::unix::ffi::OsStrExt;

    const HAPPY: [&str; 6] = ["alice", "1.0", "10.0.0.5", "4000", "7f3", "ls -l"];

    /// Scenario A: a well-formed credential from alice is accepted
    #[test]
    fn test_scenario_a_success() {
        let credential = mint(&HAPPY, ALICE_UID, ALICE_GID);

        let cmd = fixtures::service().authenticate(&credential, 4000).unwrap();

        assert_eq!(cmd.uid, ALICE_UID);
        assert_eq!(cmd.gid, ALICE_GID);
        assert_eq!(cmd.username, "alice");
        assert_eq!(cmd.command, "ls -l");
    }

    /// Scenario B: a server on another protocol version refuses
    #[test]
    fn test_scenario_b_version_mismatch() {
        let credential = mint(&HAPPY, ALICE_UID, ALICE_GID);

        let rejection = fixtures::service_with_version("2.0")
            .authenticate(&credential, 4000)
            .unwrap_err();

        assert_eq!(rejection.kind(), ErrorKind::VersionMismatch);
        assert_eq!(rejection.stage, Stage::VersionVerified);
        assert_eq!(
            rejection.message(),
            "Client protocol version (1.0) does not match server version (2.0)"
        );
    }

    /// Scenario C: a credential naming another server's address is refused
    #[test]
    fn test_scenario_c_foreign_address() {
        let credential = mint(
            &["alice", "1.0", "9.9.9.9", "4000", "7f3", "ls -l"],
            ALICE_UID,
            ALICE_GID,
        );

        let rejection = fixtures::service().authenticate(&credential, 4000).unwrap_err();

        assert_eq!(rejection.kind(), ErrorKind::PermissionDenied);
        assert_eq!(rejection.stage, Stage::IpVerified);
        assert!(!rejection.error.is_protocol_error());
    }

    /// Scenario D: a nonce without an auxiliary channel is a protocol error
    #[test]
    fn test_scenario_d_nonce_without_channel() {
        let credential = mint(
            &["alice", "1.0", "10.0.0.5", "0", "17", "ls -l"],
            ALICE_UID,
            ALICE_GID,
        );

        let rejection = fixtures::service().authenticate(&credential, 0).unwrap_err();

        assert_eq!(rejection.kind(), ErrorKind::Protocol);
        assert_eq!(rejection.stage, Stage::NonceVerified);
        assert_eq!(rejection.error, AuthError::NonceWithoutChannel(17));
    }

    /// Scenario E: an unknown user is denied, not a protocol error
    #[test]
    fn test_scenario_e_unknown_user() {
        let credential = mint(
            &["bob", "1.0", "10.0.0.5", "4000", "7f3", "ls -l"],
            ALICE_UID,
            ALICE_GID,
        );

        let rejection = fixtures::service().authenticate(&credential, 4000).unwrap_err();

        assert_eq!(rejection.kind(), ErrorKind::PermissionDenied);
        assert_eq!(rejection.stage, Stage::UserVerified);
        assert_eq!(rejection.error, AuthError::UnknownUser("bob".into()));
    }

    /// Scenario F: a payload ending after the version truncates at IP_VERIFIED
    #[test]
    fn test_scenario_f_truncated_payload() {
        let credential = mint(&["alice", "1.0"], ALICE_UID, ALICE_GID);

        let rejection = fixtures::service().authenticate(&credential, 4000).unwrap_err();

        assert_eq!(rejection.kind(), ErrorKind::Protocol);
        assert_eq!(rejection.stage, Stage::IpVerified);
        assert!(matches!(rejection.error, AuthError::TruncatedPayload { .. }));
    }

    /// Port 0 with nonce 0 is the no-auxiliary-channel happy path
    #[test]
    fn test_no_auxiliary_channel() {
        let credential = mint(
            &["alice", "1.0", "10.0.0.5", "0", "0", "uptime"],
            ALICE_UID,
            ALICE_GID,
        );

        let cmd = fixtures::service().authenticate(&credential, 0).unwrap();
        assert_eq!(cmd.command, "uptime");
    }

    /// A normal user cannot run commands as root
    #[test]
    fn test_user_cannot_claim_root() {
        let credential = mint(
            &["root", "1.0", "10.0.0.5", "4000", "1", "id"],
            ALICE_UID,
            ALICE_GID,
        );

        let rejection = fixtures::service().authenticate(&credential, 4000).unwrap_err();
        assert_eq!(rejection.kind(), ErrorKind::PermissionDenied);
        assert!(matches!(rejection.error, AuthError::UidMismatch { .. }));
    }

    /// Root may run commands as alice
    #[test]
    fn test_root_may_act_as_alice() {
        let credential = mint(&HAPPY, 0, 0);

        let cmd = fixtures::service().authenticate(&credential, 4000).unwrap();
        assert_eq!(cmd.uid, 0);
        assert_eq!(cmd.account.uid, ALICE_UID);
    }

    /// The loopback address is never accepted as the server address
    #[test]
    fn test_loopback_address_refused() {
        let credential = mint(
            &["alice", "1.0", "127.0.0.1", "4000", "1", "id"],
            ALICE_UID,
            ALICE_GID,
        );

        let rejection = fixtures::service().authenticate(&credential, 4000).unwrap_err();
        assert_eq!(rejection.kind(), ErrorKind::PermissionDenied);
    }

    /// A Latin-1 command is executed as sent, not rejected
    #[test]
    fn test_non_utf8_command() {
        let fields: [&[u8]; 6] = [
            b"alice",
            b"1.0",
            b"10.0.0.5",
            b"4000",
            b"0",
            b"cat caf\xe9.txt",
        ];
        let credential = fixtures::authority()
            .encode(&raw_payload(&fields), ALICE_UID, ALICE_GID)
            .unwrap();

        let cmd = fixtures::service().authenticate(&credential, 4000).unwrap();
        assert_eq!(cmd.command.as_bytes(), b"cat caf\xe9.txt");
    }

    /// Unknown users and foreign accounts get the same answer
    #[test]
    fn test_denials_do_not_reveal_accounts() {
        let service = fixtures::service();
        let unknown = mint(&["nosuch", "1.0", "10.0.0.5", "4000", "1", "id"], ALICE_UID, ALICE_GID);
        let foreign = mint(&["root", "1.0", "10.0.0.5", "4000", "1", "id"], ALICE_UID, ALICE_GID);

        let unknown = service.authenticate(&unknown, 4000).unwrap_err();
        let foreign = service.authenticate(&foreign, 4000).unwrap_err();

        assert_eq!(unknown.message(), "Permission Denied");
        assert_eq!(foreign.message(), unknown.message());
    }

    /// An empty username is refused as an unknown user
    #[test]
    fn test_empty_username_denied() {
        let credential = mint(&["", "1.0", "10.0.0.5", "4000", "1", "id"], ALICE_UID, ALICE_GID);

        let rejection = fixtures::service().authenticate(&credential, 4000).unwrap_err();
        assert_eq!(rejection.kind(), ErrorKind::PermissionDenied);
        assert_eq!(rejection.stage, Stage::UserVerified);
    }
}
