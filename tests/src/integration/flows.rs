//! # Integration Test Flows
//!
//! Connection-level flows: the client writes its credential over a socket,
//! the server reads it with the transport adapter and authenticates it.
//!
//! ## Flows Tested:
//!
//! 1. **Transport → Authority → Authenticator**: a credential read from a
//!    stream authenticates and leaves later stream data unread
//! 2. **Replay**: the same credential cannot be used twice
//! 3. **Tampering and expiry**: authority refusals surface as
//!    authentication failures
//! 4. **Configuration**: a server configured from TOML enforces its limits

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, mint, payload, ALICE_GID, ALICE_UID, CLUSTER_KEY, NOW};
    use mrsh_auth::adapters::testing::FixedTimeSource;
    use mrsh_auth::{
        read_credential, AuthConfig, AuthenticationService, CredentialAuthenticator, ErrorKind,
        HmacCredentialAuthority,
    };
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const HAPPY: [&str; 6] = ["alice", "1.0", "10.0.0.5", "4000", "7f3", "ls -l"];

    /// Test: a credential read from a stream authenticates and stdin stays unread
    #[tokio::test]
    async fn test_credential_over_stream() {
        let (mut client, mut server) = tokio::io::duplex(8192);
        let credential = mint(&HAPPY, ALICE_UID, ALICE_GID);

        client.write_all(&credential).await.unwrap();
        client.write_all(b"\0stdin payload").await.unwrap();
        drop(client);

        let received = read_credential(&mut server).await.unwrap();
        let cmd = fixtures::service().authenticate(&received, 4000).unwrap();
        assert_eq!(cmd.command, "ls -l");

        let mut rest = Vec::new();
        server.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, b"stdin payload");
    }

    /// Test: a client that connects and hangs up sends a null credential
    #[tokio::test]
    async fn test_null_credential_over_stream() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);

        let received = read_credential(&mut server).await.unwrap();
        let rejection = fixtures::service().authenticate(&received, 4000).unwrap_err();

        assert_eq!(rejection.kind(), ErrorKind::Protocol);
        assert!(rejection.message().contains("null credential"));
    }

    /// Test: the second use of a credential is a replay
    #[test]
    fn test_replayed_credential() {
        let service = fixtures::service();
        let credential = mint(&HAPPY, ALICE_UID, ALICE_GID);

        assert!(service.authenticate(&credential, 4000).is_ok());

        let rejection = service.authenticate(&credential, 4000).unwrap_err();
        assert_eq!(rejection.kind(), ErrorKind::AuthenticationFailure);
        assert_eq!(rejection.message(), "Authentication Failure: Replayed credential");
    }

    /// Test: a credential edited in transit fails authentication
    #[test]
    fn test_tampered_credential() {
        let mut credential = mint(&HAPPY, ALICE_UID, ALICE_GID);
        // Flip one hex digit inside the body
        let idx = credential.len() / 2;
        credential[idx] = if credential[idx] == b'0' { b'1' } else { b'0' };

        let rejection = fixtures::service().authenticate(&credential, 4000).unwrap_err();
        assert_eq!(rejection.kind(), ErrorKind::AuthenticationFailure);
    }

    /// Test: an expired credential fails authentication
    #[test]
    fn test_expired_credential() {
        let old = HmacCredentialAuthority::with_clock(CLUSTER_KEY, FixedTimeSource::new(NOW - 600));
        let credential = old.encode(&payload(&HAPPY), ALICE_UID, ALICE_GID).unwrap();

        let rejection = fixtures::service().authenticate(&credential, 4000).unwrap_err();
        assert_eq!(rejection.message(), "Authentication Failure: Expired credential");
    }

    /// Test: a credential minted with another cluster key is rejected
    #[test]
    fn test_foreign_cluster_key() {
        let foreign = HmacCredentialAuthority::with_clock(b"other-cluster".to_vec(), FixedTimeSource::new(NOW));
        let credential = foreign.encode(&payload(&HAPPY), ALICE_UID, ALICE_GID).unwrap();

        let rejection = fixtures::service().authenticate(&credential, 4000).unwrap_err();
        assert_eq!(rejection.message(), "Authentication Failure: Invalid credential");
    }

    /// Test: limits loaded from TOML apply to the command field
    #[test]
    fn test_configured_command_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[auth]\nprotocol_version = \"1.0\"\nmax_command_len = 4").unwrap();
        let config = AuthConfig::from_file(file.path()).unwrap();

        let service = AuthenticationService::new(
            fixtures::authority(),
            fixtures::directory(),
            fixtures::interfaces(),
            config,
        );

        let short = mint(&["alice", "1.0", "10.0.0.5", "4000", "1", "id"], ALICE_UID, ALICE_GID);
        assert!(service.authenticate(&short, 4000).is_ok());

        let long = mint(&HAPPY, ALICE_UID, ALICE_GID);
        let rejection = service.authenticate(&long, 4000).unwrap_err();
        assert_eq!(rejection.kind(), ErrorKind::CommandTooLong);
    }
}
