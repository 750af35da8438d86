use mocks::{MockFailure, MockIamMediator, MockStsMediator};
use session_creds::aws::{CallerIdentity, IamUser, SessionCredentials};
use session_creds::{CredentialsFile, Error, Refresher, Settings, StoredCredentials, VerifyOutcome};
use std::fs;
use std::path::{Path, PathBuf};

const SERIAL: &str = "arn:aws:iam::123456789012:mfa/jdoe";
const TOKEN: &str = "123456";

const EXISTING: &str = "[default]
aws_access_key_id=AKIABASE
aws_secret_access_key=base-secret

[mfa]
aws_access_key_id=ASIAOLD
aws_secret_access_key=old-secret
aws_session_token=old-token

[other]
aws_access_key_id=AKIAOTHER
aws_secret_access_key=other-secret
";

fn settings(token_code: &str, duration_seconds: i64) -> Settings {
    Settings {
        base_profile: "default".to_string(),
        target_profile: "mfa".to_string(),
        mfa_serial: SERIAL.to_string(),
        token_code: token_code.to_string(),
        duration_seconds,
    }
}

fn identity() -> CallerIdentity {
    CallerIdentity {
        user_id: "AIDAJDOE".to_string(),
        account: "123456789012".to_string(),
        arn: "arn:aws:iam::123456789012:user/jdoe".to_string(),
    }
}

fn issued() -> SessionCredentials {
    SessionCredentials {
        access_key_id: "ASIANEW".to_string(),
        secret_access_key: "new-secret".to_string(),
        session_token: "new-token".to_string(),
        expiration: "2021-06-15T21:00:00Z".to_string(),
    }
}

fn user() -> IamUser {
    IamUser {
        user_name: "jdoe".to_string(),
        user_id: "AIDAJDOE".to_string(),
        arn: "arn:aws:iam::123456789012:user/jdoe".to_string(),
    }
}

fn credentials_file(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("credentials");
    fs::write(&path, EXISTING).unwrap();
    path
}

// an STS mock that authenticates and issues `issued()` for the default duration
fn working_sts() -> MockStsMediator {
    let sts = MockStsMediator::new();
    sts.get_caller_identity.given(()).will_return(Ok(identity()));
    sts.get_session_token
        .given((SERIAL.to_string(), TOKEN.to_string(), 43_200))
        .will_return(Ok(issued()));
    sts
}

fn verified_iam() -> MockIamMediator {
    let iam = MockIamMediator::new();
    iam.get_user.given(()).will_return(Ok(user()));
    iam
}

fn profile(path: &Path, name: &str) -> Option<StoredCredentials> {
    CredentialsFile::load(path).unwrap().profile(name)
}

#[tokio::test]
async fn refresh_overwrites_target_profile_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = credentials_file(&dir);
    let sts = working_sts();
    let refresher = Refresher::new(sts.clone(), verified_iam(), settings(TOKEN, 43_200));

    let mut file = CredentialsFile::load(&path).unwrap();
    let report = refresher.run(&mut file).await.unwrap();

    assert_eq!(sts.calls(), vec!["get_caller_identity", "get_session_token"]);
    assert_eq!(report.identity, identity());
    assert_eq!(report.credentials, issued());
    assert_eq!(report.verification, VerifyOutcome::Verified(user()));
    assert_eq!(
        report.previous,
        Some(StoredCredentials {
            access_key_id: Some("ASIAOLD".to_string()),
            secret_access_key: Some("old-secret".to_string()),
            session_token: Some("old-token".to_string()),
        })
    );

    assert_eq!(
        profile(&path, "mfa"),
        Some(StoredCredentials {
            access_key_id: Some("ASIANEW".to_string()),
            secret_access_key: Some("new-secret".to_string()),
            session_token: Some("new-token".to_string()),
        })
    );
    let base = profile(&path, "default").unwrap();
    assert_eq!(base.access_key_id.as_deref(), Some("AKIABASE"));
    assert_eq!(base.secret_access_key.as_deref(), Some("base-secret"));
    let other = profile(&path, "other").unwrap();
    assert_eq!(other.access_key_id.as_deref(), Some("AKIAOTHER"));
    assert_eq!(other.session_token, None);
}

#[tokio::test]
async fn missing_target_profile_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials");
    fs::write(
        &path,
        "[default]\naws_access_key_id=AKIABASE\naws_secret_access_key=base-secret\n",
    )
    .unwrap();
    let refresher = Refresher::new(working_sts(), verified_iam(), settings(TOKEN, 43_200));

    let mut file = CredentialsFile::load(&path).unwrap();
    let report = refresher.run(&mut file).await.unwrap();

    assert_eq!(report.previous, None);
    assert_eq!(
        profile(&path, "mfa").unwrap().session_token.as_deref(),
        Some("new-token")
    );
}

#[tokio::test]
async fn malformed_token_fails_before_any_call() {
    let dir = tempfile::tempdir().unwrap();
    let path = credentials_file(&dir);
    let sts = working_sts();
    let refresher = Refresher::new(sts.clone(), verified_iam(), settings("12345a", 43_200));

    let mut file = CredentialsFile::load(&path).unwrap();
    let err = refresher.run(&mut file).await.unwrap_err();

    assert!(matches!(err, Error::InvalidMfaToken { length: 6 }));
    assert!(sts.calls().is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), EXISTING);
}

#[tokio::test]
async fn out_of_range_duration_fails_before_any_call() {
    let dir = tempfile::tempdir().unwrap();
    let path = credentials_file(&dir);
    let sts = working_sts();
    let refresher = Refresher::new(sts.clone(), verified_iam(), settings(TOKEN, 129_601));

    let mut file = CredentialsFile::load(&path).unwrap();
    let err = refresher.run(&mut file).await.unwrap_err();

    assert!(matches!(err, Error::InvalidDuration { seconds: 129_601, .. }));
    assert!(sts.calls().is_empty());
}

#[tokio::test]
async fn unauthenticated_base_profile_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = credentials_file(&dir);
    let sts = MockStsMediator::new();
    sts.get_caller_identity
        .given(())
        .will_return(Err(MockFailure::AccessDenied));
    let refresher = Refresher::new(sts.clone(), verified_iam(), settings(TOKEN, 43_200));

    let mut file = CredentialsFile::load(&path).unwrap();
    let err = refresher.run(&mut file).await.unwrap_err();

    assert!(matches!(err, Error::CallerIdentity { ref profile, .. } if profile == "default"));
    assert_eq!(sts.calls(), vec!["get_caller_identity"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), EXISTING);
}

#[tokio::test]
async fn rejected_mfa_code_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = credentials_file(&dir);
    let sts = MockStsMediator::new();
    sts.get_caller_identity.given(()).will_return(Ok(identity()));
    sts.get_session_token
        .given((SERIAL.to_string(), TOKEN.to_string(), 43_200))
        .will_return(Err(MockFailure::AccessDenied));
    let refresher = Refresher::new(sts, verified_iam(), settings(TOKEN, 43_200));

    let mut file = CredentialsFile::load(&path).unwrap();
    let err = refresher.run(&mut file).await.unwrap_err();

    assert!(
        matches!(err, Error::SessionToken { ref serial_number, .. } if serial_number == SERIAL)
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), EXISTING);
}

#[tokio::test]
async fn requested_duration_is_passed_to_sts() {
    let dir = tempfile::tempdir().unwrap();
    let path = credentials_file(&dir);
    let sts = MockStsMediator::new();
    sts.get_caller_identity.given(()).will_return(Ok(identity()));
    sts.get_session_token
        .given((SERIAL.to_string(), TOKEN.to_string(), 900))
        .will_return(Ok(issued()));
    let refresher = Refresher::new(sts, verified_iam(), settings(TOKEN, 900));

    let mut file = CredentialsFile::load(&path).unwrap();
    assert!(refresher.run(&mut file).await.is_ok());
}

#[tokio::test]
async fn unknown_user_is_only_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = credentials_file(&dir);
    let iam = MockIamMediator::new();
    iam.get_user.given(()).will_return(Err(MockFailure::NoSuchEntity(
        "The user with name jdoe cannot be found.".to_string(),
    )));
    let refresher = Refresher::new(working_sts(), iam, settings(TOKEN, 43_200));

    let mut file = CredentialsFile::load(&path).unwrap();
    let report = refresher.run(&mut file).await.unwrap();

    assert_eq!(
        report.verification,
        VerifyOutcome::EntityNotFound("The user with name jdoe cannot be found.".to_string())
    );
    assert_eq!(
        profile(&path, "mfa").unwrap().access_key_id.as_deref(),
        Some("ASIANEW")
    );
}

#[tokio::test]
async fn iam_service_failure_is_only_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = credentials_file(&dir);
    let iam = MockIamMediator::new();
    iam.get_user
        .given(())
        .will_return(Err(MockFailure::ServiceFailure("internal".to_string())));
    let refresher = Refresher::new(working_sts(), iam, settings(TOKEN, 43_200));

    let mut file = CredentialsFile::load(&path).unwrap();
    let report = refresher.run(&mut file).await.unwrap();

    assert_eq!(
        report.verification,
        VerifyOutcome::ServiceFailure("internal".to_string())
    );
}

#[tokio::test]
async fn other_verification_errors_are_fatal_but_credentials_stay_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = credentials_file(&dir);
    let iam = MockIamMediator::new();
    iam.get_user
        .given(())
        .will_return(Err(MockFailure::AccessDenied));
    let refresher = Refresher::new(working_sts(), iam, settings(TOKEN, 43_200));

    let mut file = CredentialsFile::load(&path).unwrap();
    let err = refresher.run(&mut file).await.unwrap_err();

    assert!(matches!(err, Error::VerifyProfile { ref profile, .. } if profile == "mfa"));
    assert_eq!(
        profile(&path, "mfa").unwrap().session_token.as_deref(),
        Some("new-token")
    );
}
