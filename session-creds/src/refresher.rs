use crate::aws::error::Error as AwsError;
use crate::aws::{CallerIdentity, IamMediator, IamUser, SessionCredentials, StsMediator};
use crate::credentials::{CredentialsFile, StoredCredentials};
use crate::error::{self, Result};
use log::{debug, info, warn};
use rusoto_core::RusotoError;
use rusoto_iam::GetUserError;
use snafu::{ensure, ResultExt};

/// Shortest session STS will issue, in seconds
pub const MIN_DURATION_SECS: i64 = 900;
/// Longest session STS will issue for an IAM user, in seconds
pub const MAX_DURATION_SECS: i64 = 129_600;
/// 12 hours
pub const DEFAULT_DURATION_SECS: i64 = 43_200;

/// Everything the refresher needs besides the AWS mediators.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Profile the MFA code is exchanged under
    pub base_profile: String,
    /// Profile the temporary credentials are written to
    pub target_profile: String,
    /// Serial number or ARN of the MFA device
    pub mfa_serial: String,
    pub token_code: String,
    pub duration_seconds: i64,
}

/// How the check of the new profile went. Only `Verified` proves the credentials work, but the
/// other two do not fail the refresh: the credentials have already been written by then.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyOutcome {
    Verified(IamUser),
    EntityNotFound(String),
    ServiceFailure(String),
}

/// What a refresh did, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub identity: CallerIdentity,
    pub credentials: SessionCredentials,
    /// The target profile before it was overwritten, `None` if it did not exist
    pub previous: Option<StoredCredentials>,
    pub verification: VerifyOutcome,
}

pub fn validate_token(token_code: &str) -> Result<()> {
    ensure!(
        token_code.len() == 6 && token_code.bytes().all(|b| b.is_ascii_digit()),
        error::InvalidMfaToken {
            length: token_code.chars().count()
        }
    );
    Ok(())
}

pub fn validate_duration(seconds: i64) -> Result<()> {
    ensure!(
        (MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&seconds),
        error::InvalidDuration {
            seconds,
            min: MIN_DURATION_SECS,
            max: MAX_DURATION_SECS,
        }
    );
    Ok(())
}

/// Swaps an MFA code for temporary credentials and stores them under the target profile.
///
/// `sts` must sign with the base profile and `iam` with the target profile, both reading the
/// credentials file the refresher writes to.
pub struct Refresher<S: StsMediator, I: IamMediator> {
    sts: S,
    iam: I,
    settings: Settings,
}

impl<S: StsMediator, I: IamMediator> Refresher<S, I> {
    pub fn new(sts: S, iam: I, settings: Settings) -> Self {
        Self { sts, iam, settings }
    }

    /// Runs the refresh. Input is validated before any AWS call; the credentials file is only
    /// touched once STS has issued the new credentials.
    pub async fn run(&self, file: &mut CredentialsFile) -> Result<RefreshReport> {
        validate_token(&self.settings.token_code)?;
        validate_duration(self.settings.duration_seconds)?;

        info!(
            "Getting caller identity of profile {}",
            self.settings.base_profile
        );
        let identity = self
            .sts
            .get_caller_identity()
            .await
            .context(error::CallerIdentity {
                profile: self.settings.base_profile.as_str(),
            })?;
        debug!("Caller identity: {:?}", identity);

        info!(
            "Requesting a {} second session with MFA device {}",
            self.settings.duration_seconds, self.settings.mfa_serial
        );
        let credentials = self
            .sts
            .get_session_token(
                &self.settings.mfa_serial,
                &self.settings.token_code,
                self.settings.duration_seconds,
            )
            .await
            .context(error::SessionToken {
                serial_number: self.settings.mfa_serial.as_str(),
            })?;
        info!("Session credentials expire at {}", credentials.expiration);

        let previous = file.profile(&self.settings.target_profile);
        file.set_profile(&self.settings.target_profile, &credentials);
        file.save()?;
        info!(
            "Wrote profile {} to {}",
            self.settings.target_profile,
            file.path().display()
        );

        let verification = self.verify().await?;
        Ok(RefreshReport {
            identity,
            credentials,
            previous,
            verification,
        })
    }

    async fn verify(&self) -> Result<VerifyOutcome> {
        info!(
            "Verifying profile {} with IAM GetUser",
            self.settings.target_profile
        );
        match self.iam.get_user().await {
            Ok(user) => Ok(VerifyOutcome::Verified(user)),
            Err(AwsError::GetUser {
                source: RusotoError::Service(GetUserError::NoSuchEntity(msg)),
            }) => {
                warn!("IAM does not know the user of the new credentials: {}", msg);
                Ok(VerifyOutcome::EntityNotFound(msg))
            }
            Err(AwsError::GetUser {
                source: RusotoError::Service(GetUserError::ServiceFailure(msg)),
            }) => {
                warn!("IAM failed to verify the new credentials: {}", msg);
                Ok(VerifyOutcome::ServiceFailure(msg))
            }
            Err(source) => Err(source).context(error::VerifyProfile {
                profile: self.settings.target_profile.as_str(),
            }),
        }
    }
}
