use crate::aws::client::build_client;
use crate::aws::error::{self, Result};
use crate::aws::region_from_string;
use async_trait::async_trait;
use rusoto_iam::{GetUserRequest, Iam, IamClient};
use rusoto_sts::{GetCallerIdentityRequest, GetSessionTokenRequest, Sts, StsClient};
use snafu::{OptionExt, ResultExt};
use std::path::Path;

/// Who the base profile authenticates as.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerIdentity {
    pub user_id: String,
    pub account: String,
    pub arn: String,
}

/// Temporary credentials issued by `GetSessionToken`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    /// ISO 8601 timestamp after which the credentials stop working
    pub expiration: String,
}

/// The IAM user the temporary credentials belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct IamUser {
    pub user_name: String,
    pub user_id: String,
    pub arn: String,
}

/// Introducing a trait abstraction over the the STS API allows us to mock the API and write tests
/// without going to the extremely low level of `rusoto_mock`.
#[async_trait]
pub trait StsMediator {
    /// Describes the identity of the profile the mediator signs with
    async fn get_caller_identity(&self) -> Result<CallerIdentity>;

    /// Exchanges an MFA code for temporary credentials valid for `duration_seconds`
    async fn get_session_token(
        &self,
        serial_number: &str,
        token_code: &str,
        duration_seconds: i64,
    ) -> Result<SessionCredentials>;
}

/// Trait abstraction over the IAM API, see [`StsMediator`].
#[async_trait]
pub trait IamMediator {
    /// Describes the user the mediator signs as
    async fn get_user(&self) -> Result<IamUser>;
}

pub struct AwsStsMediator {
    sts_client: StsClient,
}

impl AwsStsMediator {
    pub fn new(region_name: &str, profile: &str, credentials_file: &Path) -> Result<Self> {
        let region = region_from_string(region_name)?;
        let sts_client = build_client::<StsClient>(&region, profile, credentials_file)?;
        Ok(AwsStsMediator { sts_client })
    }
}

#[async_trait]
impl StsMediator for AwsStsMediator {
    async fn get_caller_identity(&self) -> Result<CallerIdentity> {
        let resp = self
            .sts_client
            .get_caller_identity(GetCallerIdentityRequest {})
            .await
            .context(error::GetCallerIdentity)?;
        Ok(CallerIdentity {
            user_id: resp.user_id.context(error::StsMissingField {
                api: "get_caller_identity",
                field: "user_id",
            })?,
            account: resp.account.context(error::StsMissingField {
                api: "get_caller_identity",
                field: "account",
            })?,
            arn: resp.arn.context(error::StsMissingField {
                api: "get_caller_identity",
                field: "arn",
            })?,
        })
    }

    async fn get_session_token(
        &self,
        serial_number: &str,
        token_code: &str,
        duration_seconds: i64,
    ) -> Result<SessionCredentials> {
        let resp = self
            .sts_client
            .get_session_token(GetSessionTokenRequest {
                duration_seconds: Some(duration_seconds),
                serial_number: Some(serial_number.to_string()),
                token_code: Some(token_code.to_string()),
            })
            .await
            .context(error::GetSessionToken)?;
        let credentials = resp.credentials.context(error::StsMissingField {
            api: "get_session_token",
            field: "credentials",
        })?;
        Ok(SessionCredentials {
            access_key_id: credentials.access_key_id,
            secret_access_key: credentials.secret_access_key,
            session_token: credentials.session_token,
            expiration: credentials.expiration,
        })
    }
}

pub struct AwsIamMediator {
    iam_client: IamClient,
}

impl AwsIamMediator {
    pub fn new(region_name: &str, profile: &str, credentials_file: &Path) -> Result<Self> {
        let region = region_from_string(region_name)?;
        let iam_client = build_client::<IamClient>(&region, profile, credentials_file)?;
        Ok(AwsIamMediator { iam_client })
    }
}

#[async_trait]
impl IamMediator for AwsIamMediator {
    async fn get_user(&self) -> Result<IamUser> {
        let resp = self
            .iam_client
            .get_user(GetUserRequest { user_name: None })
            .await
            .context(error::GetUser)?;
        Ok(IamUser {
            user_name: resp.user.user_name,
            user_id: resp.user.user_id,
            arn: resp.user.arn,
        })
    }
}
