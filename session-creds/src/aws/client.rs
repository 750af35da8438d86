use crate::aws::error::{self, Result};
use rusoto_core::{DispatchSignedRequest, Region};
use rusoto_credential::{ProfileProvider, ProvideAwsCredentials};
use rusoto_iam::IamClient;
use rusoto_sts::StsClient;
use snafu::ResultExt;
use std::path::Path;

pub(crate) trait NewWith {
    fn new_with<P, D>(request_dispatcher: D, credentials_provider: P, region: Region) -> Self
    where
        P: ProvideAwsCredentials + Send + Sync + 'static,
        D: DispatchSignedRequest + Send + Sync + 'static;
}

impl NewWith for StsClient {
    fn new_with<P, D>(request_dispatcher: D, credentials_provider: P, region: Region) -> Self
    where
        P: ProvideAwsCredentials + Send + Sync + 'static,
        D: DispatchSignedRequest + Send + Sync + 'static,
    {
        Self::new_with(request_dispatcher, credentials_provider, region)
    }
}

impl NewWith for IamClient {
    fn new_with<P, D>(request_dispatcher: D, credentials_provider: P, region: Region) -> Self
    where
        P: ProvideAwsCredentials + Send + Sync + 'static,
        D: DispatchSignedRequest + Send + Sync + 'static,
    {
        Self::new_with(request_dispatcher, credentials_provider, region)
    }
}

/// Create a rusoto client of the given type that signs with `profile` from the credentials file at
/// `credentials_file`. The file is read each time credentials are needed, so a client built before
/// the profile is rewritten still picks up the new values.
pub(crate) fn build_client<T: NewWith>(
    region: &Region,
    profile: &str,
    credentials_file: &Path,
) -> Result<T> {
    let provider = ProfileProvider::with_configuration(credentials_file, profile);
    Ok(T::new_with(
        rusoto_core::HttpClient::new().context(error::HttpClient)?,
        provider,
        region.clone(),
    ))
}
