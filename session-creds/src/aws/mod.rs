/*!
`aws` module creates a wrapper around the STS and IAM api calls and provides well structured
output containing only the required fields.
*/
use crate::aws::error::Result;
use rusoto_core::Region;
use snafu::ResultExt;
use std::str::FromStr;

pub mod api;
pub(crate) mod client;
pub mod error;

pub use api::{
    AwsIamMediator, AwsStsMediator, CallerIdentity, IamMediator, IamUser, SessionCredentials,
    StsMediator,
};

/// Builds a Region from the given region name.
pub(crate) fn region_from_string(name: &str) -> Result<Region> {
    Region::from_str(name).context(error::ParseRegion { name })
}
