/*!
Refreshes MFA-backed temporary AWS credentials.

The base profile's long-term keys and a code from the MFA device are exchanged with STS for a
session, which is written to a target profile of the shared credentials file and then checked with
IAM. STS and IAM sit behind the [`aws::StsMediator`] and [`aws::IamMediator`] traits so the flow in
[`refresher`] can be tested without AWS.
!*/

#![deny(rust_2018_idioms)]

pub mod args;
pub mod aws;
pub mod credentials;
pub mod error;
pub mod refresher;

pub use crate::credentials::{CredentialsFile, StoredCredentials};
pub use crate::error::{Error, Result};
pub use crate::refresher::{RefreshReport, Refresher, Settings, VerifyOutcome};
