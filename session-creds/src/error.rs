//! Contains the error type for this library.

#![allow(clippy::default_trait_access)]

use snafu::{Backtrace, Snafu};
use std::path::PathBuf;

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for this library.
#[derive(Debug, Snafu)]
#[snafu(visibility = "pub")]
#[non_exhaustive]
#[allow(missing_docs)]
pub enum Error {
    // The base profile could not be authenticated
    #[snafu(display("Failed to get caller identity of profile `{}`: {}", profile, source))]
    CallerIdentity {
        profile: String,
        source: crate::aws::error::Error,
    },

    // No credentials file was given and its default location could not be determined
    #[snafu(display("Failed to locate the shared credentials file: {}", source))]
    CredentialsLocation {
        source: rusoto_credential::CredentialsError,
    },

    // The application failed to create IAM client
    #[snafu(display("Failed to create IAM client: {}", source))]
    IamClient { source: crate::aws::error::Error },

    // The session duration is outside of what STS accepts
    #[snafu(display(
        "Session duration must be between {} and {} seconds, got {}",
        min,
        max,
        seconds
    ))]
    InvalidDuration { seconds: i64, min: i64, max: i64 },

    // The MFA token is not a six digit code
    #[snafu(display("MFA token must be six digits, got {} characters", length))]
    InvalidMfaToken { length: usize },

    // The application failed to setup Logger
    #[snafu(display("Logger setup error: {}", source))]
    Logger { source: log::SetLoggerError },


    // The credentials file is not valid INI
    #[snafu(display("Failed to parse credentials file `{}`: {}", path.display(), source))]
    ParseCredentials {
        path: PathBuf,
        source: ini::ParseError,
    },

    // The application failed to read the credentials file
    #[snafu(display("Failed to read credentials file `{}`: {}", path.display(), source))]
    ReadCredentials {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    // STS refused the MFA code
    #[snafu(display(
        "Failed to get session token with MFA device `{}`: {}",
        serial_number,
        source
    ))]
    SessionToken {
        serial_number: String,
        source: crate::aws::error::Error,
    },

    // The application failed to create STS client
    #[snafu(display("Failed to create STS client: {}", source))]
    StsClient { source: crate::aws::error::Error },

    // The new profile could not be checked
    #[snafu(display("Failed to verify profile `{}`: {}", profile, source))]
    VerifyProfile {
        profile: String,
        source: crate::aws::error::Error,
    },

    // The application failed to write the credentials file
    #[snafu(display("Failed to write credentials file `{}`: {}", path.display(), source))]
    WriteCredentials {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },
}
