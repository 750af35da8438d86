//! Contains the error type for the STS and IAM layer.

#![allow(clippy::default_trait_access)]

use snafu::Snafu;

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for the STS and IAM layer.
#[derive(Debug, Snafu)]
#[snafu(visibility = "pub(crate)")]
#[allow(missing_docs)]
pub enum Error {
    // The caller identity could not be fetched
    #[snafu(display("Failed to get caller identity: {}", source))]
    GetCallerIdentity {
        source: rusoto_core::RusotoError<rusoto_sts::GetCallerIdentityError>,
    },

    // STS refused to issue a session token
    #[snafu(display("Failed to get session token: {}", source))]
    GetSessionToken {
        source: rusoto_core::RusotoError<rusoto_sts::GetSessionTokenError>,
    },

    // IAM refused to describe the calling user
    #[snafu(display("Failed to get user: {}", source))]
    GetUser {
        source: rusoto_core::RusotoError<rusoto_iam::GetUserError>,
    },

    // The application failed to create HttpClient
    #[snafu(display("Failed to create HTTP client: {}", source))]
    HttpClient {
        source: rusoto_core::request::TlsError,
    },

    // The application failed to parse region
    #[snafu(display("Failed to parse region `{}` : {}", name, source))]
    ParseRegion {
        name: String,
        source: rusoto_signature::region::ParseRegionError,
    },

    // A field we rely on was absent from an STS response
    #[snafu(display("Missing field in `{}` response: {}", api, field))]
    StsMissingField {
        api: &'static str,
        field: &'static str,
    },
}
