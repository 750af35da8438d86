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
    // The application failed to create the CloudFormation clients
    #[snafu(display("Failed to create CloudFormation client: {}", source))]
    CfnClient { source: crate::aws::error::Error },

    // The requested country is not a key of the region map
    #[snafu(display(
        "Country `{}` not found in region map, expected one of: {}",
        country,
        available
    ))]
    CountryNotFound { country: String, available: String },

    // The application failed to describe a stack while waiting on it
    #[snafu(display("Failed to describe stack {} in region {}: {}", stack_id, region, source))]
    DescribeStack {
        region: String,
        stack_id: String,
        source: crate::aws::error::Error,
    },

    // The template file holds nothing to submit
    #[snafu(display("Stack template `{}` is empty", path.display()))]
    EmptyTemplate { path: PathBuf },

    // The input given does not match the requested action
    #[snafu(display("Action `{}` cannot be applied with {}", action, input))]
    InputMismatch { action: String, input: &'static str },

    // The application failed to setup Logger
    #[snafu(display("Logger setup error: {}", source))]
    Logger { source: log::SetLoggerError },

    // A region has no recorded stack id to delete
    #[snafu(display("No stack id recorded for region {} in `{}`", region, path.display()))]
    MissingStackId { region: String, path: PathBuf },

    // The country maps to an empty region list
    #[snafu(display("Country `{}` has no regions in the region map", country))]
    NoRegions { country: String },

    // The region file is not a YAML mapping of country to regions
    #[snafu(display("Failed to parse region file `{}`: {}", path.display(), source))]
    ParseRegions {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    // A stack id file is not a JSON object of region to stack id
    #[snafu(display("Failed to parse stack file `{}`: {}", path.display(), source))]
    ParseStackFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    // The application failed to read the region file
    #[snafu(display("Failed to read region file `{}`: {}", path.display(), source))]
    ReadRegions {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    // The application failed to read a stack id file
    #[snafu(display("Failed to read stack file `{}`: {}", path.display(), source))]
    ReadStackFile {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    // The application failed to read the stack template
    #[snafu(display("Failed to read stack template `{}`: {}", path.display(), source))]
    ReadTemplate {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    // The application failed to serialize stack ids
    #[snafu(display("Failed to serialize stack ids: {}", source))]
    SerializeStackFile { source: serde_json::Error },

    // CloudFormation rejected a create, update or delete request
    #[snafu(display(
        "Failed to {} stack `{}` in region {}: {}",
        action,
        stack,
        region,
        source
    ))]
    StackAction {
        action: String,
        stack: String,
        region: String,
        source: crate::aws::error::Error,
    },

    // The stack settled in a status other than the one we waited for
    #[snafu(display(
        "Stack {} in region {} ended in status {} while waiting to {}: {}",
        stack_id,
        region,
        status,
        action,
        reason
    ))]
    StackFailed {
        action: String,
        region: String,
        stack_id: String,
        status: String,
        reason: String,
    },

    // The stack did not settle within the allowed number of polls
    #[snafu(display(
        "Timed out waiting for stack {} in region {} after {} attempts",
        stack_id,
        region,
        attempts
    ))]
    WaitTimeout {
        region: String,
        stack_id: String,
        attempts: u32,
    },

    // The application failed to write a stack id file
    #[snafu(display("Failed to write stack file `{}`: {}", path.display(), source))]
    WriteStackFile {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },
}
