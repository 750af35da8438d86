use simplelog::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;

/// Session Credentials
///
/// Exchanges a one-time code from an MFA device for temporary AWS credentials and stores them
/// under a profile of the shared credentials file, so that tools using that profile act with MFA.
///
/// Arguments can be specified by environment variable. Command-line arguments will override a value
/// that is given by environment variable.
///
#[derive(StructOpt, Debug)]
pub struct Args {
    /// The six digit code currently shown by the MFA device
    pub mfa_token: String,
    /// Profile holding the long-term credentials the code is exchanged under
    #[structopt(long, env = "AWS_BASE_PROFILE", default_value = "default")]
    pub base_profile: String,
    /// Profile the temporary credentials are written to; created if missing
    #[structopt(long, env = "AWS_MFA_PROFILE", default_value = "mfa")]
    pub target_profile: String,
    /// Credentials file to read and rewrite, instead of `~/.aws/credentials`
    #[structopt(long, env = "AWS_SHARED_CREDENTIALS_FILE", parse(from_os_str))]
    pub credentials_file: Option<PathBuf>,
    /// Serial number or ARN of the MFA device
    #[structopt(long, env = "AWS_MFA_SERIAL")]
    pub mfa_serial: String,
    /// How long the temporary credentials stay valid, between 900 and 129600 seconds
    #[structopt(long, default_value = "43200")]
    pub duration_seconds: i64,
    /// The region the STS and IAM clients call
    #[structopt(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,
    /// How much detail to log; from least to most: ERROR, WARN, INFO, DEBUG, TRACE
    #[structopt(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
    /// Show the values the target profile held before it was overwritten
    #[structopt(short, long)]
    pub verbose: bool,
    /// Print secret keys and session tokens in full instead of masked
    #[structopt(long)]
    pub show_secrets: bool,
}

impl Args {
    /// The effective log level, `--verbose` wins over `--log-level`.
    pub fn level(&self) -> LevelFilter {
        if self.verbose && self.log_level < LevelFilter::Debug {
            LevelFilter::Debug
        } else {
            self.log_level
        }
    }
}
