use chrono::{DateTime, Local};
use colored::Colorize;
use log::{debug, info};
use session_creds::args::Args;
use session_creds::aws::{AwsIamMediator, AwsStsMediator};
use session_creds::credentials::{credentials_path, mask};
use session_creds::error::{self, Result};
use session_creds::{
    CredentialsFile, RefreshReport, Refresher, Settings, StoredCredentials, VerifyOutcome,
};
use simplelog::{Config as LogConfig, SimpleLogger};
use snafu::ResultExt;
use std::process;
use structopt::StructOpt;

// Returning a Result from main makes it print a Debug representation of the error, but with Snafu
// we have nice Display representations of the error, so we wrap "main" (run) and print any error.
// https://github.com/shepmaster/snafu/issues/110
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "Encountered unexpected error:".red().bold(), e);
        debug!("{:?}", e);
        eprintln!("{}", "Exiting".red());
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::from_args();
    SimpleLogger::init(args.level(), LogConfig::default()).context(error::Logger)?;
    info!(
        "session-creds started for profile {} -> {}",
        args.base_profile, args.target_profile
    );

    let path = credentials_path(args.credentials_file.as_deref())?;
    let mut file = CredentialsFile::load(&path)?;

    let sts = AwsStsMediator::new(&args.region, &args.base_profile, &path)
        .context(error::StsClient)?;
    let iam = AwsIamMediator::new(&args.region, &args.target_profile, &path)
        .context(error::IamClient)?;
    let refresher = Refresher::new(
        sts,
        iam,
        Settings {
            base_profile: args.base_profile.clone(),
            target_profile: args.target_profile.clone(),
            mfa_serial: args.mfa_serial.clone(),
            token_code: args.mfa_token.clone(),
            duration_seconds: args.duration_seconds,
        },
    );
    let report = refresher.run(&mut file).await?;
    print_report(&args, &report);
    Ok(())
}

fn print_report(args: &Args, report: &RefreshReport) {
    let secret = |value: &str| {
        if args.show_secrets {
            value.to_string()
        } else {
            mask(value)
        }
    };

    println!("\n{}", "Caller identity".bold());
    println!("  {:<18} {}", "user id", report.identity.user_id);
    println!("  {:<18} {}", "account", report.identity.account);
    println!("  {:<18} {}", "arn", report.identity.arn);

    if args.verbose {
        println!(
            "\n{} {}",
            "Previous values of".bold(),
            args.target_profile.bold()
        );
        match &report.previous {
            Some(StoredCredentials {
                access_key_id,
                secret_access_key,
                session_token,
            }) => {
                let show = |value: &Option<String>, hide: bool| match value {
                    Some(v) if hide => secret(v),
                    Some(v) => v.clone(),
                    None => "(unset)".dimmed().to_string(),
                };
                println!("  {:<18} {}", "access key id", show(access_key_id, false));
                println!("  {:<18} {}", "secret access key", show(secret_access_key, true));
                println!("  {:<18} {}", "session token", show(session_token, true));
            }
            None => println!("  {}", "(profile did not exist)".dimmed()),
        }
    }

    let credentials = &report.credentials;
    println!(
        "\n{} {}",
        "New credentials for".bold(),
        args.target_profile.bold()
    );
    println!("  {:<18} {}", "access key id", credentials.access_key_id);
    println!(
        "  {:<18} {}",
        "secret access key",
        secret(&credentials.secret_access_key)
    );
    println!(
        "  {:<18} {}",
        "session token",
        secret(&credentials.session_token)
    );
    let expiration = match DateTime::parse_from_rfc3339(&credentials.expiration) {
        Ok(at) => format!(
            "{} ({})",
            credentials.expiration,
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %Z")
        ),
        Err(_) => credentials.expiration.clone(),
    };
    println!("  {:<18} {}", "expires", expiration.green());

    println!("\n{}", "Verification".bold());
    match &report.verification {
        VerifyOutcome::Verified(user) => println!(
            "  {} {} ({})",
            "verified as".green(),
            user.user_name,
            user.arn
        ),
        VerifyOutcome::EntityNotFound(msg) => {
            println!("  {} {}", "user not found:".yellow(), msg)
        }
        VerifyOutcome::ServiceFailure(msg) => {
            println!("  {} {}", "IAM service failure:".yellow(), msg)
        }
    }
}
