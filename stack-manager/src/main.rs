use chrono::Local;
use colored::Colorize;
use log::{debug, info};
use simplelog::{Config as LogConfig, SimpleLogger};
use snafu::ResultExt;
use stack_manager::args::Args;
use stack_manager::aws::AwsCfnMediator;
use stack_manager::error::{self, Result};
use stack_manager::{results, Job, RegionOutcome, Settings, StackChange, WaitSettings};
use std::process;
use std::time::Duration;
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
    info!("stack-manager started with {:?}", args);

    let output_file = args
        .output_file
        .clone()
        .unwrap_or_else(|| results::default_output_file(Local::now()));
    let job = Job {
        action: args.action,
        country: args.country.clone(),
        regions_file: args.regions_file.clone(),
        input_file: args.stack_template.clone(),
        settings: Settings {
            stack_name: args.stack_name.clone(),
            output_file,
            wait: WaitSettings {
                poll_interval: Duration::from_secs(args.poll_interval_secs),
                max_attempts: args.max_attempts,
            },
        },
    };
    let outcomes = job
        .run(|regions: &[String]| {
            AwsCfnMediator::new(regions, &args.profile, args.credentials_file.as_deref())
                .context(error::CfnClient)
        })
        .await?;
    print_summary(&outcomes);
    Ok(())
}

fn print_summary(outcomes: &[RegionOutcome]) {
    println!("\n{}", "Summary".bold());
    for outcome in outcomes {
        let (label, stack_id) = match &outcome.change {
            StackChange::Created(id) => ("created".green(), id.as_str()),
            StackChange::Updated(id) => ("updated".green(), id.as_str()),
            StackChange::Unchanged => ("unchanged".yellow(), ""),
            StackChange::Deleted(id) => ("deleted".green(), id.as_str()),
        };
        println!("  {:<16} {:<10} {}", outcome.region, label, stack_id.dimmed());
    }
}
