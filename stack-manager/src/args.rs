use crate::manager::StackAction;
use simplelog::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;

/// Stack Manager
///
/// Creates, updates or deletes one CloudFormation stack in every region of a country. The stack
/// of each region is named `<stack_name>-<region>`.
///
/// Arguments can be specified by environment variable. Command-line arguments will override a value
/// that is given by environment variable.
///
#[derive(StructOpt, Debug)]
pub struct Args {
    /// What to do with the stacks: create, update or delete
    pub action: StackAction,
    /// The country whose regions the stacks live in, a key of the region file
    pub country: String,
    /// Base name of the stacks
    pub stack_name: String,
    /// YAML file mapping each country to its list of regions
    #[structopt(parse(from_os_str))]
    pub regions_file: PathBuf,
    /// Stack template for create and update; for delete, the JSON file of stack ids written by
    /// an earlier create
    #[structopt(parse(from_os_str))]
    pub stack_template: PathBuf,
    /// The AWS credentials profile used to call CloudFormation
    #[structopt(long, env = "AWS_PROFILE", default_value = "default")]
    pub profile: String,
    /// Credentials file to read the profile from, instead of `~/.aws/credentials`
    #[structopt(long, env = "AWS_SHARED_CREDENTIALS_FILE", parse(from_os_str))]
    pub credentials_file: Option<PathBuf>,
    /// JSON file the created or updated stack ids are merged into; defaults to
    /// `s3-buckets-<timestamp>.json` in the working directory
    #[structopt(long, parse(from_os_str))]
    pub output_file: Option<PathBuf>,
    /// Seconds between two status checks of a stack
    #[structopt(long, default_value = "30")]
    pub poll_interval_secs: u64,
    /// How many status checks to make before giving up on a stack
    #[structopt(long, default_value = "120", parse(try_from_str = parse_attempts))]
    pub max_attempts: u32,
    /// How much detail to log; from least to most: ERROR, WARN, INFO, DEBUG, TRACE
    #[structopt(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
    /// Log at DEBUG and show the loaded regions, template and stack ids
    #[structopt(short, long)]
    pub verbose: bool,
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

fn parse_attempts(value: &str) -> std::result::Result<u32, String> {
    match value.parse::<u32>() {
        Ok(0) => Err("at least one status check is needed".to_string()),
        Ok(attempts) => Ok(attempts),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn positional_arguments_in_order() {
        let args = Args::from_iter_safe(&[
            "stack-manager",
            "create",
            "usa",
            "mys3stack",
            "regions.yaml",
            "s3.yaml",
        ])
        .unwrap();
        assert_eq!(args.action, StackAction::Create);
        assert_eq!(args.country, "usa");
        assert_eq!(args.stack_name, "mys3stack");
        assert_eq!(args.regions_file, PathBuf::from("regions.yaml"));
        assert_eq!(args.stack_template, PathBuf::from("s3.yaml"));
        assert_eq!(args.poll_interval_secs, 30);
        assert_eq!(args.max_attempts, 120);
        assert!(!args.verbose);
    }

    #[test]
    fn verbose_raises_log_level() {
        let args = Args::from_iter_safe(&[
            "stack-manager",
            "delete",
            "eu",
            "mys3stack",
            "regions.yaml",
            "stacks.json",
            "--log-level",
            "warn",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(args.level(), LevelFilter::Debug);
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(Args::from_iter_safe(&[
            "stack-manager",
            "destroy",
            "usa",
            "mys3stack",
            "regions.yaml",
            "s3.yaml",
        ])
        .is_err());
    }

    #[test]
    fn zero_max_attempts_is_rejected() {
        let parse = |attempts: &str| {
            Args::from_iter_safe(&[
                "stack-manager",
                "create",
                "usa",
                "mys3stack",
                "regions.yaml",
                "s3.yaml",
                "--max-attempts",
                attempts,
            ])
        };
        assert!(parse("0").is_err());
        assert!(parse("-1").is_err());
        assert_eq!(parse("1").unwrap().max_attempts, 1);
    }
}
