use crate::aws::error::{self, ProviderFailure, Result};
use async_trait::async_trait;
use log::debug;
use rusoto_cloudformation::{
    CloudFormation, CloudFormationClient, CreateStackInput, DeleteStackInput,
    DescribeStacksInput, UpdateStackInput,
};
use rusoto_core::Region;
use rusoto_credential::ProfileProvider;
use snafu::{OptionExt, ResultExt};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

// Stack creation is abandoned by CloudFormation after this many minutes
const CREATE_STACK_TIMEOUT_MINUTES: i64 = 3;
const CAPABILITY_NAMED_IAM: &str = "CAPABILITY_NAMED_IAM";

/// The fields of a described stack that the waiter looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct StackSummary {
    pub stack_id: String,
    pub stack_status: String,
    pub status_reason: Option<String>,
}

/// Introducing a trait abstraction over the CloudFormation API allows us to mock the API and write
/// tests without going to the extremely low level of `rusoto_mock`. Every call names the region it
/// targets since the stack manager works through one stack per region.
#[async_trait]
pub trait CfnMediator {
    /// Creates a stack from the template body and returns its stack id
    async fn create_stack(&self, region: &str, stack_name: &str, template_body: &str)
        -> Result<String>;

    /// Updates an existing stack with the template body and returns its stack id
    async fn update_stack(&self, region: &str, stack_name: &str, template_body: &str)
        -> Result<String>;

    /// Requests deletion of a stack
    async fn delete_stack(&self, region: &str, stack_id: &str) -> Result<()>;

    /// Describes a single stack, `None` when CloudFormation does not know it
    async fn describe_stack(&self, region: &str, stack_id: &str) -> Result<Option<StackSummary>>;
}

/// Builds the credentials provider for a named profile, optionally read from a specific
/// credentials file instead of the default `~/.aws/credentials`.
fn profile_provider(profile: &str, credentials_file: Option<&Path>) -> Result<ProfileProvider> {
    match credentials_file {
        Some(path) => Ok(ProfileProvider::with_configuration(path, profile)),
        None => {
            let mut provider =
                ProfileProvider::new().context(error::ProfileProvider { profile })?;
            provider.set_profile(profile);
            Ok(provider)
        }
    }
}

/// Create a rusoto CloudFormation client for the given region
fn build_client(region: &Region, provider: ProfileProvider) -> Result<CloudFormationClient> {
    Ok(CloudFormationClient::new_with(
        rusoto_core::HttpClient::new().context(error::HttpClient)?,
        provider,
        region.clone(),
    ))
}

/// `CfnMediator` backed by one rusoto client per region.
pub struct AwsCfnMediator {
    clients: HashMap<String, CloudFormationClient>,
}

impl AwsCfnMediator {
    /// Builds a client for each region up front so a bad region name fails the run before any
    /// stack is touched.
    pub fn new(regions: &[String], profile: &str, credentials_file: Option<&Path>) -> Result<Self> {
        let provider = profile_provider(profile, credentials_file)?;
        let mut clients = HashMap::new();
        for name in regions {
            let region = Region::from_str(name).context(error::ParseRegion { name })?;
            clients.insert(name.clone(), build_client(&region, provider.clone())?);
        }
        Ok(Self { clients })
    }

    fn client(&self, region: &str) -> Result<&CloudFormationClient> {
        self.clients
            .get(region)
            .context(error::UnknownRegion { region })
    }
}

#[async_trait]
impl CfnMediator for AwsCfnMediator {
    async fn create_stack(
        &self,
        region: &str,
        stack_name: &str,
        template_body: &str,
    ) -> Result<String> {
        let resp = self
            .client(region)?
            .create_stack(CreateStackInput {
                stack_name: stack_name.to_string(),
                template_body: Some(template_body.to_string()),
                capabilities: Some(vec![CAPABILITY_NAMED_IAM.to_string()]),
                // keep failed resources around for inspection instead of rolling back
                disable_rollback: Some(true),
                timeout_in_minutes: Some(CREATE_STACK_TIMEOUT_MINUTES),
                ..CreateStackInput::default()
            })
            .await
            .map_err(ProviderFailure::from_rusoto)
            .context(error::Provider {
                api: "create_stack",
                region,
            })?;
        resp.stack_id.context(error::CfnMissingField {
            api: "create_stack",
            field: "stack_id",
        })
    }

    async fn update_stack(
        &self,
        region: &str,
        stack_name: &str,
        template_body: &str,
    ) -> Result<String> {
        let resp = self
            .client(region)?
            .update_stack(UpdateStackInput {
                stack_name: stack_name.to_string(),
                template_body: Some(template_body.to_string()),
                capabilities: Some(vec![CAPABILITY_NAMED_IAM.to_string()]),
                ..UpdateStackInput::default()
            })
            .await
            .map_err(ProviderFailure::from_rusoto)
            .context(error::Provider {
                api: "update_stack",
                region,
            })?;
        resp.stack_id.context(error::CfnMissingField {
            api: "update_stack",
            field: "stack_id",
        })
    }

    async fn delete_stack(&self, region: &str, stack_id: &str) -> Result<()> {
        self.client(region)?
            .delete_stack(DeleteStackInput {
                stack_name: stack_id.to_string(),
                ..DeleteStackInput::default()
            })
            .await
            .map_err(ProviderFailure::from_rusoto)
            .context(error::Provider {
                api: "delete_stack",
                region,
            })?;
        Ok(())
    }

    async fn describe_stack(&self, region: &str, stack_id: &str) -> Result<Option<StackSummary>> {
        let described = self
            .client(region)?
            .describe_stacks(DescribeStacksInput {
                stack_name: Some(stack_id.to_string()),
                ..DescribeStacksInput::default()
            })
            .await
            .map_err(ProviderFailure::from_rusoto);
        let resp = match described {
            Ok(resp) => resp,
            Err(failure) if failure.is_stack_not_found() => {
                debug!("Stack {} in {} does not exist", stack_id, region);
                return Ok(None);
            }
            Err(failure) => {
                return Err(failure).context(error::Provider {
                    api: "describe_stacks",
                    region,
                })
            }
        };
        let stack = resp
            .stacks
            .context(error::CfnMissingField {
                api: "describe_stacks",
                field: "stacks",
            })?
            .into_iter()
            .next();
        Ok(match stack {
            Some(stack) => Some(StackSummary {
                stack_id: stack.stack_id.unwrap_or_else(|| stack_id.to_string()),
                stack_status: stack.stack_status,
                status_reason: stack.stack_status_reason,
            }),
            None => None,
        })
    }
}
