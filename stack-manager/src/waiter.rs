/*!
Blocks until a stack reaches the terminal status of the action applied to it, polling
`DescribeStacks` the way the AWS SDK stack waiters do.
*/
use crate::aws::CfnMediator;
use crate::error::{self, Result};
use crate::manager::StackAction;
use log::debug;
use snafu::ResultExt;
use std::time::Duration;
use tokio::time::sleep;

// matches the delay and attempt count of the SDK `stack_*_complete` waiters
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_MAX_ATTEMPTS: u32 = 120;

// reported in place of a status when the stack vanished
const STACK_NOT_FOUND: &str = "NOT_FOUND";

/// How often and how long to poll a stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitSettings {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Progress {
    Complete,
    InProgress,
    Failed,
}

/// Where a stack in `status` stands for `action`. `None` means CloudFormation no longer knows the
/// stack, which only a delete is waiting for.
pub(crate) fn progress(action: StackAction, status: Option<&str>) -> Progress {
    let status = match status {
        Some(status) => status,
        None if action == StackAction::Delete => return Progress::Complete,
        None => return Progress::Failed,
    };
    match action {
        StackAction::Create => match status {
            "CREATE_COMPLETE" => Progress::Complete,
            "CREATE_FAILED" => Progress::Failed,
            s if s.starts_with("ROLLBACK_") || s.starts_with("DELETE_") => Progress::Failed,
            _ => Progress::InProgress,
        },
        StackAction::Update => match status {
            "UPDATE_COMPLETE" => Progress::Complete,
            "UPDATE_FAILED" => Progress::Failed,
            s if s.starts_with("UPDATE_ROLLBACK_") => Progress::Failed,
            _ => Progress::InProgress,
        },
        StackAction::Delete => match status {
            "DELETE_COMPLETE" => Progress::Complete,
            "DELETE_FAILED" => Progress::Failed,
            _ => Progress::InProgress,
        },
    }
}

/// Polls `stack_id` in `region` until it settles. Fails with `StackFailed` when it settles in the
/// wrong status and `WaitTimeout` once `settings.max_attempts` polls are used up.
pub async fn wait_for_stack<C>(
    cfn: &C,
    action: StackAction,
    region: &str,
    stack_id: &str,
    settings: WaitSettings,
) -> Result<()>
where
    C: CfnMediator + ?Sized,
{
    // a stack is always checked at least once
    let max_attempts = settings.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        let summary = cfn
            .describe_stack(region, stack_id)
            .await
            .context(error::DescribeStack { region, stack_id })?;
        let status = summary.as_ref().map(|s| s.stack_status.as_str());
        debug!(
            "Stack {} in {} is {} (attempt {}/{})",
            stack_id,
            region,
            status.unwrap_or(STACK_NOT_FOUND),
            attempt,
            max_attempts
        );
        match progress(action, status) {
            Progress::Complete => return Ok(()),
            Progress::Failed => {
                return error::StackFailed {
                    action: action.to_string(),
                    region,
                    stack_id,
                    status: status.unwrap_or(STACK_NOT_FOUND),
                    reason: summary
                        .as_ref()
                        .and_then(|s| s.status_reason.clone())
                        .unwrap_or_else(|| "no reason given".to_string()),
                }
                .fail()
            }
            Progress::InProgress => {
                if attempt < max_attempts {
                    sleep(settings.poll_interval).await;
                }
            }
        }
    }
    error::WaitTimeout {
        region,
        stack_id,
        attempts: max_attempts,
    }
    .fail()
}
