use crate::aws::CfnMediator;
use crate::error::{self, Result};
use crate::regions::RegionMap;
use crate::results::{self, StackResults};
use crate::template::load_template;
use crate::waiter::{self, WaitSettings};
use log::{debug, info};
use snafu::{OptionExt, ResultExt};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What to do with the stack of every region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackAction {
    Create,
    Update,
    Delete,
}

impl FromStr for StackAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "create" => Ok(StackAction::Create),
            "update" => Ok(StackAction::Update),
            "delete" => Ok(StackAction::Delete),
            other => Err(format!(
                "unknown stack action `{}`, expected one of create, update, delete",
                other
            )),
        }
    }
}

impl Display for StackAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StackAction::Create => "create",
            StackAction::Update => "update",
            StackAction::Delete => "delete",
        })
    }
}

/// The payload an action works from: a template for create and update, the stack ids recorded by
/// an earlier run for delete.
#[derive(Debug, Clone, PartialEq)]
pub enum StackInput {
    Template(String),
    StackIds { path: PathBuf, stack_ids: StackResults },
}

impl StackInput {
    /// Loads the file given for `action`.
    pub fn load(action: StackAction, path: &Path) -> Result<Self> {
        match action {
            StackAction::Delete => Ok(StackInput::StackIds {
                path: path.to_path_buf(),
                stack_ids: StackResults::from_path(path)?,
            }),
            StackAction::Create | StackAction::Update => {
                Ok(StackInput::Template(load_template(path)?))
            }
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            StackInput::Template(_) => "a stack template",
            StackInput::StackIds { .. } => "a stack id file",
        }
    }
}

/// What happened to the stack of one region.
#[derive(Debug, Clone, PartialEq)]
pub enum StackChange {
    Created(String),
    Updated(String),
    /// CloudFormation had no updates to perform
    Unchanged,
    Deleted(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionOutcome {
    pub region: String,
    pub change: StackChange,
}

/// Run-wide settings of the stack manager.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base name; the stack of each region is named `{stack_name}-{region}`
    pub stack_name: String,
    /// JSON file the stack id of every created or updated stack is merged into
    pub output_file: PathBuf,
    pub wait: WaitSettings,
}

/// Applies one action to one stack per region, strictly in the order the regions are given. A
/// CloudFormation error ends the whole run, except the "No updates are to be performed." answer to
/// an update which is reported and skipped.
pub struct StackManager<C: CfnMediator> {
    cfn: C,
    settings: Settings,
}

impl<C: CfnMediator> StackManager<C> {
    pub fn new(cfn: C, settings: Settings) -> Self {
        Self { cfn, settings }
    }

    pub fn stack_name_for(&self, region: &str) -> String {
        format!("{}-{}", self.settings.stack_name, region)
    }

    /// Dispatches `action` with its loaded input.
    pub async fn run(
        &self,
        action: StackAction,
        regions: &[String],
        input: &StackInput,
    ) -> Result<Vec<RegionOutcome>> {
        match (action, input) {
            (StackAction::Create, StackInput::Template(template)) => {
                self.create(regions, template).await
            }
            (StackAction::Update, StackInput::Template(template)) => {
                self.update(regions, template).await
            }
            (StackAction::Delete, StackInput::StackIds { path, stack_ids }) => {
                self.delete(regions, stack_ids, path).await
            }
            _ => error::InputMismatch {
                action: action.to_string(),
                input: input.describe(),
            }
            .fail(),
        }
    }

    pub async fn create(&self, regions: &[String], template: &str) -> Result<Vec<RegionOutcome>> {
        self.upsert(StackAction::Create, regions, template).await
    }

    pub async fn update(&self, regions: &[String], template: &str) -> Result<Vec<RegionOutcome>> {
        self.upsert(StackAction::Update, regions, template).await
    }

    async fn upsert(
        &self,
        action: StackAction,
        regions: &[String],
        template: &str,
    ) -> Result<Vec<RegionOutcome>> {
        let mut outcomes = Vec::with_capacity(regions.len());
        for region in regions {
            let stack_name = self.stack_name_for(region);
            info!("Attempting to {} stack {} in region {}", action, stack_name, region);
            let submitted = match action {
                StackAction::Update => {
                    self.cfn.update_stack(region, &stack_name, template).await
                }
                _ => self.cfn.create_stack(region, &stack_name, template).await,
            };
            let stack_id = match submitted {
                Ok(stack_id) => stack_id,
                Err(e) if action == StackAction::Update && e.is_no_updates() => {
                    info!("No changes made to stack {} in region {}", stack_name, region);
                    outcomes.push(RegionOutcome {
                        region: region.clone(),
                        change: StackChange::Unchanged,
                    });
                    continue;
                }
                Err(e) => {
                    return Err(e).context(error::StackAction {
                        action: action.to_string(),
                        stack: stack_name,
                        region: region.as_str(),
                    })
                }
            };
            debug!("Submitted {} of {}, waiting on {}", action, stack_name, stack_id);
            waiter::wait_for_stack(&self.cfn, action, region, &stack_id, self.settings.wait)
                .await?;

            let recorded = results::record_stack(&self.settings.output_file, region, &stack_id)?;
            debug!(
                "{} now records {} stacks",
                self.settings.output_file.display(),
                recorded.len()
            );
            info!("{}: {}d stack {}", region, action, stack_id);
            outcomes.push(RegionOutcome {
                region: region.clone(),
                change: match action {
                    StackAction::Update => StackChange::Updated(stack_id),
                    _ => StackChange::Created(stack_id),
                },
            });
        }
        Ok(outcomes)
    }

    /// Deletes the stack recorded in `stack_ids` for each region. Every region must have a
    /// recorded id; that is checked before the first deletion is submitted.
    pub async fn delete(
        &self,
        regions: &[String],
        stack_ids: &StackResults,
        stack_ids_path: &Path,
    ) -> Result<Vec<RegionOutcome>> {
        let mut targets = Vec::with_capacity(regions.len());
        for region in regions {
            let stack_id = stack_ids.get(region).context(error::MissingStackId {
                region: region.as_str(),
                path: stack_ids_path,
            })?;
            targets.push((region, stack_id));
        }

        let mut outcomes = Vec::with_capacity(targets.len());
        for (region, stack_id) in targets {
            info!("Attempting to delete stack {} in region {}", stack_id, region);
            self.cfn
                .delete_stack(region, stack_id)
                .await
                .context(error::StackAction {
                    action: StackAction::Delete.to_string(),
                    stack: stack_id,
                    region: region.as_str(),
                })?;
            waiter::wait_for_stack(
                &self.cfn,
                StackAction::Delete,
                region,
                stack_id,
                self.settings.wait,
            )
            .await?;
            info!("{}: deleted stack {}", region, stack_id);
            outcomes.push(RegionOutcome {
                region: region.clone(),
                change: StackChange::Deleted(stack_id.to_string()),
            });
        }
        Ok(outcomes)
    }
}

/// One invocation: which action to apply to which country's regions, and the files it works from.
#[derive(Debug, Clone)]
pub struct Job {
    pub action: StackAction,
    pub country: String,
    pub regions_file: PathBuf,
    /// Template for create and update, stack id file for delete
    pub input_file: PathBuf,
    pub settings: Settings,
}

impl Job {
    /// Loads and checks every input, then builds the mediator for the country's regions with
    /// `build_cfn` and applies the action. `build_cfn` is not called when an input is invalid.
    pub async fn run<C, F>(&self, build_cfn: F) -> Result<Vec<RegionOutcome>>
    where
        C: CfnMediator,
        F: FnOnce(&[String]) -> Result<C>,
    {
        let region_map = RegionMap::from_path(&self.regions_file)?;
        let regions = region_map.regions_for(&self.country)?;
        debug!("Regions of {}: {:?}", self.country, regions);
        let input = StackInput::load(self.action, &self.input_file)?;
        match &input {
            StackInput::Template(template) => debug!("Stack template:\n{}", template),
            StackInput::StackIds { stack_ids, .. } => debug!("Stack ids: {:?}", stack_ids),
        }
        info!(
            "Stack ids will be recorded in {}",
            self.settings.output_file.display()
        );

        let cfn = build_cfn(regions)?;
        StackManager::new(cfn, self.settings.clone())
            .run(self.action, regions, &input)
            .await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn actions_parse_from_lowercase_names() {
        assert_eq!("create".parse::<StackAction>(), Ok(StackAction::Create));
        assert_eq!("update".parse::<StackAction>(), Ok(StackAction::Update));
        assert_eq!("delete".parse::<StackAction>(), Ok(StackAction::Delete));
        assert!("Create".parse::<StackAction>().is_err());
        assert!("destroy".parse::<StackAction>().is_err());
    }

    #[test]
    fn actions_display_as_parsed() {
        for action in &[StackAction::Create, StackAction::Update, StackAction::Delete] {
            assert_eq!(action.to_string().parse::<StackAction>(), Ok(*action));
        }
    }
}
