/*!
Creates, updates and deletes one CloudFormation stack per region for all the regions of a country.

The library holds all of the logic so it can be driven from the `tests` folder against a mocked
[`aws::CfnMediator`]; `main.rs` only wires up arguments, logging and the rusoto clients.
!*/

#![deny(rust_2018_idioms)]

pub mod args;
pub mod aws;
pub mod error;
pub mod manager;
pub mod regions;
pub mod results;
pub mod template;
pub mod waiter;

pub use crate::error::{Error, Result};
pub use crate::manager::{
    Job, RegionOutcome, Settings, StackAction, StackChange, StackInput, StackManager,
};
pub use crate::regions::RegionMap;
pub use crate::results::StackResults;
pub use crate::waiter::WaitSettings;
