/*!
`aws` module wraps the CloudFormation api calls the stack manager makes and provides well
structured output containing only the required fields.
*/
pub mod api;
pub mod error;

pub use api::{AwsCfnMediator, CfnMediator, StackSummary};
pub use error::{Error, ProviderFailure};
