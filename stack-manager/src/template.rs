use crate::error::{self, Result};
use snafu::{ensure, ResultExt};
use std::fs;
use std::path::Path;

/// Reads a stack template. The body is handed to CloudFormation as is, for every region.
pub fn load_template(path: &Path) -> Result<String> {
    let body = fs::read_to_string(path).context(error::ReadTemplate { path })?;
    ensure!(!body.trim().is_empty(), error::EmptyTemplate { path });
    Ok(body)
}
