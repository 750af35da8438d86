/*!
The region map names, per country, the regions a stack is deployed to. It is loaded from a YAML
mapping such as:

```yaml
usa:
  - us-east-1
  - us-west-2
eu:
  - eu-west-1
```
*/
use crate::error::{self, Result};
use serde::Deserialize;
use snafu::{ensure, OptionExt, ResultExt};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Country code to ordered list of region names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RegionMap(BTreeMap<String, Vec<String>>);

impl RegionMap {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).context(error::ReadRegions { path })?;
        contents
            .parse()
            .context(error::ParseRegions { path })
    }

    /// The regions of `country` in the order they were listed.
    pub fn regions_for(&self, country: &str) -> Result<&[String]> {
        let regions = self
            .0
            .get(country)
            .with_context(|| error::CountryNotFound {
                country,
                available: self.countries().collect::<Vec<_>>().join(", "),
            })?;
        ensure!(!regions.is_empty(), error::NoRegions { country });
        Ok(regions)
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromStr for RegionMap {
    type Err = serde_yaml::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        serde_yaml::from_str(s)
    }
}
