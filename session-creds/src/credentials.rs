/*!
Reads and rewrites the shared AWS credentials file, an INI file with one section per profile:

```ini
[mfa]
aws_access_key_id=ASIA...
aws_secret_access_key=...
aws_session_token=...
```

Only the three credential keys of the target profile are replaced; every other section and key is
written back as it was read. The new file is written next to the old one and renamed over it.
*/
use crate::aws::SessionCredentials;
use crate::error::{self, Result};
use ini::Ini;
use rusoto_credential::ProfileProvider;
use snafu::ResultExt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const ACCESS_KEY_ID: &str = "aws_access_key_id";
const SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
const SESSION_TOKEN: &str = "aws_session_token";

/// The credentials file to work on: `explicit` when given, otherwise the file the AWS tools read,
/// `$AWS_SHARED_CREDENTIALS_FILE` or `~/.aws/credentials`.
pub fn credentials_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => {
            let provider = ProfileProvider::new().context(error::CredentialsLocation)?;
            Ok(provider.file_path().to_path_buf())
        }
    }
}

/// The credential keys a profile held before it was overwritten. Keys may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredCredentials {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

pub struct CredentialsFile {
    path: PathBuf,
    ini: Ini,
}

impl CredentialsFile {
    /// Reads the file at `path`; a missing file loads as empty and is created by `save`.
    pub fn load(path: &Path) -> Result<Self> {
        let ini = match fs::read_to_string(path) {
            Ok(contents) => {
                Ini::load_from_str(&contents).context(error::ParseCredentials { path })?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ini::new(),
            Err(e) => return Err(e).context(error::ReadCredentials { path }),
        };
        Ok(Self {
            path: path.to_path_buf(),
            ini,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The credential keys of `profile`, `None` when the file has no such section.
    pub fn profile(&self, profile: &str) -> Option<StoredCredentials> {
        let section = self.ini.section(Some(profile))?;
        let get = |key: &str| section.get(key).map(str::to_string);
        Some(StoredCredentials {
            access_key_id: get(ACCESS_KEY_ID),
            secret_access_key: get(SECRET_ACCESS_KEY),
            session_token: get(SESSION_TOKEN),
        })
    }

    /// Replaces the three credential keys of `profile`, adding the section when needed.
    pub fn set_profile(&mut self, profile: &str, credentials: &SessionCredentials) {
        self.ini
            .with_section(Some(profile))
            .set(ACCESS_KEY_ID, credentials.access_key_id.as_str())
            .set(SECRET_ACCESS_KEY, credentials.secret_access_key.as_str())
            .set(SESSION_TOKEN, credentials.session_token.as_str());
    }

    /// Writes the file back in one step.
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_path();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).context(error::WriteCredentials { path })?;
        let mut file = NamedTempFile::new_in(dir).context(error::WriteCredentials { path })?;
        self.ini
            .write_to(&mut file)
            .context(error::WriteCredentials { path })?;
        file.persist(path)
            .map_err(|e| e.error)
            .context(error::WriteCredentials { path })?;
        Ok(())
    }
}

/// Shortens a secret for display, keeping enough to tell two values apart.
pub fn mask(secret: &str) -> String {
    let shown: String = secret.chars().take(4).collect();
    if shown.len() == secret.len() {
        "****".to_string()
    } else {
        format!("{}****", shown)
    }
}
