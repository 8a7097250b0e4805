//! Station login credentials
//!
//! One operator account name shared by every console, and a password per
//! site code.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::AppError;

pub(crate) const CREDENTIALS_TEMPLATE: &str = r#"{
    "username": "your_username",
    "passwords": {
        "SITE1": "password1",
        "SITE2": "password2"
    }
}"#;

#[derive(Deserialize)]
pub(crate) struct Credentials {
    pub(crate) username: String,
    passwords: HashMap<String, String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sites: Vec<_> = self.passwords.keys().collect();
        sites.sort();
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("sites", &sites)
            .finish()
    }
}

impl Credentials {
    pub(crate) fn load(path: &Path) -> Result<Self, AppError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::CredentialsNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(AppError::CredentialsRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_json(path, &content)
    }

    pub(crate) fn from_json(path: &Path, content: &str) -> Result<Self, AppError> {
        serde_json::from_str(content).map_err(|source| AppError::CredentialsInvalid {
            path: path.to_path_buf(),
            source,
        })
    }

    pub(crate) fn secret(&self, site: &str) -> Option<&str> {
        self.passwords.get(site).map(String::as_str)
    }

    pub(crate) fn site_count(&self) -> usize {
        self.passwords.len()
    }
}

#[cfg(test)]
impl Credentials {
    pub(crate) fn for_tests(username: &str, passwords: &[(&str, &str)]) -> Self {
        Self {
            username: username.to_string(),
            passwords: passwords
                .iter()
                .map(|(site, secret)| (site.to_string(), secret.to_string()))
                .collect(),
        }
    }
}
