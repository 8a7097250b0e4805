//! Per-site session cache
//!
//! One JSON file per site holding the cookies of the last fresh login,
//! stamped with a format version. A file that cannot be read back as the
//! current version is treated as corrupt and deleted by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use crate::browser::Cookie;
use crate::consts::APP_DIR;
use crate::error::SessionError;

const CACHE_VERSION: u32 = 1;
const FILE_SUFFIX: &str = ".session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    site: String,
    saved_at: DateTime<Utc>,
    cookies: Vec<Cookie>,
}

/// Session artifacts stored under one directory, keyed by site code
#[derive(Debug, Clone)]
pub(crate) struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub(crate) fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn path_for(&self, site: &str) -> PathBuf {
        self.dir.join(format!("{site}{FILE_SUFFIX}"))
    }

    /// Cookies saved for `site`, `None` when nothing is cached
    pub(crate) fn load(&self, site: &str) -> Result<Option<Vec<Cookie>>, SessionError> {
        let path = self.path_for(site);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SessionError::Io { path, source }),
        };
        let parsed: SessionFile = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            SessionError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;
        if parsed.version != CACHE_VERSION {
            return Err(SessionError::Corrupt {
                path,
                reason: format!("unsupported version {}", parsed.version),
            });
        }
        if parsed.site != site {
            return Err(SessionError::Corrupt {
                path,
                reason: format!("belongs to site {}", parsed.site),
            });
        }
        Ok(Some(parsed.cookies))
    }

    /// Replace the cached session for `site`
    pub(crate) fn save(&self, site: &str, cookies: &[Cookie]) -> Result<PathBuf, SessionError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SessionError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(site);
        let data = SessionFile {
            version: CACHE_VERSION,
            site: site.to_string(),
            saved_at: Utc::now(),
            cookies: cookies.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&data).map_err(|source| SessionError::Encode {
            site: site.to_string(),
            source,
        })?;
        std::fs::write(&path, json).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Delete the cached session for `site`. Returns whether a file existed.
    pub(crate) fn remove(&self, site: &str) -> Result<bool, SessionError> {
        let path = self.path_for(site);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SessionError::Io { path, source }),
        }
    }

    /// Delete every cached session. Returns how many files were removed.
    pub(crate) fn purge(&self) -> Result<usize, SessionError> {
        let pattern = glob::Pattern::escape(&self.dir.to_string_lossy());
        let pattern = format!("{pattern}/*{FILE_SUFFIX}");
        let mut removed = 0;
        for path in glob::glob(&pattern)?.flatten() {
            std::fs::remove_file(&path).map_err(|source| SessionError::Io {
                path: path.clone(),
                source,
            })?;
            removed += 1;
        }
        Ok(removed)
    }
}

/// Default session directory: `~/.cache/rws-storage/sessions`
pub(crate) fn default_session_dir() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".cache").join(APP_DIR).join("sessions"))
}
