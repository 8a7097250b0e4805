use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::consts::{
    APP_DIR, DEFAULT_CREDENTIALS_FILE, DEFAULT_DETAILS_LOAD_SECS, DEFAULT_LOGIN_FORM_WAIT_SECS,
    DEFAULT_LOGIN_REDIRECT_WAIT_SECS, DEFAULT_OUTPUT_DIR, DEFAULT_PAGE_LOAD_SECS,
    DEFAULT_REPORT_FILE_PREFIX, DEFAULT_REPORT_TITLE, DEFAULT_URL_PREFIX, DEFAULT_URL_SUFFIX,
    DETAILS_PATH,
};
use crate::core::{Site, default_session_dir, default_sites};
use crate::error::AppError;
use crate::output::ReportZone;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TimeoutsConfig {
    #[serde(default)]
    pub(crate) page_load_secs: Option<u64>,
    #[serde(default)]
    pub(crate) details_load_secs: Option<u64>,
    #[serde(default)]
    pub(crate) login_form_wait_secs: Option<u64>,
    #[serde(default)]
    pub(crate) login_redirect_wait_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportConfig {
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) file_prefix: Option<String>,
}

/// Optional TOML config file
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) debug: bool,
    #[serde(default)]
    pub(crate) no_color: bool,
    #[serde(default)]
    pub(crate) credentials: Option<PathBuf>,
    #[serde(default)]
    pub(crate) output_dir: Option<PathBuf>,
    #[serde(default)]
    pub(crate) session_dir: Option<PathBuf>,
    #[serde(default)]
    pub(crate) url_prefix: Option<String>,
    #[serde(default)]
    pub(crate) url_suffix: Option<String>,
    #[serde(default)]
    pub(crate) timezone: Option<String>,
    #[serde(default)]
    pub(crate) timeouts: TimeoutsConfig,
    #[serde(default)]
    pub(crate) report: ReportConfig,
    #[serde(default)]
    pub(crate) sites: Option<Vec<Site>>,
}

impl Config {
    /// Load the first config found in the standard locations. A file that
    /// fails to parse is skipped with a warning.
    pub(crate) fn load() -> Self {
        for path in Self::get_config_paths() {
            if path.exists()
                && let Ok(content) = fs::read_to_string(&path)
            {
                match Self::load_from_str(&path, &content) {
                    Ok(config) => {
                        eprintln!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => eprintln!("Warning: {e}"),
                }
            }
        }

        Self::default()
    }

    /// Load an explicitly requested config file; any failure is fatal
    pub(crate) fn load_from(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_str(path, &content)
    }

    pub(crate) fn load_from_str(path: &Path, content: &str) -> Result<Self, AppError> {
        toml::from_str(content).map_err(|source| AppError::ConfigInvalid {
            path: path.to_path_buf(),
            source,
        })
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/rws-storage/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join(APP_DIR).join("config.toml"));
        }

        // 2. Platform config dir (macOS: ~/Library/Application Support)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join(APP_DIR).join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.rws-storage.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{APP_DIR}.toml")));
        }

        paths
    }
}

/// Bounds for every blocking browser operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Timeouts {
    pub(crate) page_load: Duration,
    /// Shorter than `page_load`
    pub(crate) details_load: Duration,
    pub(crate) login_form_wait: Duration,
    pub(crate) login_redirect_wait: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            page_load: Duration::from_secs(DEFAULT_PAGE_LOAD_SECS),
            details_load: Duration::from_secs(DEFAULT_DETAILS_LOAD_SECS),
            login_form_wait: Duration::from_secs(DEFAULT_LOGIN_FORM_WAIT_SECS),
            login_redirect_wait: Duration::from_secs(DEFAULT_LOGIN_REDIRECT_WAIT_SECS),
        }
    }
}

impl Timeouts {
    fn from_config(config: &TimeoutsConfig) -> Self {
        let defaults = Self::default();
        let secs = |value: Option<u64>, default: Duration| {
            value.map(Duration::from_secs).unwrap_or(default)
        };
        Self {
            page_load: secs(config.page_load_secs, defaults.page_load),
            details_load: secs(config.details_load_secs, defaults.details_load),
            login_form_wait: secs(config.login_form_wait_secs, defaults.login_form_wait),
            login_redirect_wait: secs(
                config.login_redirect_wait_secs,
                defaults.login_redirect_wait,
            ),
        }
    }
}

/// Station console URL template
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub(crate) prefix: String,
    pub(crate) suffix: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_URL_PREFIX.to_string(),
            suffix: DEFAULT_URL_SUFFIX.to_string(),
        }
    }
}

impl Endpoint {
    pub(crate) fn base_url(&self, site: &str) -> String {
        format!("{}{}{}", self.prefix, site, self.suffix)
    }

    pub(crate) fn details_url(&self, site: &str) -> String {
        format!("{}{}", self.base_url(site), DETAILS_PATH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportSettings {
    pub(crate) title: String,
    pub(crate) file_prefix: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_REPORT_TITLE.to_string(),
            file_prefix: DEFAULT_REPORT_FILE_PREFIX.to_string(),
        }
    }
}

/// Everything a run needs, resolved once from CLI and config
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) endpoint: Endpoint,
    pub(crate) timeouts: Timeouts,
    pub(crate) credentials_path: PathBuf,
    pub(crate) output_dir: PathBuf,
    pub(crate) session_dir: PathBuf,
    pub(crate) report: ReportSettings,
    pub(crate) sites: Vec<Site>,
    pub(crate) zone: ReportZone,
    pub(crate) debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            timeouts: Timeouts::default(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            session_dir: default_session_dir().unwrap_or_else(|| PathBuf::from("sessions")),
            report: ReportSettings::default(),
            sites: default_sites(),
            zone: ReportZone::Local,
            debug: false,
        }
    }
}

impl Settings {
    /// `cli` is expected to already carry config values merged in via
    /// [`Cli::with_config`]
    pub(crate) fn resolve(cli: &Cli, config: &Config) -> Result<Self, AppError> {
        let defaults = Self::default();
        let report = ReportSettings {
            title: config.report.title.clone().unwrap_or(defaults.report.title),
            file_prefix: config
                .report
                .file_prefix
                .clone()
                .unwrap_or(defaults.report.file_prefix),
        };

        Ok(Self {
            endpoint: Endpoint {
                prefix: config.url_prefix.clone().unwrap_or(defaults.endpoint.prefix),
                suffix: config.url_suffix.clone().unwrap_or(defaults.endpoint.suffix),
            },
            timeouts: Timeouts::from_config(&config.timeouts),
            credentials_path: cli.credentials.clone().unwrap_or(defaults.credentials_path),
            output_dir: cli.output_dir.clone().unwrap_or(defaults.output_dir),
            session_dir: cli.session_dir.clone().unwrap_or(defaults.session_dir),
            report,
            sites: config.sites.clone().unwrap_or(defaults.sites),
            zone: ReportZone::from_setting(cli.timezone.as_deref())?,
            debug: cli.debug,
        })
    }
}
