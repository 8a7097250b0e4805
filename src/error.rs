use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. All but [`AppError::Render`] stop the run before any site
/// is contacted.
#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(
        "Credentials file not found: {}\nCreate it with the following structure:\n{}",
        .path.display(),
        crate::credentials::CREDENTIALS_TEMPLATE
    )]
    CredentialsNotFound { path: PathBuf },

    #[error("Failed to read credentials file {}: {source}", .path.display())]
    CredentialsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid credentials file {}: {source}", .path.display())]
    CredentialsInvalid {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    ConfigInvalid {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Failed to clear cached sessions: {0}")]
    SessionPurge(#[from] SessionError),

    #[error("Failed to save chart: {0}")]
    Render(#[from] RenderError),
}

/// Failures of the browser engine. Always contained to the site that
/// triggered them.
#[derive(Debug, Error)]
pub(crate) enum BrowserError {
    #[error("timed out loading {url}")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("too many redirects starting at {0}")]
    TooManyRedirects(String),

    #[error("cookie {name} rejected for {url}")]
    CookieRejected { name: String, url: String },

    #[error("no form with field {0} on the current page")]
    FormNotFound(String),

    #[error("no page loaded")]
    NoPage,

    #[error("no open browsing context")]
    NoContext,
}

/// Why a station login did not produce an authenticated page. Recovered:
/// the site is reported with no readings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum AuthFailure {
    #[error("console unreachable: {0}")]
    Unreachable(String),

    #[error("no login form found but still on login page {url}")]
    LoginFormMissing { url: String },

    #[error("login submission failed: {0}")]
    SubmitFailed(String),

    #[error("still on login page {url} after submitting credentials")]
    StillOnLoginPage { url: String },
}

/// Session-cache failures.
#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("corrupt session file {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("session cache I/O on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode session for {site}: {source}")]
    Encode {
        site: String,
        source: serde_json::Error,
    },

    #[error("invalid session cache pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Chart rendering failures. The scrape results are still valid when this
/// happens; only the image is lost.
#[derive(Debug, Error)]
pub(crate) enum RenderError {
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write chart {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("bundled chart font could not be loaded")]
    Font,
}
