/// Station console URLs are `{prefix}{SITE}{suffix}`
pub(crate) const DEFAULT_URL_PREFIX: &str = "http://";
pub(crate) const DEFAULT_URL_SUFFIX: &str = "-maracoos.dyndns.org:8240";

/// Sub-path holding the notice blocks with disk usage
pub(crate) const DETAILS_PATH: &str = "/details";

/// Fragment of the URL the console redirects to after a good login
pub(crate) const STATUS_PATH_MARKER: &str = "/status";

/// Any URL containing this (case-insensitive) is treated as a login page
pub(crate) const LOGIN_URL_MARKER: &str = "login";

pub(crate) const LOGIN_USERNAME_FIELD: &str = "login_username";
pub(crate) const LOGIN_PASSWORD_FIELD: &str = "login_password";

pub(crate) const DEFAULT_PAGE_LOAD_SECS: u64 = 25;
pub(crate) const DEFAULT_DETAILS_LOAD_SECS: u64 = 15;
pub(crate) const DEFAULT_LOGIN_FORM_WAIT_SECS: u64 = 5;
pub(crate) const DEFAULT_LOGIN_REDIRECT_WAIT_SECS: u64 = 15;

pub(crate) const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";
pub(crate) const DEFAULT_OUTPUT_DIR: &str = "output";

pub(crate) const DEFAULT_REPORT_TITLE: &str = "RUCODAR Site Computer Storage Space";
pub(crate) const DEFAULT_REPORT_FILE_PREFIX: &str = "MARACOOS_Storage_Space";

/// Application directory name under the user's config and cache dirs
pub(crate) const APP_DIR: &str = "rws-storage";

/// Placeholder shown for an absent reading
pub(crate) const NOT_AVAILABLE: &str = "N/A";
