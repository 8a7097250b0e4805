//! Browser capability layer
//!
//! The station session and extraction steps only talk to a [`Browser`]:
//! navigate, look at the current page, submit a form, and read or seed
//! cookies. [`HttpBrowser`] implements it on top of plain HTTP requests, one
//! cookie-keeping agent per context; tests use a scripted fake and a loopback
//! station server.

mod http;
pub(crate) mod page;
mod tab;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
pub(crate) mod local;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::BrowserError;

pub(crate) use http::HttpBrowser;
pub(crate) use tab::Tab;

/// A cookie as stored in the session cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Cookie {
    pub(crate) name: String,
    pub(crate) value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) path: Option<String>,
}

impl Cookie {
    pub(crate) fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
        }
    }

    pub(crate) fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Whether this cookie is sent to `host`
    pub(crate) fn matches_host(&self, host: &str) -> bool {
        let Some(domain) = self.domain.as_deref() else {
            return false;
        };
        let domain = domain.trim_start_matches('.').to_ascii_lowercase();
        let host = host.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{domain}"))
    }
}

/// Something to wait for on the current page
#[derive(Debug, Clone, Copy)]
pub(crate) enum Condition<'a> {
    /// An element with this `name` attribute is present
    ElementNamed(&'a str),
    /// The current URL contains this fragment
    UrlContains(&'a str),
}

impl Condition<'_> {
    pub(crate) fn holds(&self, url: Option<&str>, source: Option<&str>) -> bool {
        match self {
            Condition::ElementNamed(name) => {
                source.is_some_and(|html| page::has_named_element(html, name))
            }
            Condition::UrlContains(fragment) => url.is_some_and(|u| u.contains(fragment)),
        }
    }
}

/// Browser automation capabilities used by the station workflow.
///
/// Every page operation acts on the most recently opened browsing context.
/// Timeouts bound each call; an expired timeout is reported as
/// [`BrowserError::Timeout`] (or `false` for [`Browser::wait_for`]).
pub(crate) trait Browser {
    /// Open an isolated browsing context and make it current
    fn open_context(&mut self) -> Result<(), BrowserError>;

    /// Close the current browsing context. The initial context is never
    /// closed.
    fn close_context(&mut self);

    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Reload the current page
    fn refresh(&mut self, timeout: Duration) -> Result<(), BrowserError>;

    fn current_url(&self) -> Option<&str>;

    /// HTML of the current page
    fn page_source(&self) -> Option<&str>;

    /// Wait until `condition` holds for the current page, up to `timeout`
    fn wait_for(&mut self, condition: Condition<'_>, timeout: Duration) -> bool;

    /// Fill the form that contains the first field with `fields` and submit
    /// it. The response (after redirects) becomes the current page.
    fn submit_form(
        &mut self,
        fields: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    /// Cookies the current page's session holds
    fn cookies(&self) -> Vec<Cookie>;

    /// Seed a cookie for the current page's host
    fn add_cookie(&mut self, cookie: &Cookie) -> Result<(), BrowserError>;
}
