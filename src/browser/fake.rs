//! Scripted in-memory browser for tests
//!
//! Each station is keyed by host. Unauthenticated requests land on a login
//! page; a correct password issues a `rws_session` cookie and redirects to
//! `/status`.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::{Browser, Condition, Cookie, page};
use crate::error::BrowserError;

pub(crate) const SESSION_COOKIE: &str = "rws_session";

pub(crate) const LOGIN_HTML: &str = r#"<html><body>
<form method="post" action="/login">
  <input type="text" name="login_username">
  <input type="password" name="login_password">
</form></body></html>"#;

const STATUS_HTML: &str = "<html><body><p>Radial Suite status</p></body></html>";

#[derive(Debug, Clone)]
pub(crate) struct FakeStation {
    pub(crate) password: String,
    pub(crate) reachable: bool,
    pub(crate) requires_login: bool,
    /// Accept the password but never redirect away from the login URL
    pub(crate) stuck_on_login: bool,
    /// Redirect somewhere other than `/status` after login
    pub(crate) lands_on: Option<String>,
    pub(crate) details_html: String,
    pub(crate) details_reachable: bool,
    valid_tokens: HashSet<String>,
}

impl FakeStation {
    pub(crate) fn new(password: &str, details_html: &str) -> Self {
        Self {
            password: password.to_string(),
            reachable: true,
            requires_login: true,
            stuck_on_login: false,
            lands_on: None,
            details_html: details_html.to_string(),
            details_reachable: true,
            valid_tokens: HashSet::new(),
        }
    }

    pub(crate) fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    pub(crate) fn open_console(mut self) -> Self {
        self.requires_login = false;
        self
    }

    /// Pre-issue a session token, as if a previous run logged in
    pub(crate) fn with_token(mut self, token: &str) -> Self {
        self.valid_tokens.insert(token.to_string());
        self
    }
}

#[derive(Debug, Default)]
struct FakeContext {
    url: Option<String>,
    source: Option<String>,
}

#[derive(Debug)]
pub(crate) struct FakeBrowser {
    stations: HashMap<String, FakeStation>,
    jar: Vec<Cookie>,
    contexts: Vec<FakeContext>,
    events: Vec<String>,
    issued: u32,
    pub(crate) refresh_fails: bool,
}

fn split_url(url: &str) -> Option<(String, String)> {
    let rest = url.split_once("://")?.1;
    let (host, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    Some((host.to_string(), path.to_string()))
}

impl FakeBrowser {
    pub(crate) fn new() -> Self {
        Self {
            stations: HashMap::new(),
            jar: Vec::new(),
            contexts: vec![FakeContext::default()],
            events: Vec::new(),
            issued: 0,
            refresh_fails: false,
        }
    }

    pub(crate) fn with_station(mut self, host: &str, station: FakeStation) -> Self {
        self.stations.insert(host.to_string(), station);
        self
    }

    pub(crate) fn station_mut(&mut self, host: &str) -> Option<&mut FakeStation> {
        self.stations.get_mut(host)
    }

    pub(crate) fn events(&self) -> &[String] {
        &self.events
    }

    pub(crate) fn submissions(&self) -> usize {
        self.events.iter().filter(|e| e.starts_with("submit")).count()
    }

    pub(crate) fn open_contexts(&self) -> usize {
        self.contexts.len()
    }

    fn authorized(&self, host: &str) -> bool {
        let Some(station) = self.stations.get(host) else {
            return false;
        };
        !station.requires_login
            || self.jar.iter().any(|c| {
                c.name == SESSION_COOKIE
                    && c.matches_host(host)
                    && station.valid_tokens.contains(&c.value)
            })
    }

    fn set_page(&mut self, url: String, source: String) -> Result<(), BrowserError> {
        let context = self.contexts.last_mut().ok_or(BrowserError::NoContext)?;
        context.url = Some(url);
        context.source = Some(source);
        Ok(())
    }
}

impl Browser for FakeBrowser {
    fn open_context(&mut self) -> Result<(), BrowserError> {
        self.events.push("open".to_string());
        self.contexts.push(FakeContext::default());
        Ok(())
    }

    fn close_context(&mut self) {
        self.events.push("close".to_string());
        if self.contexts.len() > 1 {
            self.contexts.pop();
        }
    }

    fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        let timeout = || BrowserError::Timeout {
            url: url.to_string(),
        };
        let (host, path) = split_url(url).ok_or_else(|| BrowserError::InvalidUrl(url.to_string()))?;
        let station = self.stations.get(&host).ok_or_else(timeout)?;
        if !station.reachable {
            return Err(timeout());
        }
        if path == "/details" && !station.details_reachable {
            return Err(timeout());
        }
        let details = station.details_html.clone();

        if !self.authorized(&host) {
            return self.set_page(format!("http://{host}/login"), LOGIN_HTML.to_string());
        }
        match path.as_str() {
            "/details" => self.set_page(url.to_string(), details),
            "/" | "" | "/login" => self.set_page(format!("http://{host}/status"), STATUS_HTML.to_string()),
            _ => self.set_page(url.to_string(), STATUS_HTML.to_string()),
        }
    }

    fn refresh(&mut self, timeout: Duration) -> Result<(), BrowserError> {
        let url = self
            .current_url()
            .map(str::to_string)
            .ok_or(BrowserError::NoPage)?;
        if self.refresh_fails {
            return Err(BrowserError::Timeout { url });
        }
        self.navigate(&url, timeout)
    }

    fn current_url(&self) -> Option<&str> {
        self.contexts.last()?.url.as_deref()
    }

    fn page_source(&self) -> Option<&str> {
        self.contexts.last()?.source.as_deref()
    }

    fn wait_for(&mut self, condition: Condition<'_>, _timeout: Duration) -> bool {
        condition.holds(self.current_url(), self.page_source())
    }

    fn submit_form(
        &mut self,
        fields: &[(&str, &str)],
        _timeout: Duration,
    ) -> Result<(), BrowserError> {
        let url = self.current_url().ok_or(BrowserError::NoPage)?.to_string();
        let source = self.page_source().unwrap_or_default();
        let first = fields.first().map(|(name, _)| *name).unwrap_or_default();
        if page::find_form(source, first).is_none() {
            return Err(BrowserError::FormNotFound(first.to_string()));
        }
        let (host, _) = split_url(&url).ok_or_else(|| BrowserError::InvalidUrl(url.clone()))?;
        self.events.push(format!("submit {host}"));

        let password = fields
            .iter()
            .find(|(name, _)| *name == crate::consts::LOGIN_PASSWORD_FIELD)
            .map(|(_, value)| *value)
            .unwrap_or_default();
        let station = self
            .stations
            .get_mut(&host)
            .ok_or_else(|| BrowserError::InvalidUrl(url.clone()))?;
        if station.password != password {
            return self.set_page(format!("http://{host}/login?failed=1"), LOGIN_HTML.to_string());
        }

        self.issued += 1;
        let token = format!("tok-{}", self.issued);
        station.valid_tokens.insert(token.clone());
        let stuck = station.stuck_on_login;
        let lands_on = station.lands_on.clone();
        self.jar.retain(|c| !(c.name == SESSION_COOKIE && c.matches_host(&host)));
        self.jar
            .push(Cookie::new(SESSION_COOKIE, token).with_domain(host.clone()));

        if stuck {
            return self.set_page(format!("http://{host}/login"), STATUS_HTML.to_string());
        }
        let landing = lands_on.unwrap_or_else(|| "/status".to_string());
        self.set_page(format!("http://{host}{landing}"), STATUS_HTML.to_string())
    }

    fn cookies(&self) -> Vec<Cookie> {
        let Some((host, _)) = self.current_url().and_then(split_url) else {
            return Vec::new();
        };
        self.jar.iter().filter(|c| c.matches_host(&host)).cloned().collect()
    }

    fn add_cookie(&mut self, cookie: &Cookie) -> Result<(), BrowserError> {
        let url = self.current_url().ok_or(BrowserError::NoPage)?.to_string();
        let (host, _) = split_url(&url).ok_or_else(|| BrowserError::InvalidUrl(url.clone()))?;
        let mut cookie = cookie.clone();
        if cookie.domain.is_none() {
            cookie.domain = Some(host.clone());
        }
        if !cookie.matches_host(&host) {
            return Err(BrowserError::CookieRejected {
                name: cookie.name,
                url,
            });
        }
        self.events.push(format!("add_cookie {}", cookie.name));
        self.jar
            .retain(|c| !(c.name == cookie.name && c.domain == cookie.domain));
        self.jar.push(cookie);
        Ok(())
    }
}
