//! Plain-HTTP browser engine
//!
//! Fetches pages with `ureq`. Each browsing context owns its own agent, so
//! redirects, `Set-Cookie` handling and cookie expiry all happen in that
//! agent's cookie store. The context keeps the final URL and HTML of the last
//! load. Pages are static: nothing changes after load except through a
//! `<meta http-equiv="refresh">` redirect.

use std::time::{Duration, Instant};
use ureq::http::Uri;
use ureq::{Agent, ResponseExt};

use super::{Browser, Condition, Cookie, page};
use crate::error::BrowserError;

const MAX_REDIRECTS: u32 = 10;

fn new_agent() -> Agent {
    Agent::config_builder()
        .max_redirects(MAX_REDIRECTS)
        .http_status_as_error(false)
        .build()
        .into()
}

/// One tab: an isolated cookie store plus the page it shows
struct Context {
    agent: Agent,
    url: Option<String>,
    source: Option<String>,
}

impl Context {
    fn new() -> Self {
        Self {
            agent: new_agent(),
            url: None,
            source: None,
        }
    }
}

/// Resolve `reference` (absolute, scheme-relative, root-relative or
/// relative) against `base`
fn resolve_url(base: &str, reference: &str) -> String {
    let reference = reference.trim();
    if reference.contains("://") {
        return reference.to_string();
    }
    let Ok(uri) = base.parse::<Uri>() else {
        return reference.to_string();
    };
    let scheme = uri.scheme_str().unwrap_or("http");
    if let Some(rest) = reference.strip_prefix("//") {
        return format!("{scheme}://{rest}");
    }
    let authority = uri.authority().map(|a| a.as_str()).unwrap_or_default();
    if reference.starts_with('/') {
        return format!("{scheme}://{authority}{reference}");
    }
    if reference.is_empty() {
        return base.to_string();
    }
    let path = uri.path();
    let dir = &path[..path.rfind('/').map(|i| i + 1).unwrap_or(0)];
    let dir = if dir.is_empty() { "/" } else { dir };
    format!("{scheme}://{authority}{dir}{reference}")
}

fn parse_uri(url: &str) -> Result<Uri, BrowserError> {
    match url.parse::<Uri>() {
        Ok(uri) if uri.host().is_some() => Ok(uri),
        _ => Err(BrowserError::InvalidUrl(url.to_string())),
    }
}

fn map_error(url: &str, err: ureq::Error) -> BrowserError {
    match err {
        ureq::Error::Timeout(_) => BrowserError::Timeout {
            url: url.to_string(),
        },
        ureq::Error::TooManyRedirects => BrowserError::TooManyRedirects(url.to_string()),
        other => BrowserError::Transport {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}

/// `Set-Cookie` line that seeds `cookie` for `host`. A domain equal to the
/// host stays host-only.
fn seed_line(cookie: &Cookie, host: &str) -> String {
    let mut line = format!(
        "{}={}; Path={}",
        cookie.name,
        cookie.value,
        cookie.path.as_deref().unwrap_or("/")
    );
    if let Some(domain) = cookie.domain.as_deref()
        && !domain.eq_ignore_ascii_case(host)
    {
        line.push_str("; Domain=");
        line.push_str(domain);
    }
    line
}

/// [`Browser`] over HTTP with a stack of isolated contexts
pub(crate) struct HttpBrowser {
    contexts: Vec<Context>,
}

impl HttpBrowser {
    pub(crate) fn new() -> Self {
        Self {
            contexts: vec![Context::new()],
        }
    }

    fn current(&self) -> Option<&Context> {
        self.contexts.last()
    }

    /// Load `url` into the current context. The agent follows redirects and
    /// stores every cookie set along the way; a posted form turns into a GET
    /// after 301/302/303.
    fn load(
        &mut self,
        url: &str,
        form: Option<&[(String, String)]>,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        parse_uri(url)?;
        let context = self.contexts.last_mut().ok_or(BrowserError::NoContext)?;

        let result = match form {
            Some(fields) => context
                .agent
                .post(url)
                .config()
                .timeout_global(Some(timeout))
                .build()
                .send_form(fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
            None => context
                .agent
                .get(url)
                .config()
                .timeout_global(Some(timeout))
                .build()
                .call(),
        };
        let mut response = result.map_err(|e| map_error(url, e))?;

        let status = response.status();
        let landed = response.get_uri().to_string();
        let source = response
            .body_mut()
            .read_to_string()
            .map_err(|e| map_error(&landed, e))?;
        tracing::trace!("{} {} -> {} ({} bytes)", status.as_u16(), url, landed, source.len());
        context.url = Some(landed);
        context.source = Some(source);
        Ok(())
    }
}

impl Browser for HttpBrowser {
    fn open_context(&mut self) -> Result<(), BrowserError> {
        self.contexts.push(Context::new());
        Ok(())
    }

    fn close_context(&mut self) {
        if self.contexts.len() > 1 {
            self.contexts.pop();
        }
    }

    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.load(url, None, timeout)
    }

    fn refresh(&mut self, timeout: Duration) -> Result<(), BrowserError> {
        let url = self
            .current_url()
            .map(str::to_string)
            .ok_or(BrowserError::NoPage)?;
        self.load(&url, None, timeout)
    }

    fn current_url(&self) -> Option<&str> {
        self.current()?.url.as_deref()
    }

    fn page_source(&self) -> Option<&str> {
        self.current()?.source.as_deref()
    }

    fn wait_for(&mut self, condition: Condition<'_>, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if condition.holds(self.current_url(), self.page_source()) {
                return true;
            }
            let (Some(url), Some(source)) = (self.current_url(), self.page_source()) else {
                return false;
            };
            let Some((delay, target)) = page::meta_refresh(source) else {
                return false;
            };
            let next = target
                .map(|t| resolve_url(url, &t))
                .unwrap_or_else(|| url.to_string());
            let delay = Duration::from_secs(delay);
            let remaining = deadline.saturating_duration_since(Instant::now());
            if delay >= remaining {
                return false;
            }
            std::thread::sleep(delay);
            let remaining = deadline.saturating_duration_since(Instant::now());
            if self.load(&next, None, remaining).is_err() {
                return false;
            }
        }
    }

    fn submit_form(
        &mut self,
        fields: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let Some((first, _)) = fields.first() else {
            return Err(BrowserError::FormNotFound(String::new()));
        };
        let (url, source) = match (self.current_url(), self.page_source()) {
            (Some(url), Some(source)) => (url.to_string(), source),
            _ => return Err(BrowserError::NoPage),
        };
        let mut form = page::find_form(source, first)
            .ok_or_else(|| BrowserError::FormNotFound(first.to_string()))?;
        for (name, value) in fields {
            form.fill(name, value);
        }
        // Consoles post their login form; GET forms are not expected here
        let action = form
            .action
            .as_deref()
            .map(|a| resolve_url(&url, a))
            .unwrap_or(url);
        self.load(&action, Some(&form.inputs), timeout)
    }

    /// Unexpired cookies held by the current context, tagged with the
    /// current page's host
    fn cookies(&self) -> Vec<Cookie> {
        let Some(context) = self.current() else {
            return Vec::new();
        };
        let Some(uri) = context.url.as_deref().and_then(|u| parse_uri(u).ok()) else {
            return Vec::new();
        };
        let host = uri.host().unwrap_or_default();

        let jar = context.agent.cookie_jar_lock();
        let cookies: Vec<Cookie> = jar
            .iter()
            .map(|c| Cookie::new(c.name(), c.value()).with_domain(host))
            .collect();
        jar.release();
        cookies
    }

    fn add_cookie(&mut self, cookie: &Cookie) -> Result<(), BrowserError> {
        let context = self.contexts.last().ok_or(BrowserError::NoContext)?;
        let url = context.url.clone().ok_or(BrowserError::NoPage)?;
        let uri = parse_uri(&url)?;
        let host = uri.host().unwrap_or_default();

        let rejected = || BrowserError::CookieRejected {
            name: cookie.name.clone(),
            url: url.clone(),
        };
        let foreign = cookie.domain.is_some() && !cookie.matches_host(host);
        if cookie.name.is_empty() || foreign {
            return Err(rejected());
        }

        let parsed = ureq::Cookie::parse(seed_line(cookie, host), &uri).map_err(|e| {
            tracing::debug!("Cookie {} does not parse: {e}", cookie.name);
            rejected()
        })?;
        let mut jar = context.agent.cookie_jar_lock();
        let stored = jar.insert(parsed, &uri);
        jar.release();
        stored.map_err(|e| {
            tracing::debug!("Cookie {} refused by the store: {e}", cookie.name);
            rejected()
        })
    }
}
