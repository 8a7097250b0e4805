//! Station console login with cached-session reuse

use crate::browser::{Browser, Condition};
use crate::config::Settings;
use crate::consts::{
    LOGIN_PASSWORD_FIELD, LOGIN_URL_MARKER, LOGIN_USERNAME_FIELD, STATUS_PATH_MARKER,
};
use crate::core::{SessionStore, Site};
use crate::error::AuthFailure;

/// Result of bringing a console to an authenticated page
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionOutcome {
    /// Credentials were submitted and accepted
    Authenticated,
    /// No login form was shown: a cached session worked or the console is
    /// open
    AlreadyAuthenticated,
    Failed(AuthFailure),
}

fn is_login_url(url: &str) -> bool {
    url.to_ascii_lowercase().contains(LOGIN_URL_MARKER)
}

/// Logs into station consoles as one operator account
pub(crate) struct SiteSession<'a> {
    settings: &'a Settings,
    store: &'a SessionStore,
    username: &'a str,
}

impl<'a> SiteSession<'a> {
    pub(crate) fn new(settings: &'a Settings, store: &'a SessionStore, username: &'a str) -> Self {
        Self {
            settings,
            store,
            username,
        }
    }

    /// Bring the current browsing context to an authenticated page for
    /// `site`. A fresh login overwrites the site's cached session; a reused
    /// session leaves the cache untouched.
    pub(crate) fn authenticate<B: Browser + ?Sized>(
        &self,
        browser: &mut B,
        site: &Site,
        secret: &str,
    ) -> SessionOutcome {
        let code = site.code.as_str();
        let base = self.settings.endpoint.base_url(code);
        let timeouts = &self.settings.timeouts;

        if let Err(e) = browser.navigate(&base, timeouts.page_load) {
            tracing::warn!("[{code}] Loading took too much time: {e}");
            return SessionOutcome::Failed(AuthFailure::Unreachable(e.to_string()));
        }

        let restored = match self.restore_session(browser, code, &base) {
            Ok(restored) => restored,
            Err(failure) => return SessionOutcome::Failed(failure),
        };

        if !browser.wait_for(
            Condition::ElementNamed(LOGIN_USERNAME_FIELD),
            timeouts.login_form_wait,
        ) {
            let url = browser.current_url().unwrap_or_default().to_string();
            if is_login_url(&url) {
                tracing::warn!("[{code}] Timeout waiting for login elements at {url}");
                return SessionOutcome::Failed(AuthFailure::LoginFormMissing { url });
            }
            tracing::debug!("[{code}] No login required or already logged in (URL: {url})");
            return SessionOutcome::AlreadyAuthenticated;
        }

        if restored {
            tracing::debug!("[{code}] Cached session not accepted, logging in");
        }
        if let Err(failure) = self.login(browser, code, secret) {
            return SessionOutcome::Failed(failure);
        }
        self.persist(browser, code);
        SessionOutcome::Authenticated
    }

    /// Seed cached cookies and reload. Returns whether a cached session was
    /// applied; fails only when the console can't be reloaded at all.
    fn restore_session<B: Browser + ?Sized>(
        &self,
        browser: &mut B,
        code: &str,
        base: &str,
    ) -> Result<bool, AuthFailure> {
        let cookies = match self.store.load(code) {
            Ok(Some(cookies)) => cookies,
            Ok(None) => {
                tracing::debug!("[{code}] No cached session. Will login with credentials.");
                return Ok(false);
            }
            Err(e) => {
                tracing::debug!("[{code}] {e}. Will login with credentials.");
                self.discard(code);
                return Ok(false);
            }
        };

        for cookie in &cookies {
            if let Err(e) = browser.add_cookie(cookie) {
                tracing::warn!("[{code}] Error adding cookie: {e}");
                self.discard(code);
                break;
            }
        }

        let page_load = self.settings.timeouts.page_load;
        match browser.refresh(page_load) {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::warn!(
                    "[{code}] Refresh with cached session failed ({e}). Proceeding with login."
                );
                self.discard(code);
                browser.navigate(base, page_load).map_err(|e| {
                    tracing::warn!("[{code}] Reloading console after refresh failure: {e}");
                    AuthFailure::Unreachable(e.to_string())
                })?;
                Ok(false)
            }
        }
    }

    fn login<B: Browser + ?Sized>(
        &self,
        browser: &mut B,
        code: &str,
        secret: &str,
    ) -> Result<(), AuthFailure> {
        let timeouts = &self.settings.timeouts;
        let fields = [
            (LOGIN_USERNAME_FIELD, self.username),
            (LOGIN_PASSWORD_FIELD, secret),
        ];
        browser
            .submit_form(&fields, timeouts.page_load)
            .map_err(|e| {
                tracing::warn!("[{code}] Login exception: {e}");
                AuthFailure::SubmitFailed(e.to_string())
            })?;

        if browser.wait_for(
            Condition::UrlContains(STATUS_PATH_MARKER),
            timeouts.login_redirect_wait,
        ) {
            tracing::info!("[{code}] Logged in successfully.");
            return Ok(());
        }

        // No redirect to the status page in time. Anything that isn't a
        // login page still counts as logged in.
        let url = browser.current_url().unwrap_or_default().to_string();
        if is_login_url(&url) {
            tracing::warn!("[{code}] Login may have failed - still on login page");
            return Err(AuthFailure::StillOnLoginPage { url });
        }
        tracing::info!("[{code}] Login appears successful (redirected to: {url})");
        Ok(())
    }

    fn persist<B: Browser + ?Sized>(&self, browser: &B, code: &str) {
        let cookies = browser.cookies();
        match self.store.save(code, &cookies) {
            Ok(path) => tracing::debug!(
                "[{code}] Saved {} cookie(s) to {}",
                cookies.len(),
                path.display()
            ),
            Err(e) => tracing::warn!("[{code}] Could not save session: {e}"),
        }
    }

    fn discard(&self, code: &str) {
        match self.store.remove(code) {
            Ok(true) => tracing::info!("[{code}] Deleted cached session"),
            Ok(false) => {}
            Err(e) => tracing::warn!("[{code}] Could not delete cached session: {e}"),
        }
    }
}
