use std::ops::{Deref, DerefMut};

use super::Browser;
use crate::error::BrowserError;

/// A browsing context opened for one site. Closed when dropped, whichever
/// way the site's work ends.
pub(crate) struct Tab<'a, B: Browser + ?Sized> {
    browser: &'a mut B,
}

impl<'a, B: Browser + ?Sized> Tab<'a, B> {
    pub(crate) fn open(browser: &'a mut B) -> Result<Self, BrowserError> {
        browser.open_context()?;
        Ok(Self { browser })
    }
}

impl<B: Browser + ?Sized> Deref for Tab<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.browser
    }
}

impl<B: Browser + ?Sized> DerefMut for Tab<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.browser
    }
}

impl<B: Browser + ?Sized> Drop for Tab<'_, B> {
    fn drop(&mut self) {
        self.browser.close_context();
    }
}
