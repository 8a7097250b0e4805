//! Sequential scrape of every configured station

use crate::browser::{Browser, Tab};
use crate::config::Settings;
use crate::core::{RunResult, SessionStore, Site, StorageReading};
use crate::credentials::Credentials;
use crate::station::{SessionOutcome, SiteSession, StorageExtractor};

/// Drives one browser engine through all sites in order. A failing site
/// yields an empty reading and never affects the next one.
pub(crate) struct RunCoordinator<'a, B: Browser> {
    browser: B,
    settings: &'a Settings,
    store: &'a SessionStore,
}

impl<'a, B: Browser> RunCoordinator<'a, B> {
    pub(crate) fn new(browser: B, settings: &'a Settings, store: &'a SessionStore) -> Self {
        Self {
            browser,
            settings,
            store,
        }
    }

    #[cfg(test)]
    pub(crate) fn browser(&self) -> &B {
        &self.browser
    }

    /// One reading per site that has a credential, in `sites` order
    pub(crate) fn run(&mut self, sites: &[Site], credentials: &Credentials) -> RunResult {
        let mut results = Vec::with_capacity(sites.len());
        for site in sites {
            let Some(secret) = credentials.secret(&site.code) else {
                tracing::warn!("[{}] No credentials. Skipping.", site.code);
                continue;
            };
            let reading = self.scrape_site(site, &credentials.username, secret);
            tracing::debug!(
                "[{}] Result: internal={:?} external={:?}",
                reading.site,
                reading.internal_free,
                reading.external_free
            );
            results.push(reading);
        }
        results
    }

    fn scrape_site(&mut self, site: &Site, username: &str, secret: &str) -> StorageReading {
        let code = site.code.as_str();
        tracing::info!("[{code}] Processing...");

        let mut tab = match Tab::open(&mut self.browser) {
            Ok(tab) => tab,
            Err(e) => {
                tracing::warn!("[{code}] Could not open browsing context: {e}");
                return StorageReading::unavailable(site);
            }
        };

        let session = SiteSession::new(self.settings, self.store, username);
        match session.authenticate(&mut *tab, site, secret) {
            SessionOutcome::Failed(failure) => {
                tracing::warn!("[{code}] Login failed: {failure}");
                return StorageReading::unavailable(site);
            }
            SessionOutcome::Authenticated | SessionOutcome::AlreadyAuthenticated => {}
        }

        let (internal, external) = StorageExtractor::new(self.settings).extract(&mut *tab, site);
        StorageReading::new(site, internal, external)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::HttpBrowser;
    use crate::browser::fake::{FakeBrowser, FakeStation};
    use crate::browser::local::LocalStation;
    use crate::config::Endpoint;
    use crate::core::FrequencyGroup;

    const DETAILS: &str = r#"
        <div class="notice">CODAR volume [48% avail.]</div>
        <div class="notice">External disk 62% used</div>"#;

    struct Fixture {
        _dir: tempfile::TempDir,
        settings: Settings,
        store: SessionStore,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            endpoint: Endpoint {
                prefix: "http://".to_string(),
                suffix: ".test".to_string(),
            },
            ..Settings::default()
        };
        let store = SessionStore::new(dir.path().to_path_buf());
        Fixture {
            _dir: dir,
            settings,
            store,
        }
    }

    fn sites() -> Vec<Site> {
        vec![
            Site::new("NANT", FrequencyGroup::Mhz5),
            Site::new("BLCK", FrequencyGroup::Mhz5),
            Site::new("SEAB", FrequencyGroup::Mhz13),
        ]
    }

    fn browser() -> FakeBrowser {
        FakeBrowser::new()
            .with_station("NANT.test", FakeStation::new("n", DETAILS))
            .with_station("BLCK.test", FakeStation::new("b", DETAILS))
            .with_station("SEAB.test", FakeStation::new("s", DETAILS))
    }

    #[test]
    fn failing_site_does_not_stop_the_run() {
        let fx = fixture();
        let credentials =
            Credentials::for_tests("op", &[("NANT", "n"), ("BLCK", "wrong"), ("SEAB", "s")]);
        let mut coordinator = RunCoordinator::new(browser(), &fx.settings, &fx.store);

        let results = coordinator.run(&sites(), &credentials);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].site, "NANT");
        assert_eq!(
            (results[0].internal_free, results[0].external_free),
            (Some(48), Some(38))
        );
        assert_eq!(results[1].site, "BLCK");
        assert!(results[1].is_empty());
        assert_eq!(results[2].site, "SEAB");
        assert_eq!(results[2].group, FrequencyGroup::Mhz13);
        assert_eq!(results[2].internal_free, Some(48));
    }

    #[test]
    fn unreachable_site_gives_empty_reading() {
        let fx = fixture();
        let credentials =
            Credentials::for_tests("op", &[("NANT", "n"), ("BLCK", "b"), ("SEAB", "s")]);
        let mut fake = browser();
        if let Some(station) = fake.station_mut("NANT.test") {
            station.reachable = false;
        }
        let mut coordinator = RunCoordinator::new(fake, &fx.settings, &fx.store);

        let results = coordinator.run(&sites(), &credentials);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_empty());
        assert!(!results[1].is_empty());
        assert!(!results[2].is_empty());
    }

    #[test]
    fn sites_without_credentials_are_skipped() {
        let fx = fixture();
        let credentials = Credentials::for_tests("op", &[("SEAB", "s")]);
        let mut coordinator = RunCoordinator::new(browser(), &fx.settings, &fx.store);

        let results = coordinator.run(&sites(), &credentials);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].site, "SEAB");
    }

    #[test]
    fn every_context_is_closed() {
        let fx = fixture();
        let credentials =
            Credentials::for_tests("op", &[("NANT", "n"), ("BLCK", "wrong"), ("SEAB", "s")]);
        let mut coordinator = RunCoordinator::new(browser(), &fx.settings, &fx.store);

        coordinator.run(&sites(), &credentials);

        let events = coordinator.browser().events();
        let opened = events.iter().filter(|e| *e == "open").count();
        let closed = events.iter().filter(|e| *e == "close").count();
        assert_eq!(opened, 3);
        assert_eq!(closed, 3);
        assert_eq!(coordinator.browser().open_contexts(), 1);
    }

    #[test]
    fn second_run_reuses_cached_sessions() {
        let fx = fixture();
        let credentials =
            Credentials::for_tests("op", &[("NANT", "n"), ("BLCK", "b"), ("SEAB", "s")]);
        let mut coordinator = RunCoordinator::new(browser(), &fx.settings, &fx.store);

        let first = coordinator.run(&sites(), &credentials);
        let second = coordinator.run(&sites(), &credentials);

        assert_eq!(first, second);
        assert_eq!(coordinator.browser().submissions(), 3);
    }

    #[test]
    fn http_run_reads_station_and_reuses_session() {
        let station = LocalStation::start("pw");
        let mut fx = fixture();
        fx.settings.endpoint = Endpoint {
            prefix: "http://".to_string(),
            suffix: String::new(),
        };
        let sites = vec![Site::new(station.host(), FrequencyGroup::Mhz25)];
        let credentials = Credentials::for_tests("op", &[(station.host().as_str(), "pw")]);

        for _ in 0..2 {
            let mut coordinator = RunCoordinator::new(HttpBrowser::new(), &fx.settings, &fx.store);
            let results = coordinator.run(&sites, &credentials);
            assert_eq!(results.len(), 1);
            assert_eq!(
                (results[0].internal_free, results[0].external_free),
                (Some(48), Some(38))
            );
        }
        assert_eq!(station.posts(), 1);
    }
}
