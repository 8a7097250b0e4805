//! Storage readings from a station's details page

use scraper::{ElementRef, Html};

use crate::browser::{Browser, page};
use crate::config::Settings;
use crate::core::{Site, parse_free_percentage};

/// A notice must mention one of these to be a free-space notice
const FREE_KEYWORDS: &[&str] = &["avail.", "available", "gb", "free", "used"];
/// ...and one of these to be about a storage volume
const STORAGE_KEYWORDS: &[&str] = &["volume", "boot", "disk", "storage", "codar"];

const NOTICE_SELECTOR: &str = r#"div[class*="notice"]"#;
const PROCESSOR_TAB_SELECTOR: &str = r#"div[class*="collapse_tab"]"#;
const PROCESSOR_MARKER: &str = "Processor";
const SECTION_CLASS: &str = "repsection";

fn is_storage_notice(text: &str) -> bool {
    let lower = text.to_lowercase();
    FREE_KEYWORDS.iter().any(|k| lower.contains(k))
        && STORAGE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Notices under the "Processor" section, used when no notice on the page
/// matches the storage keywords
fn processor_notices(doc: &Html) -> Vec<String> {
    let (Some(tabs), Some(notices)) = (
        page::selector(PROCESSOR_TAB_SELECTOR),
        page::selector(NOTICE_SELECTOR),
    ) else {
        return Vec::new();
    };
    let Some(tab) = doc
        .select(&tabs)
        .find(|el| page::element_text(*el).contains(PROCESSOR_MARKER))
    else {
        return Vec::new();
    };
    let Some(section) = tab.next_siblings().filter_map(ElementRef::wrap).find(|el| {
        el.value().name() == "div"
            && el
                .value()
                .attr("class")
                .is_some_and(|c| c.contains(SECTION_CLASS))
    }) else {
        return Vec::new();
    };
    section.select(&notices).map(page::element_text).collect()
}

/// Text of the storage notice blocks on a details page, in document order
pub(crate) fn storage_blocks(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Some(notices) = page::selector(NOTICE_SELECTOR) else {
        return Vec::new();
    };
    let blocks: Vec<String> = doc
        .select(&notices)
        .map(page::element_text)
        .filter(|text| is_storage_notice(text))
        .collect();
    if !blocks.is_empty() {
        return blocks;
    }
    processor_notices(&doc)
}

/// (internal, external) free percentages from a details page. The first
/// block is the internal volume, the second the external one.
pub(crate) fn readings_from_html(code: &str, html: &str) -> (Option<u8>, Option<u8>) {
    let blocks = storage_blocks(html);
    if blocks.is_empty() {
        tracing::debug!("[{code}] No storage notices found on details page");
        return (None, None);
    }
    for (i, block) in blocks.iter().enumerate() {
        tracing::debug!("[{code}] Storage block {}: {block}", i + 1);
    }
    let parse = |i: usize| blocks.get(i).and_then(|b| parse_free_percentage(b));
    (parse(0), parse(1))
}

pub(crate) struct StorageExtractor<'a> {
    settings: &'a Settings,
}

impl<'a> StorageExtractor<'a> {
    pub(crate) fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Load the details page in the current (authenticated) context and
    /// read its storage notices
    pub(crate) fn extract<B: Browser + ?Sized>(
        &self,
        browser: &mut B,
        site: &Site,
    ) -> (Option<u8>, Option<u8>) {
        let code = site.code.as_str();
        let url = self.settings.endpoint.details_url(code);
        if let Err(e) = browser.navigate(&url, self.settings.timeouts.details_load) {
            tracing::warn!("[{code}] Could not load details page: {e}");
            return (None, None);
        }
        let Some(html) = browser.page_source() else {
            tracing::warn!("[{code}] Details page has no content");
            return (None, None);
        };
        readings_from_html(code, html)
    }
}
