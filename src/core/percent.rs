//! Free-space percentage extraction from console notice text
//!
//! Station consoles report disk usage in several inconsistent formats
//! depending on the Radial Suite release, e.g.
//! `Boot Volume has 476.47 GB available out of 1000.24 GB [48% avail.]`
//! or `Codar volume 62% used`. Rules are tried in a fixed priority order and
//! the first one that matches decides, regardless of where in the text the
//! match sits.

use regex::{Captures, Regex};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy)]
enum RuleKind {
    /// Captured number is the free percentage
    Free,
    /// Captured number is the used percentage
    Used,
    /// Captures are available and total gigabytes
    GigabyteRatio,
}

struct Rule {
    pattern: Regex,
    kind: RuleKind,
}

impl Rule {
    fn new(pattern: &str, kind: RuleKind) -> Self {
        let pattern = Regex::new(pattern).expect("percentage rule pattern is valid");
        Self { pattern, kind }
    }

    fn evaluate(&self, caps: &Captures<'_>) -> Option<u8> {
        let value = match self.kind {
            RuleKind::Free => caps[1].parse::<u64>().ok()?,
            RuleKind::Used => 100u64.checked_sub(caps[1].parse::<u64>().ok()?)?,
            RuleKind::GigabyteRatio => {
                let available: f64 = caps[1].parse().ok()?;
                let total: f64 = caps[2].parse().ok()?;
                if total <= 0.0 {
                    return None;
                }
                let ratio = (available / total * 100.0).floor();
                if !(0.0..=100.0).contains(&ratio) {
                    return None;
                }
                ratio as u64
            }
        };
        u8::try_from(value).ok().filter(|v| *v <= 100)
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(r"(?i)\[(\d+)%\s*avail\.\]", RuleKind::Free),
        Rule::new(r"(?i)(\d+)%\s*avail\.", RuleKind::Free),
        Rule::new(r"(?i)(\d+)%\s*available", RuleKind::Free),
        Rule::new(r"(?i)(\d+)%\s*free", RuleKind::Free),
        Rule::new(r"(?i)(\d+)%\s*used", RuleKind::Used),
        Rule::new(
            r"(?i)(\d+\.?\d*)\s*gb\s*available\s*out\s*of\s*(\d+\.?\d*)\s*gb",
            RuleKind::GigabyteRatio,
        ),
    ]
});

/// Extract a free-space percentage (0..=100) from a block of text.
///
/// Returns `None` when no rule matches, or when the first matching rule
/// yields a value outside 0..=100.
pub(crate) fn parse_free_percentage(text: &str) -> Option<u8> {
    if text.trim().is_empty() {
        return None;
    }
    for rule in RULES.iter() {
        if let Some(caps) = rule.pattern.captures(text) {
            return rule.evaluate(&caps);
        }
    }
    tracing::debug!(
        "Could not parse percentage from: '{}'",
        text.chars().take(100).collect::<String>()
    );
    None
}
