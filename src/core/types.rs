//! Core data types shared by the session, extraction and output layers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transmit frequency band of a station. Only used to group chart rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum FrequencyGroup {
    #[serde(rename = "5MHz", alias = "5mhz")]
    Mhz5,
    #[serde(rename = "13MHz", alias = "13mhz")]
    Mhz13,
    #[serde(rename = "25MHz", alias = "25mhz")]
    Mhz25,
}

impl FrequencyGroup {
    pub(crate) fn label(self) -> &'static str {
        match self {
            FrequencyGroup::Mhz5 => "5MHz",
            FrequencyGroup::Mhz13 => "13MHz",
            FrequencyGroup::Mhz25 => "25MHz",
        }
    }
}

impl fmt::Display for FrequencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A configured station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Site {
    pub(crate) code: String,
    pub(crate) group: FrequencyGroup,
}

impl Site {
    pub(crate) fn new(code: impl Into<String>, group: FrequencyGroup) -> Self {
        Self {
            code: code.into(),
            group,
        }
    }
}

/// Free-space snapshot of one station. Percentages are 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct StorageReading {
    pub(crate) site: String,
    pub(crate) group: FrequencyGroup,
    pub(crate) internal_free: Option<u8>,
    pub(crate) external_free: Option<u8>,
}

impl StorageReading {
    pub(crate) fn new(site: &Site, internal_free: Option<u8>, external_free: Option<u8>) -> Self {
        Self {
            site: site.code.clone(),
            group: site.group,
            internal_free,
            external_free,
        }
    }

    /// Reading for a station that could not be reached or logged into
    pub(crate) fn unavailable(site: &Site) -> Self {
        Self::new(site, None, None)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.internal_free.is_none() && self.external_free.is_none()
    }
}

/// Readings in configured site order
pub(crate) type RunResult = Vec<StorageReading>;

/// Station roster used when the config file doesn't list sites
pub(crate) fn default_sites() -> Vec<Site> {
    const MHZ5: &[&str] = &[
        "NANT", "BLCK", "AMAG", "MRCH", "HEMP", "HOOK", "LOVE", "BRIG", "WILD",
    ];
    const MHZ25: &[&str] = &["SILD", "OLDB", "PORT", "CAPE", "CMPT", "LEWE", "HLPN"];
    const MHZ13: &[&str] = &["SEAB", "BRAD", "SPRK", "HLGT", "BRMR", "RATH", "WOOD"];

    let mut sites = Vec::with_capacity(MHZ5.len() + MHZ25.len() + MHZ13.len());
    for (codes, group) in [
        (MHZ5, FrequencyGroup::Mhz5),
        (MHZ25, FrequencyGroup::Mhz25),
        (MHZ13, FrequencyGroup::Mhz13),
    ] {
        sites.extend(codes.iter().map(|code| Site::new(*code, group)));
    }
    sites
}
