//! Report timestamps
//!
//! A run is stamped once, when its chart is rendered. The stamp names the PNG
//! to the minute and titles the figure to the second, in the operator's zone.

use chrono::{DateTime, FixedOffset, Local, Utc};
use chrono_tz::Tz;

use crate::error::AppError;

/// Zone the report stamp is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReportZone {
    /// The machine's own zone
    Local,
    /// A fixed UTC offset such as `-05:00`
    Offset(FixedOffset),
    /// An IANA zone; daylight saving follows the stamped date
    Iana(Tz),
}

fn invalid(input: &str) -> AppError {
    AppError::InvalidTimezone {
        input: input.to_string(),
    }
}

impl ReportZone {
    /// Accepts nothing or `local`, `UTC`/`Z`, a `±HH:MM` offset, or an IANA
    /// name
    pub(crate) fn from_setting(setting: Option<&str>) -> Result<Self, AppError> {
        let name = setting.map(str::trim).unwrap_or_default();
        match name.to_ascii_lowercase().as_str() {
            "" | "local" => return Ok(Self::Local),
            "utc" | "z" => return Ok(Self::Iana(chrono_tz::UTC)),
            _ => {}
        }
        if name.starts_with(['+', '-']) {
            return name
                .parse::<FixedOffset>()
                .map(Self::Offset)
                .map_err(|_| invalid(name));
        }
        name.parse::<Tz>().map(Self::Iana).map_err(|_| invalid(name))
    }

    pub(crate) fn stamp(self, at: DateTime<Utc>) -> ReportStamp {
        ReportStamp(match self {
            Self::Local => at.with_timezone(&Local).fixed_offset(),
            Self::Offset(offset) => at.with_timezone(&offset),
            Self::Iana(tz) => at.with_timezone(&tz).fixed_offset(),
        })
    }

    pub(crate) fn stamp_now(self) -> ReportStamp {
        self.stamp(Utc::now())
    }
}

/// The moment a report was produced, already in its display zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReportStamp(DateTime<FixedOffset>);

impl ReportStamp {
    /// `<prefix>_YYYYMMDD_HHMM.png`
    pub(crate) fn file_name(&self, prefix: &str) -> String {
        format!("{prefix}_{}.png", self.0.format("%Y%m%d_%H%M"))
    }

    /// `<title> as of YYYY-MM-DD HH:MM:SS`
    pub(crate) fn title(&self, title: &str) -> String {
        format!("{title} as of {}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}
