//! Chart geometry in data units, independent of the raster backend

use crate::core::{FrequencyGroup, StorageReading};

/// Height of one site's pair of bars
pub(crate) const GROUP_HEIGHT: f64 = 0.8;
pub(crate) const REGULAR_GAP: f64 = 0.5;
/// Added on top of [`REGULAR_GAP`] where the frequency group changes
pub(crate) const EXTRA_GROUP_GAP: f64 = 1.0;

/// Colour class of a free-space percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    Safe,
    Caution,
    Warning,
    Critical,
}

impl Severity {
    pub(crate) fn from_percent(free: u8) -> Self {
        match free {
            50.. => Severity::Safe,
            35.. => Severity::Caution,
            20.. => Severity::Warning,
            _ => Severity::Critical,
        }
    }

    pub(crate) fn rgb(self) -> [u8; 3] {
        match self {
            Severity::Safe => [0, 128, 0],
            Severity::Caution => [255, 255, 0],
            Severity::Warning => [255, 165, 0],
            Severity::Critical => [255, 0, 0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Volume {
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Bar {
    pub(crate) volume: Volume,
    pub(crate) value: u8,
    /// Bottom edge
    pub(crate) y: f64,
    pub(crate) severity: Severity,
}

impl Bar {
    pub(crate) const HEIGHT: f64 = GROUP_HEIGHT / 2.0;

    pub(crate) fn hatched(&self) -> bool {
        self.volume == Volume::External
    }

    pub(crate) fn center_y(&self) -> f64 {
        self.y + Self::HEIGHT / 2.0
    }

    pub(crate) fn label(&self) -> String {
        format!("{}%", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Row {
    pub(crate) site: String,
    /// Bottom edge of the row
    pub(crate) y: f64,
    pub(crate) bars: Vec<Bar>,
}

impl Row {
    /// Where the site's tick label sits
    pub(crate) fn tick_y(&self) -> f64 {
        self.y + GROUP_HEIGHT / 2.0
    }
}

/// Rows bottom to top. Input order is top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChartLayout {
    pub(crate) rows: Vec<Row>,
    pub(crate) y_min: f64,
    pub(crate) y_max: f64,
}

fn bar(volume: Volume, value: Option<u8>, y: f64) -> Option<Bar> {
    value.map(|value| Bar {
        volume,
        value,
        y,
        severity: Severity::from_percent(value),
    })
}

pub(crate) fn layout(results: &[StorageReading]) -> ChartLayout {
    let mut rows = Vec::with_capacity(results.len());
    let mut current_y = 0.0;
    let mut previous: Option<FrequencyGroup> = None;

    for reading in results.iter().rev() {
        if previous.is_some_and(|group| group != reading.group) {
            current_y += EXTRA_GROUP_GAP;
        }
        let bars = [
            bar(Volume::Internal, reading.internal_free, current_y),
            bar(Volume::External, reading.external_free, current_y + Bar::HEIGHT),
        ]
        .into_iter()
        .flatten()
        .collect();
        rows.push(Row {
            site: reading.site.clone(),
            y: current_y,
            bars,
        });
        current_y += GROUP_HEIGHT + REGULAR_GAP;
        previous = Some(reading.group);
    }

    let top = rows.last().map_or(GROUP_HEIGHT, |row| row.y + GROUP_HEIGHT);
    ChartLayout {
        rows,
        y_min: -REGULAR_GAP,
        y_max: top + REGULAR_GAP,
    }
}
