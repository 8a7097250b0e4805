//! PNG bar chart of free space per site

mod layout;
mod raster;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ReportSettings;
use crate::core::StorageReading;
use crate::error::RenderError;
use crate::output::ReportStamp;

pub(crate) use layout::Severity;

/// Draw `results` and write the chart into `output_dir`, creating it if
/// needed. Returns the written file.
pub(crate) fn render(
    results: &[StorageReading],
    output_dir: &Path,
    stamp: ReportStamp,
    report: &ReportSettings,
) -> Result<PathBuf, RenderError> {
    fs::create_dir_all(output_dir).map_err(|source| RenderError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let chart = layout::layout(results);
    let img = raster::draw(&chart, &stamp.title(&report.title))?;

    let path = output_dir.join(stamp.file_name(&report.file_prefix));
    img.save_with_format(&path, image::ImageFormat::Png)
        .map_err(|source| RenderError::Write {
            path: path.clone(),
            source,
        })?;
    tracing::debug!("Chart written to {}", path.display());
    Ok(path)
}
