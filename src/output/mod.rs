mod chart;
mod format;
mod json;
mod stamp;
mod table;

pub(crate) use chart::render;
pub(crate) use json::output_summary_json;
pub(crate) use stamp::{ReportStamp, ReportZone};
pub(crate) use table::print_summary_table;
