//! Per-station workflow: log into the console, then read its storage notices

mod extract;
mod session;

pub(crate) use extract::StorageExtractor;
pub(crate) use session::{SessionOutcome, SiteSession};
