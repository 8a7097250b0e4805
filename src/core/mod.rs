//! Core module - shared types and run logic independent of the browser engine

mod cache;
mod coordinator;
mod percent;
mod types;

pub(crate) use cache::{SessionStore, default_session_dir};
pub(crate) use coordinator::RunCoordinator;
pub(crate) use percent::parse_free_percentage;
pub(crate) use types::{FrequencyGroup, RunResult, Site, StorageReading, default_sites};
