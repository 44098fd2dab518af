// src/records/mod.rs
// =============================================================================
// Company records and the JSON directory they live in.
//
// Submodules:
// - site: the SiteRecord document itself
// - store: loading and saving records from a directory
// =============================================================================

mod site;
mod store;

pub use site::SiteRecord;
pub use store::{JsonDirStore, RecordStore};
