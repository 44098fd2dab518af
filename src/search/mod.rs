// src/search/mod.rs
// =============================================================================
// Website discovery through a search engine.
//
// Submodules:
// - backoff: the 429 coordination shared by all workers
// - client: one rate-limit-aware search query
// - batch: the worker pool that fills in missing websites
// =============================================================================

mod backoff;
mod batch;
mod client;

pub use batch::find_websites;
pub use client::{SearchClient, SearchSettings};
