//! Filter selections and their encoding in the location's query string.

pub mod history;
pub mod state;
pub mod store;

pub use history::{History, Location};
pub use state::{Change, FilterPatch, FilterState};
pub use store::{FilterScope, FilterStore};

/// Canonical form for comparing user-visible strings: trimmed, lower-case.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
