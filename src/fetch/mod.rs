//! Concurrent loading with a staleness guard: only the result of the most
//! recently issued load is ever handed back to a page.

pub mod loader;
pub mod sources;

pub use loader::{Generation, Loader, Repaint};
pub use sources::{MapData, MapDataSource, ParticipantDetail, ParticipantSource, Snapshot};
