//! The map widget: raster tiles with the overlay canvas painted on top.

pub mod canvas;
pub mod cluster;
pub mod map;
pub mod map_tile;
pub mod projection;

/// Opaque id of one drawing object on a [`canvas::MapCanvas`].
pub type LayerId = u64;

pub use canvas::MapCanvas;
pub use map::Map;
pub use map_tile::{MapTile, TileKey};
