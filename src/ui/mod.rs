//! The navigation shell and its pages.

pub mod app;
pub mod filters;
pub mod map_page;
pub mod participants_page;
pub mod style;

use lru::LruCache;

use crate::filter::History;
use crate::map::{MapTile, TileKey};

pub use app::HistMapApp;
pub use map_page::MapPage;
pub use participants_page::ParticipantsPage;

/// What the shell lends a page for one frame.
pub struct PageContext<'a> {
    pub history: &'a mut History,
    pub tile_cache: &'a mut LruCache<TileKey, MapTile>,
    pub missing_tiles: &'a mut Vec<TileKey>,
    pub attribution: &'a str,
}

/// Which page a path shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    WorldMap,
    LocalMap,
    Participants,
    NotFound,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "" => Route::WorldMap,
            "/local" => Route::LocalMap,
            "/participants" => Route::Participants,
            _ => Route::NotFound,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::WorldMap => "/",
            Route::LocalMap => "/local",
            Route::Participants => "/participants",
            Route::NotFound => "/404",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::WorldMap => "Мировая карта",
            Route::LocalMap => "Локальная карта",
            Route::Participants => "Участники",
            Route::NotFound => "Не найдено",
        }
    }
}
