//! Wire types served by the history API.

pub mod participant;
pub mod poi;
pub mod route;
pub mod transport;

use serde::{Deserialize, Serialize};

pub use participant::{Participant, ParticipantDescription, ParticipantId};
pub use poi::{Poi, PoiId, PoiKind, PoiPhoto};
pub use route::{Route, RouteId};
pub use transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Initial viewport of the map pages, fetched alongside routes and POIs.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: f32,
}

impl MapConfig {
    pub fn center(&self) -> LatLng {
        LatLng::new(self.center_lat, self.center_lng)
    }
}

/// Which of the two map pages is showing. Routes carry the matching
/// `is_global` flag and are served by different endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    Global,
    Local,
}

impl ViewMode {
    pub fn is_global(self) -> bool {
        matches!(self, ViewMode::Global)
    }

    pub fn routes_endpoint(self) -> &'static str {
        match self {
            ViewMode::Global => "/api/world-routes",
            ViewMode::Local => "/api/local-routes",
        }
    }
}
