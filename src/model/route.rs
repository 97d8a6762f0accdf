use serde::{Deserialize, Serialize};

use super::{LatLng, ParticipantId, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RouteId(pub i64);

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    #[serde(default)]
    pub path: Vec<LatLng>,
    pub transport: Transport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub is_global: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_participant_id: Option<ParticipantId>,
}

impl Route {
    /// A polyline needs at least two points to be drawn.
    pub fn is_drawable(&self) -> bool {
        self.path.len() >= 2 && self.path.iter().all(LatLng::is_finite)
    }

    /// Country with surrounding whitespace removed; blank counts as absent.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}
