use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{LatLng, ParticipantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PoiId(pub i64);

/// POI categories. Matching against the filter is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoiKind {
    Place,
    Infrastructure,
    Event,
}

impl PoiKind {
    pub const ALL: [PoiKind; 3] = [PoiKind::Place, PoiKind::Infrastructure, PoiKind::Event];

    pub fn as_str(self) -> &'static str {
        match self {
            PoiKind::Place => "place",
            PoiKind::Infrastructure => "infrastructure",
            PoiKind::Event => "event",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PoiKind::Place => "Место",
            PoiKind::Infrastructure => "Инфраструктура",
            PoiKind::Event => "Событие",
        }
    }
}

impl fmt::Display for PoiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown POI type '{0}'")]
pub struct UnknownPoiKind(pub String);

impl FromStr for PoiKind {
    type Err = UnknownPoiKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PoiKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownPoiKind(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PoiPhoto {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Poi {
    pub id: PoiId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: PoiKind,
    #[serde(default)]
    pub photos: Vec<PoiPhoto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_living_place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resident_participant_id: Option<ParticipantId>,
}

impl Poi {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn first_photo(&self) -> Option<&str> {
        self.photos.first().map(|p| p.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_type_field_and_photos() {
        let json = r#"{
            "id": 3, "name": "Ливадийский дворец", "lat": 44.46, "lng": 34.14,
            "type": "place", "description": "Место встречи",
            "photos": [{"id": 1, "poi_id": 3, "url": "https://img/1.jpg"}, {"url": "https://img/2.jpg"}]
        }"#;
        let poi: Poi = serde_json::from_str(json).unwrap();
        assert_eq!(poi.kind, PoiKind::Place);
        assert_eq!(poi.first_photo(), Some("https://img/1.jpg"));
    }

    #[test]
    fn kind_parsing_is_exact() {
        assert_eq!("event".parse::<PoiKind>(), Ok(PoiKind::Event));
        assert!("Event".parse::<PoiKind>().is_err());
    }
}
