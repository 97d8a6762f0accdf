//! Query parameters sent to the API, derived from a filter snapshot. Only
//! non-empty fields relevant to the endpoint are sent.

use url::form_urlencoded;

use crate::filter::FilterState;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteQuery {
    pairs: Vec<(&'static str, String)>,
}

impl RouteQuery {
    pub fn from_filter(filter: &FilterState) -> Self {
        let mut pairs: Vec<_> = filter.countries().iter().map(|c| ("country", c.clone())).collect();
        if let Some(t) = filter.transport() {
            pairs.push(("transport", t.as_str().to_string()));
        }
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoiQuery {
    pairs: Vec<(&'static str, String)>,
}

impl PoiQuery {
    pub fn from_filter(filter: &FilterState) -> Self {
        let pairs = filter
            .poi_type()
            .map(|k| ("type", k.as_str().to_string()))
            .into_iter()
            .collect();
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParticipantQuery {
    pairs: Vec<(&'static str, String)>,
}

impl ParticipantQuery {
    pub fn from_filter(filter: &FilterState) -> Self {
        let mut pairs: Vec<_> = filter.countries().iter().map(|c| ("country", c.clone())).collect();
        if let Some(r) = filter.role() {
            pairs.push(("role", r.to_string()));
        }
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }
}

/// `application/x-www-form-urlencoded` encoding of `pairs`; empty input
/// yields an empty string.
pub fn encode(pairs: &[(&'static str, String)]) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        out.append_pair(k, v);
    }
    out.finish()
}
