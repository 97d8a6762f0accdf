use std::collections::BTreeSet;

use log::warn;
use url::form_urlencoded;

use super::normalize;
use crate::model::{PoiKind, Transport};

pub const COUNTRY_KEY: &str = "country";
pub const TRANSPORT_KEY: &str = "transport";
pub const POI_TYPE_KEY: &str = "poiType";
pub const ROLE_KEY: &str = "role";

/// One immutable snapshot of the user's filter selections.
///
/// Blank values are never stored, so every state survives a trip through
/// [`FilterState::to_query`] and [`FilterState::from_query`] unchanged. An
/// empty country set means "any country".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    countries: BTreeSet<String>,
    transport: Option<Transport>,
    poi_type: Option<PoiKind>,
    role: Option<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_country(mut self, country: impl AsRef<str>) -> Self {
        if let Some(c) = non_blank(country.as_ref()) {
            self.countries.insert(c);
        }
        self
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.countries = countries.into_iter().filter_map(|c| non_blank(c.as_ref())).collect();
        self
    }

    pub fn with_transport(mut self, transport: Option<Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_poi_type(mut self, poi_type: Option<PoiKind>) -> Self {
        self.poi_type = poi_type;
        self
    }

    pub fn with_role(mut self, role: Option<&str>) -> Self {
        self.role = role.and_then(non_blank);
        self
    }

    pub fn countries(&self) -> &BTreeSet<String> {
        &self.countries
    }

    pub fn transport(&self) -> Option<Transport> {
        self.transport
    }

    pub fn poi_type(&self) -> Option<PoiKind> {
        self.poi_type
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// True when no country filter is set or `country` is one of the
    /// selected countries after normalization.
    pub fn admits_country(&self, country: Option<&str>) -> bool {
        if self.countries.is_empty() {
            return true;
        }
        match country {
            Some(c) => {
                let wanted = normalize(c);
                self.countries.iter().any(|s| normalize(s) == wanted)
            }
            None => false,
        }
    }

    pub fn admits_transport(&self, transport: Transport) -> bool {
        self.transport.map_or(true, |t| t == transport)
    }

    pub fn admits_poi_kind(&self, kind: PoiKind) -> bool {
        self.poi_type.map_or(true, |k| k == kind)
    }

    /// Applies `patch` on top of this snapshot and returns the new one.
    pub fn merge(&self, patch: &FilterPatch) -> FilterState {
        let mut next = self.clone();
        match &patch.countries {
            Change::Keep => {}
            Change::Set(set) => next = next.with_countries(set),
            Change::Clear => next.countries.clear(),
        }
        next.transport = patch.transport.apply(self.transport);
        next.poi_type = patch.poi_type.apply(self.poi_type);
        match &patch.role {
            Change::Keep => {}
            Change::Set(r) => next = next.with_role(Some(r.as_str())),
            Change::Clear => next.role = None,
        }
        next
    }

    /// Query string with stable key order and one `country` pair per
    /// selected country. Absent fields are omitted entirely.
    pub fn to_query(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        for c in &self.countries {
            out.append_pair(COUNTRY_KEY, c);
        }
        if let Some(t) = self.transport {
            out.append_pair(TRANSPORT_KEY, t.as_str());
        }
        if let Some(k) = self.poi_type {
            out.append_pair(POI_TYPE_KEY, k.as_str());
        }
        if let Some(r) = &self.role {
            out.append_pair(ROLE_KEY, r);
        }
        out.finish()
    }

    /// Inverse of [`FilterState::to_query`]. Unknown keys are ignored and
    /// unparseable enum values are dropped with a warning; for single-valued
    /// keys the first occurrence wins.
    pub fn from_query(query: &str) -> FilterState {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut state = FilterState::default();
        let mut seen_transport = false;
        let mut seen_poi_type = false;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                COUNTRY_KEY => state = state.with_country(&value),
                TRANSPORT_KEY if !seen_transport && !value.trim().is_empty() => {
                    seen_transport = true;
                    match value.parse() {
                        Ok(t) => state.transport = Some(t),
                        Err(e) => warn!("ignoring {TRANSPORT_KEY} in location: {e}"),
                    }
                }
                POI_TYPE_KEY if !seen_poi_type && !value.trim().is_empty() => {
                    seen_poi_type = true;
                    match value.trim().parse() {
                        Ok(k) => state.poi_type = Some(k),
                        Err(e) => warn!("ignoring {POI_TYPE_KEY} in location: {e}"),
                    }
                }
                ROLE_KEY if state.role.is_none() => state = state.with_role(Some(&*value)),
                _ => {}
            }
        }
        state
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Edit to one field of a [`FilterState`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Change<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

impl<T> Change<T> {
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Change::Clear, Change::Set)
    }
}

impl<T: Copy> Change<T> {
    fn apply(&self, current: Option<T>) -> Option<T> {
        match self {
            Change::Keep => current,
            Change::Set(v) => Some(*v),
            Change::Clear => None,
        }
    }
}

/// A partial update merged into the current snapshot by the filter store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterPatch {
    pub countries: Change<BTreeSet<String>>,
    pub transport: Change<Transport>,
    pub poi_type: Change<PoiKind>,
    pub role: Change<String>,
}

impl FilterPatch {
    pub fn countries<I, S>(countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = countries.into_iter().map(Into::into).collect();
        let countries = if set.is_empty() { Change::Clear } else { Change::Set(set) };
        Self { countries, ..Self::default() }
    }

    pub fn transport(transport: Option<Transport>) -> Self {
        Self { transport: Change::from_option(transport), ..Self::default() }
    }

    pub fn poi_type(poi_type: Option<PoiKind>) -> Self {
        Self { poi_type: Change::from_option(poi_type), ..Self::default() }
    }

    pub fn role(role: Option<String>) -> Self {
        Self { role: Change::from_option(role), ..Self::default() }
    }

    /// Clears every field.
    pub fn reset() -> Self {
        Self {
            countries: Change::Clear,
            transport: Change::Clear,
            poi_type: Change::Clear,
            role: Change::Clear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn samples() -> Vec<FilterState> {
        vec![
            FilterState::new(),
            FilterState::new().with_country("США"),
            FilterState::new()
                .with_countries(["СССР", "Великобритания", "США"])
                .with_transport(Some(Transport::Rail))
                .with_poi_type(Some(PoiKind::Event)),
            FilterState::new().with_role(Some("Премьер-министр & советник")),
            FilterState::new()
                .with_country("a+b = c?")
                .with_country("100%")
                .with_role(Some("x|y"))
                .with_transport(Some(Transport::Road)),
        ]
    }

    fn state_strategy() -> impl Strategy<Value = FilterState> {
        (
            prop::collection::vec("\\PC{0,16}", 0..5),
            prop::option::of(prop::sample::select(Transport::ALL.to_vec())),
            prop::option::of(prop::sample::select(PoiKind::ALL.to_vec())),
            prop::option::of("\\PC{0,24}"),
        )
            .prop_map(|(countries, transport, poi_type, role)| {
                FilterState::new()
                    .with_countries(countries)
                    .with_transport(transport)
                    .with_poi_type(poi_type)
                    .with_role(role.as_deref())
            })
    }

    #[test]
    fn fixed_samples_round_trip() {
        for state in samples() {
            let query = state.to_query();
            assert_eq!(FilterState::from_query(&query), state, "query was {query}");
        }
    }

    proptest! {
        #[test]
        fn query_round_trip_is_lossless(state in state_strategy()) {
            let query = state.to_query();
            let back = FilterState::from_query(&query);
            prop_assert_eq!(&back, &state, "query was {}", query);
            prop_assert_eq!(back.to_query(), query);
        }
    }

    #[test]
    fn absent_fields_are_omitted_and_countries_repeat() {
        assert_eq!(FilterState::new().to_query(), "");
        let state = FilterState::new().with_countries(["b", "a"]).with_transport(Some(Transport::Air));
        assert_eq!(state.to_query(), "country=a&country=b&transport=air");
    }

    #[test]
    fn blank_values_never_enter_the_state() {
        let state = FilterState::from_query("?country=&country=%20&role=&transport=");
        assert!(state.is_empty());
        assert!(FilterState::new().with_role(Some("   ")).is_empty());
    }

    #[test]
    fn unknown_values_are_ignored() {
        let state = FilterState::from_query("transport=teleport&poiType=castle&zoom=3&country=США");
        assert_eq!(state, FilterState::new().with_country("США"));
    }

    #[test]
    fn transport_in_location_is_normalized() {
        let state = FilterState::from_query("transport=%20Rail%20");
        assert_eq!(state.transport(), Some(Transport::Rail));
    }

    #[test]
    fn country_matching_is_normalized() {
        let state = FilterState::new().with_country("США");
        assert!(state.admits_country(Some("  сша ")));
        assert!(!state.admits_country(Some("СССР")));
        assert!(!state.admits_country(None));
        assert!(FilterState::new().admits_country(None));
    }

    #[test]
    fn merge_keeps_untouched_fields() {
        let base = FilterState::new().with_country("США").with_transport(Some(Transport::Air));
        let next = base.merge(&FilterPatch::poi_type(Some(PoiKind::Place)));
        assert_eq!(next.countries(), base.countries());
        assert_eq!(next.transport(), Some(Transport::Air));
        assert_eq!(next.poi_type(), Some(PoiKind::Place));

        let cleared = next.merge(&FilterPatch::transport(None));
        assert_eq!(cleared.transport(), None);
        let no_countries = cleared.merge(&FilterPatch::countries(Vec::<String>::new()));
        assert!(no_countries.countries().is_empty());
        // the original snapshot is untouched
        assert_eq!(base.transport(), Some(Transport::Air));
    }

    #[test]
    fn reset_clears_everything() {
        let state = samples().remove(2).with_role(Some("Президент"));
        assert!(state.merge(&FilterPatch::reset()).is_empty());
    }
}
