//! Pure derivation from fetched entities and the filter snapshot to what
//! the map shows: visible routes and POIs with their display attributes,
//! and the legend.

pub mod legend;
pub mod palette;

use egui::Color32;
use log::debug;

use crate::filter::FilterState;
use crate::model::{LatLng, Poi, PoiId, PoiKind, Route, RouteId, Transport, ViewMode};

pub use legend::{Legend, LegendEntry, LegendRow};

/// Text shown when an overlay is clicked.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledRoute {
    pub id: RouteId,
    pub path: Vec<LatLng>,
    pub color: Color32,
    pub transport: Transport,
    pub country: Option<String>,
    pub popup: Popup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledPoi {
    pub id: PoiId,
    pub position: LatLng,
    pub kind: PoiKind,
    pub popup: Popup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView {
    pub visible_routes: Vec<StyledRoute>,
    pub visible_pois: Vec<StyledPoi>,
    pub legend: Legend,
}

impl DerivedView {
    /// Nothing visible; used to clear the map when a load fails.
    pub fn empty() -> Self {
        Self {
            visible_routes: Vec::new(),
            visible_pois: Vec::new(),
            legend: Legend::default(),
        }
    }
}

pub fn route_visible(route: &Route, filter: &FilterState, mode: ViewMode) -> bool {
    route.is_global == mode.is_global()
        && filter.admits_country(route.country())
        && filter.admits_transport(route.transport)
}

pub fn poi_visible(poi: &Poi, filter: &FilterState) -> bool {
    filter.admits_poi_kind(poi.kind)
}

pub fn derive(routes: &[Route], pois: &[Poi], filter: &FilterState, mode: ViewMode) -> DerivedView {
    let visible_routes: Vec<StyledRoute> = routes
        .iter()
        .filter(|r| route_visible(r, filter, mode))
        .filter(|r| {
            let drawable = r.is_drawable();
            if !drawable {
                debug!("route {:?} has no drawable path, skipped", r.id);
            }
            drawable
        })
        .map(|r| style_route(r, mode))
        .collect();

    let visible_pois = pois
        .iter()
        .filter(|p| poi_visible(p, filter))
        .filter(|p| {
            let finite = p.position().is_finite();
            if !finite {
                debug!("poi {:?} has no usable coordinates, skipped", p.id);
            }
            finite
        })
        .map(style_poi)
        .collect();

    let legend = Legend::build(&visible_routes, filter, mode);

    DerivedView {
        visible_routes,
        visible_pois,
        legend,
    }
}

fn style_route(route: &Route, mode: ViewMode) -> StyledRoute {
    let country = route.country().map(str::to_string);
    let subtitle = match &country {
        Some(c) => format!("{} · {c}", route.transport.label()),
        None => route.transport.label().to_string(),
    };
    StyledRoute {
        id: route.id,
        path: route.path.clone(),
        color: palette::route_color(country.as_deref(), route.transport, mode),
        transport: route.transport,
        country,
        popup: Popup {
            title: route.name.clone(),
            lines: vec![subtitle],
            image_url: None,
        },
    }
}

fn style_poi(poi: &Poi) -> StyledPoi {
    let mut lines = Vec::new();
    if !poi.description.trim().is_empty() {
        lines.push(poi.description.trim().to_string());
    }
    if let Some(place) = poi.is_living_place.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(format!("Резиденция: {}", place.trim()));
    }
    StyledPoi {
        id: poi.id,
        position: poi.position(),
        kind: poi.kind,
        popup: Popup {
            title: poi.name.clone(),
            lines,
            image_url: poi.first_photo().map(str::to_string),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::palette::{route_color, transport_color};
    use super::*;
    use crate::model::PoiPhoto;

    fn route(id: i64, country: Option<&str>, transport: Transport, is_global: bool) -> Route {
        Route {
            id: RouteId(id),
            name: format!("route {id}"),
            path: vec![LatLng::new(44.5, 34.1), LatLng::new(44.6, 34.2)],
            transport,
            country: country.map(str::to_string),
            is_global,
            category_participant_id: None,
        }
    }

    fn poi(id: i64, kind: PoiKind) -> Poi {
        Poi {
            id: PoiId(id),
            name: format!("poi {id}"),
            lat: 44.46,
            lng: 34.14,
            description: "Место встречи".to_string(),
            kind,
            photos: vec![PoiPhoto { url: "https://img/1.jpg".to_string() }],
            is_living_place: None,
            resident_participant_id: None,
        }
    }

    fn ids(view: &DerivedView) -> Vec<i64> {
        view.visible_routes.iter().map(|r| r.id.0).collect()
    }

    fn labels(legend: &Legend) -> Vec<String> {
        legend
            .rows()
            .into_iter()
            .map(|row| match row {
                LegendRow::Entry(e) => e.label,
                LegendRow::Separator => "---".to_string(),
                LegendRow::Placeholder(p) => p.to_string(),
            })
            .collect()
    }

    #[test]
    fn single_global_route_without_filters() {
        let routes = vec![route(1, Some("США"), Transport::Air, true)];
        let view = derive(&routes, &[], &FilterState::new(), ViewMode::Global);
        assert_eq!(ids(&view), vec![1]);
        assert_eq!(view.visible_routes[0].color, Color32::from_rgb(0x3b, 0x82, 0xf6));
        assert_eq!(view.legend.countries.len(), 1);
        assert_eq!(view.legend.countries[0].label, "США");
        assert_eq!(view.legend.countries[0].color, Color32::from_rgb(0x3b, 0x82, 0xf6));
        assert_eq!(labels(&view.legend), vec!["США", "---", "Авиация"]);
    }

    #[test]
    fn local_rail_filter_yields_one_legend_row() {
        let routes = vec![
            route(1, Some("США"), Transport::Air, true),
            route(2, Some("США"), Transport::Rail, false),
        ];
        let filter = FilterState::new().with_transport(Some(Transport::Rail));
        let view = derive(&routes, &[], &filter, ViewMode::Local);
        assert_eq!(ids(&view), vec![2]);
        assert_eq!(labels(&view.legend), vec!["США (Ж/д)"]);
    }

    #[test]
    fn empty_route_set_gives_placeholder() {
        for filter in [FilterState::new(), FilterState::new().with_transport(Some(Transport::Sea))] {
            let view = derive(&[], &[], &filter, ViewMode::Global);
            assert!(view.visible_routes.is_empty());
            assert_eq!(view.legend.rows(), vec![LegendRow::Placeholder(legend::NO_ROUTES_LABEL)]);
        }
    }

    #[test]
    fn transport_filter_is_sound() {
        let countries = [Some("США"), Some("СССР"), None, Some(" великобритания ")];
        let routes: Vec<Route> = (0..64)
            .map(|i| {
                let transport = Transport::ALL[i % 4];
                route(i as i64, countries[(i / 4) % 4], transport, i % 3 != 0)
            })
            .collect();
        for mode in [ViewMode::Global, ViewMode::Local] {
            for t in Transport::ALL {
                let filter = FilterState::new().with_transport(Some(t));
                let view = derive(&routes, &[], &filter, mode);
                assert!(!view.visible_routes.is_empty());
                assert!(view.visible_routes.iter().all(|r| r.transport == t));
            }
        }
    }

    #[test]
    fn visibility_respects_view_mode_and_countries() {
        let routes = vec![
            route(1, Some("США"), Transport::Air, true),
            route(2, Some("СССР"), Transport::Rail, true),
            route(3, None, Transport::Sea, true),
            route(4, Some("сша"), Transport::Road, false),
        ];
        let filter = FilterState::new().with_country("  США");
        assert_eq!(ids(&derive(&routes, &[], &filter, ViewMode::Global)), vec![1]);
        assert_eq!(ids(&derive(&routes, &[], &filter, ViewMode::Local)), vec![4]);
        assert_eq!(ids(&derive(&routes, &[], &FilterState::new(), ViewMode::Global)), vec![1, 2, 3]);
    }

    #[test]
    fn undrawable_routes_are_skipped() {
        let mut broken = route(1, Some("США"), Transport::Air, true);
        broken.path.clear();
        let mut single = route(2, Some("США"), Transport::Air, true);
        single.path.truncate(1);
        let routes = vec![broken, single, route(3, Some("США"), Transport::Air, true)];
        let view = derive(&routes, &[], &FilterState::new(), ViewMode::Global);
        assert_eq!(ids(&view), vec![3]);
    }

    #[test]
    fn legend_sections_in_first_seen_order() {
        let routes = vec![
            route(1, Some("СССР"), Transport::Rail, true),
            route(2, Some("США"), Transport::Air, true),
            route(3, Some("ссср"), Transport::Sea, true),
            route(4, None, Transport::Sea, true),
        ];
        let view = derive(&routes, &[], &FilterState::new(), ViewMode::Global);
        assert_eq!(labels(&view.legend), vec!["СССР", "США", "---", "Ж/д", "Авиация", "Морской"]);
        assert_eq!(view.legend.transports[0].color, transport_color(Transport::Rail));
    }

    #[test]
    fn local_legend_prefers_motorcade_rows() {
        let routes = vec![
            route(1, Some("США"), Transport::Rail, false),
            route(2, Some("США"), Transport::Road, false),
            route(3, Some("Канада"), Transport::Sea, false),
        ];
        let view = derive(&routes, &[], &FilterState::new(), ViewMode::Local);
        assert_eq!(labels(&view.legend), vec!["США (Автомобиль)", "Канада", "---", "Ж/д", "Морской"]);
        assert_eq!(
            view.legend.countries[0].color,
            route_color(Some("США"), Transport::Road, ViewMode::Local)
        );
        let usa_road = view.visible_routes.iter().find(|r| r.id == RouteId(2)).unwrap();
        assert_eq!(usa_road.color, Color32::from_rgb(0x1e, 0x40, 0xaf));
    }

    #[test]
    fn transport_filter_rows_per_country_pair() {
        let routes = vec![
            route(1, Some("СССР"), Transport::Road, false),
            route(2, Some("США"), Transport::Road, false),
            route(3, Some("СССР"), Transport::Road, false),
        ];
        let filter = FilterState::new().with_transport(Some(Transport::Road));
        let view = derive(&routes, &[], &filter, ViewMode::Local);
        assert_eq!(labels(&view.legend), vec!["СССР (Автомобиль)", "США (Автомобиль)"]);
    }

    #[test]
    fn poi_type_filter_is_exact() {
        let pois = vec![poi(1, PoiKind::Place), poi(2, PoiKind::Event), poi(3, PoiKind::Place)];
        let filter = FilterState::new().with_poi_type(Some(PoiKind::Place));
        let view = derive(&[], &pois, &filter, ViewMode::Global);
        let visible: Vec<_> = view.visible_pois.iter().map(|p| p.id.0).collect();
        assert_eq!(visible, vec![1, 3]);
        assert_eq!(view.visible_pois[0].popup.image_url.as_deref(), Some("https://img/1.jpg"));

        let all = derive(&[], &pois, &FilterState::new(), ViewMode::Global);
        assert_eq!(all.visible_pois.len(), 3);
    }

    #[test]
    fn route_popup_names_transport_and_country() {
        let routes = vec![route(1, Some("США"), Transport::Sea, true)];
        let view = derive(&routes, &[], &FilterState::new(), ViewMode::Global);
        let popup = &view.visible_routes[0].popup;
        assert_eq!(popup.title, "route 1");
        assert_eq!(popup.lines, vec!["Морской · США".to_string()]);
    }
}
