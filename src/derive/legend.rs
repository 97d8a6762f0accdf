use egui::Color32;

use super::palette::{route_color, transport_color};
use super::StyledRoute;
use crate::filter::{normalize, FilterState};
use crate::model::{Transport, ViewMode};

pub const NO_ROUTES_LABEL: &str = "Нет маршрутов (фильтр)";

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub key: String,
    pub color: Color32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegendRow {
    Entry(LegendEntry),
    Separator,
    Placeholder(&'static str),
}

/// Legend of the visible routes: a countries section, then a transports
/// section. Both keep first-seen order over the visible route list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Legend {
    pub countries: Vec<LegendEntry>,
    pub transports: Vec<LegendEntry>,
}

impl Legend {
    pub fn build(routes: &[StyledRoute], filter: &FilterState, mode: ViewMode) -> Legend {
        let countries = match filter.transport() {
            Some(_) => country_transport_rows(routes, mode),
            None => country_rows(routes, mode),
        };
        // a single-transport filter makes a transport key redundant
        let transports = match filter.transport() {
            Some(_) => Vec::new(),
            None => transport_rows(routes, mode),
        };
        Legend { countries, transports }
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.transports.is_empty()
    }

    /// Flattened rows for display.
    pub fn rows(&self) -> Vec<LegendRow> {
        if self.is_empty() {
            return vec![LegendRow::Placeholder(NO_ROUTES_LABEL)];
        }
        let mut rows: Vec<LegendRow> = self.countries.iter().cloned().map(LegendRow::Entry).collect();
        if !self.countries.is_empty() && !self.transports.is_empty() {
            rows.push(LegendRow::Separator);
        }
        rows.extend(self.transports.iter().cloned().map(LegendRow::Entry));
        rows
    }
}

/// One row per distinct (country, transport) pair.
fn country_transport_rows(routes: &[StyledRoute], mode: ViewMode) -> Vec<LegendEntry> {
    let mut rows: Vec<LegendEntry> = Vec::new();
    for route in routes {
        let Some(country) = route.country.as_deref() else {
            continue;
        };
        let key = format!("country:{}:{}", normalize(country), route.transport);
        if rows.iter().any(|r| r.key == key) {
            continue;
        }
        rows.push(LegendEntry {
            key,
            color: route_color(Some(country), route.transport, mode),
            label: format!("{country} ({})", route.transport.label()),
        });
    }
    rows
}

/// One row per distinct country. In the local view a country with any
/// motorcade is shown with its automobile color and label; otherwise the
/// first transport seen for that country decides the color.
fn country_rows(routes: &[StyledRoute], mode: ViewMode) -> Vec<LegendEntry> {
    let mut seen: Vec<(String, &str, Transport)> = Vec::new();
    for route in routes {
        let Some(country) = route.country.as_deref() else {
            continue;
        };
        let norm = normalize(country);
        if !seen.iter().any(|(n, _, _)| *n == norm) {
            seen.push((norm, country, route.transport));
        }
    }

    seen.into_iter()
        .map(|(norm, country, first_transport)| {
            let has_motorcade = mode == ViewMode::Local
                && routes.iter().any(|r| {
                    r.transport == Transport::Road && r.country.as_deref().map(normalize).as_deref() == Some(norm.as_str())
                });
            let (color, label) = if has_motorcade {
                (
                    route_color(Some(country), Transport::Road, mode),
                    format!("{country} ({})", Transport::Road.label()),
                )
            } else {
                (route_color(Some(country), first_transport, mode), country.to_string())
            };
            LegendEntry {
                key: format!("country:{norm}"),
                color,
                label,
            }
        })
        .collect()
}

/// One row per distinct transport. Motorcades are already covered by the
/// country rows of the local view.
fn transport_rows(routes: &[StyledRoute], mode: ViewMode) -> Vec<LegendEntry> {
    let mut seen: Vec<Transport> = Vec::new();
    for route in routes {
        if mode == ViewMode::Local && route.transport == Transport::Road {
            continue;
        }
        if !seen.contains(&route.transport) {
            seen.push(route.transport);
        }
    }
    seen.into_iter()
        .map(|t| LegendEntry {
            key: format!("transport:{t}"),
            color: transport_color(t),
            label: t.label().to_string(),
        })
        .collect()
}
