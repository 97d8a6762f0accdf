//! Route colors as an ordered rule list. The first matching rule wins; new
//! categories are added by inserting a rule at the right precedence.

use egui::Color32;

use crate::filter::normalize;
use crate::model::{Transport, ViewMode};

pub const FALLBACK: Color32 = Color32::from_rgb(0x64, 0x74, 0x8b);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    /// Country match, optionally restricted to one view mode and transport.
    Country {
        country: &'static str,
        mode: Option<ViewMode>,
        transport: Option<Transport>,
    },
    Transport(Transport),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRule {
    pub predicate: Predicate,
    pub color: Color32,
}

const fn local_automobile(country: &'static str, color: Color32) -> ColorRule {
    ColorRule {
        predicate: Predicate::Country {
            country,
            mode: Some(ViewMode::Local),
            transport: Some(Transport::Road),
        },
        color,
    }
}

const fn country(country: &'static str, color: Color32) -> ColorRule {
    ColorRule {
        predicate: Predicate::Country {
            country,
            mode: None,
            transport: None,
        },
        color,
    }
}

const fn transport(transport: Transport, color: Color32) -> ColorRule {
    ColorRule {
        predicate: Predicate::Transport(transport),
        color,
    }
}

/// Highest precedence first.
pub static RULES: &[ColorRule] = &[
    // motorcades inside the local map
    local_automobile("США", Color32::from_rgb(0x1e, 0x40, 0xaf)),
    local_automobile("Великобритания", Color32::from_rgb(0xb9, 0x1c, 0x1c)),
    local_automobile("СССР", Color32::from_rgb(0xb4, 0x53, 0x09)),
    // delegations
    country("США", Color32::from_rgb(0x3b, 0x82, 0xf6)),
    country("Великобритания", Color32::from_rgb(0xef, 0x44, 0x44)),
    country("СССР", Color32::from_rgb(0xf5, 0x9e, 0x0b)),
    country("Франция", Color32::from_rgb(0x63, 0x66, 0xf1)),
    country("Канада", Color32::from_rgb(0x0e, 0xa5, 0xe9)),
    // transport kinds
    transport(Transport::Air, Color32::from_rgb(0xef, 0x44, 0x44)),
    transport(Transport::Sea, Color32::from_rgb(0x3b, 0x82, 0xf6)),
    transport(Transport::Rail, Color32::from_rgb(0x10, 0xb9, 0x81)),
    transport(Transport::Road, Color32::from_rgb(0xf9, 0x73, 0x16)),
];

/// What a rule is evaluated against. The country is normalized once.
#[derive(Debug, Clone)]
pub struct Subject {
    country: Option<String>,
    transport: Transport,
    mode: ViewMode,
}

impl Subject {
    pub fn new(country: Option<&str>, transport: Transport, mode: ViewMode) -> Self {
        Self {
            country: country.map(normalize),
            transport,
            mode,
        }
    }
}

impl ColorRule {
    pub fn matches(&self, subject: &Subject) -> bool {
        match self.predicate {
            Predicate::Country {
                country,
                mode,
                transport,
            } => {
                mode.map_or(true, |m| m == subject.mode)
                    && transport.map_or(true, |t| t == subject.transport)
                    && subject.country.as_deref() == Some(normalize(country).as_str())
            }
            Predicate::Transport(t) => t == subject.transport,
        }
    }
}

pub fn classify(rules: &[ColorRule], subject: &Subject) -> Color32 {
    rules
        .iter()
        .find(|rule| rule.matches(subject))
        .map_or(FALLBACK, |rule| rule.color)
}

/// Color of a route with the given attributes under the default rules.
pub fn route_color(country: Option<&str>, transport: Transport, mode: ViewMode) -> Color32 {
    classify(RULES, &Subject::new(country, transport, mode))
}

/// Color of the transport-only rule, ignoring country rules.
pub fn transport_color(t: Transport) -> Color32 {
    RULES
        .iter()
        .find(|rule| rule.predicate == Predicate::Transport(t))
        .map_or(FALLBACK, |rule| rule.color)
}
