//! Filter controls shared by the pages. Each returns the new value only
//! when the user changed it.

use std::collections::BTreeSet;

use egui::{ComboBox, Ui};

use crate::derive::{Legend, LegendRow};
use crate::model::{PoiKind, Transport};

const ALL_LABEL: &str = "Все";

pub fn country_checkboxes(
    ui: &mut Ui,
    options: &BTreeSet<String>,
    selected: &BTreeSet<String>,
) -> Option<BTreeSet<String>> {
    let mut next = selected.clone();
    for country in options.union(selected) {
        let mut checked = selected.contains(country);
        if ui.checkbox(&mut checked, country.as_str()).changed() {
            if checked {
                next.insert(country.clone());
            } else {
                next.remove(country);
            }
        }
    }
    (&next != selected).then_some(next)
}

/// Single-choice selector over `options`, with an "all" entry meaning no
/// filter.
pub fn choice_combo<T: Clone + PartialEq>(
    ui: &mut Ui,
    id_salt: &str,
    options: &[(T, String)],
    current: Option<T>,
) -> Option<Option<T>> {
    let mut value = current.clone();
    let selected_text = value
        .as_ref()
        .and_then(|v| options.iter().find(|(o, _)| o == v))
        .map_or(ALL_LABEL, |(_, label)| label.as_str())
        .to_string();
    ComboBox::from_id_salt(id_salt)
        .selected_text(selected_text)
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut value, None, ALL_LABEL);
            for (option, label) in options {
                ui.selectable_value(&mut value, Some(option.clone()), label.as_str());
            }
        });
    (value != current).then_some(value)
}

pub fn transport_combo(ui: &mut Ui, current: Option<Transport>) -> Option<Option<Transport>> {
    let options: Vec<(Transport, String)> =
        Transport::ALL.iter().map(|t| (*t, t.label().to_string())).collect();
    choice_combo(ui, "transport_filter", &options, current)
}

pub fn poi_type_combo(ui: &mut Ui, current: Option<PoiKind>) -> Option<Option<PoiKind>> {
    let options: Vec<(PoiKind, String)> =
        PoiKind::ALL.iter().map(|k| (*k, k.label().to_string())).collect();
    choice_combo(ui, "poi_type_filter", &options, current)
}

pub fn string_combo(
    ui: &mut Ui,
    id_salt: &str,
    options: &BTreeSet<String>,
    current: Option<&str>,
) -> Option<Option<String>> {
    let mut options: Vec<(String, String)> = options.iter().map(|o| (o.clone(), o.clone())).collect();
    if let Some(current) = current.filter(|c| !options.iter().any(|(o, _)| o == c)) {
        options.push((current.to_string(), current.to_string()));
    }
    choice_combo(ui, id_salt, &options, current.map(str::to_string))
}

pub fn legend(ui: &mut Ui, legend: &Legend) {
    for row in legend.rows() {
        match row {
            LegendRow::Entry(entry) => {
                ui.horizontal(|ui| {
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(18.0, 4.0), egui::Sense::hover());
                    ui.painter().rect_filled(rect, 1.0, entry.color);
                    ui.label(&entry.label);
                });
            }
            LegendRow::Separator => {
                ui.separator();
            }
            LegendRow::Placeholder(text) => {
                ui.weak(text);
            }
        }
    }
}
