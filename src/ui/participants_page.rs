use std::collections::BTreeSet;

use egui::{Color32, RichText, ScrollArea};
use log::{info, warn};
use tokio::runtime::Handle;
use tokio::sync::watch;

use super::{filters, PageContext};
use crate::fetch::{ParticipantDetail, ParticipantSource, Repaint};
use crate::filter::{FilterPatch, FilterScope, FilterState, FilterStore};
use crate::maps_api::MapApi;
use crate::model::{Participant, ParticipantId};

/// Directory of conference participants with a detail pane.
pub struct ParticipantsPage<A: MapApi> {
    store: FilterStore,
    changes: watch::Receiver<FilterState>,
    source: ParticipantSource<A>,
    participants: Vec<Participant>,
    error: Option<String>,
    countries: BTreeSet<String>,
    roles: BTreeSet<String>,
    selected: Option<ParticipantId>,
    detail: Option<ParticipantDetail>,
    detail_error: Option<String>,
}

impl<A: MapApi> ParticipantsPage<A> {
    pub fn mount(ctx: &mut PageContext<'_>, api: A, handle: Handle, repaint: Repaint) -> Self {
        let store = FilterStore::mount(ctx.history, FilterScope::Participants);
        let changes = store.subscribe();
        let mut source = ParticipantSource::new(api, handle).with_repaint(repaint);
        source.load(&store.current());
        info!("mounted participants at {}", ctx.history.current());

        Self {
            store,
            changes,
            source,
            participants: Vec::new(),
            error: None,
            countries: BTreeSet::new(),
            roles: BTreeSet::new(),
            selected: None,
            detail: None,
            detail_error: None,
        }
    }

    pub fn ui(&mut self, egui_ctx: &egui::Context, ctx: &mut PageContext<'_>) {
        self.poll();

        egui::TopBottomPanel::top("participant_filters").show(egui_ctx, |ui| {
            ui.horizontal(|ui| self.filter_bar(ui, ctx));
        });

        if self.changes.has_changed().unwrap_or(false) {
            let filter = self.changes.borrow_and_update().clone();
            self.source.load(&filter);
        }

        egui::SidePanel::right("participant_detail")
            .default_width(380.0)
            .show(egui_ctx, |ui| self.detail_pane(ui));

        egui::CentralPanel::default().show(egui_ctx, |ui| self.list(ui));
    }

    fn poll(&mut self) {
        if let Some(snapshot) = self.source.poll() {
            match snapshot {
                Ok(participants) => {
                    self.error = None;
                    collect_options(&participants, &mut self.countries, &mut self.roles);
                    if let Some(id) = self.selected {
                        if !participants.iter().any(|p| p.id == id) {
                            self.select(None);
                        }
                    }
                    self.participants = participants;
                }
                Err(e) => {
                    warn!("participant load failed: {e}");
                    self.error = Some(e.to_string());
                    self.participants.clear();
                }
            }
        }

        if let Some(snapshot) = self.source.poll_detail() {
            match snapshot {
                Ok(detail) => {
                    self.detail_error = None;
                    self.detail = Some(detail);
                }
                Err(e) => {
                    warn!("participant detail failed: {e}");
                    self.detail_error = Some(e.to_string());
                    self.detail = None;
                }
            }
        }
    }

    fn select(&mut self, id: Option<ParticipantId>) {
        self.selected = id;
        self.detail = None;
        self.detail_error = None;
        if let Some(id) = id {
            self.source.load_detail(id);
        }
    }

    fn filter_bar(&mut self, ui: &mut egui::Ui, ctx: &mut PageContext<'_>) {
        let filter = self.store.current();

        ui.label("Страна");
        let country = filter.countries().iter().next().map(String::as_str);
        if let Some(country) = filters::string_combo(ui, "participant_country", &self.countries, country) {
            self.store.update(FilterPatch::countries(country), ctx.history);
        }

        ui.label("Роль");
        if let Some(role) = filters::string_combo(ui, "participant_role", &self.roles, filter.role()) {
            self.store.update(FilterPatch::role(role), ctx.history);
        }

        if !filter.is_empty() && ui.button("Сбросить").clicked() {
            self.store.update(FilterPatch::reset(), ctx.history);
        }
        if self.source.is_loading() {
            ui.spinner();
        }
    }

    fn list(&mut self, ui: &mut egui::Ui) {
        if let Some(message) = &self.error {
            ui.label(RichText::new(format!("Ошибка загрузки: {message}")).color(Color32::LIGHT_RED));
            return;
        }
        if self.participants.is_empty() && !self.source.is_loading() {
            ui.weak("Нет участников (фильтр)");
            return;
        }

        let mut clicked = None;
        ScrollArea::vertical().show(ui, |ui| {
            for participant in &self.participants {
                let text = format!("{} · {}", participant.name, participant.role);
                let selected = self.selected == Some(participant.id);
                if ui.selectable_label(selected, text).clicked() {
                    clicked = Some(participant.id);
                }
            }
        });
        if let Some(id) = clicked.filter(|id| self.selected != Some(*id)) {
            self.select(Some(id));
        }
    }

    fn detail_pane(&mut self, ui: &mut egui::Ui) {
        let Some(participant) = self
            .selected
            .and_then(|id| self.participants.iter().find(|p| p.id == id))
        else {
            ui.weak("Выберите участника");
            return;
        };

        ui.heading(&participant.name);
        ui.label(&participant.role);
        ui.weak(&participant.country);
        ui.separator();

        let description = participant.decoded_description();
        if let Some(url) = &description.image_url {
            ui.hyperlink_to("Портрет", url);
        }
        if !description.text.is_empty() {
            ui.label(&description.text);
        }

        ui.add_space(8.0);
        if let Some(message) = &self.detail_error {
            ui.label(RichText::new(message).color(Color32::LIGHT_RED));
            return;
        }
        let Some(detail) = self.detail.as_ref().filter(|d| d.id == participant.id) else {
            if self.source.is_loading_detail() {
                ui.spinner();
            }
            return;
        };

        ui.strong(format!("Маршруты ({})", detail.routes.len()));
        for route in &detail.routes {
            ui.label(format!("{} · {}", route.name, route.transport.label()));
        }
        ui.add_space(6.0);
        ui.strong(format!("Объекты ({})", detail.pois.len()));
        for poi in &detail.pois {
            ui.label(format!("{} ({})", poi.name, poi.kind.label()));
        }
    }

    pub fn teardown(&mut self) {
        self.source.teardown();
    }
}

/// Selector options grow as lists arrive, sorted and distinct.
fn collect_options(participants: &[Participant], countries: &mut BTreeSet<String>, roles: &mut BTreeSet<String>) {
    for participant in participants {
        let country = participant.country.trim();
        if !country.is_empty() {
            countries.insert(country.to_string());
        }
        let role = participant.role.trim();
        if !role.is_empty() {
            roles.insert(role.to_string());
        }
    }
}
