use std::collections::BTreeSet;

use egui::{Color32, RichText};
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::watch;

use super::{filters, PageContext};
use crate::derive::{derive, DerivedView};
use crate::fetch::{MapData, MapDataSource, Repaint, Snapshot};
use crate::filter::{FilterPatch, FilterScope, FilterState, FilterStore};
use crate::map::{Map, MapCanvas};
use crate::maps_api::MapApi;
use crate::model::{LatLng, ViewMode};
use crate::overlay::OverlayReconciler;

/// Shown until the first map config arrives.
const INITIAL_CENTER: LatLng = LatLng { lat: 44.4675, lng: 34.1433 };

/// World or local map: filter panel, legend and the overlay canvas.
pub struct MapPage<A: MapApi> {
    mode: ViewMode,
    store: FilterStore,
    changes: watch::Receiver<FilterState>,
    source: MapDataSource<A>,
    reconciler: OverlayReconciler<MapCanvas>,
    data: Option<MapData>,
    error: Option<String>,
    view: DerivedView,
    seen_countries: BTreeSet<String>,
}

impl<A: MapApi> MapPage<A> {
    pub fn mount(
        mode: ViewMode,
        ctx: &mut PageContext<'_>,
        api: A,
        handle: Handle,
        repaint: Repaint,
        cluster_radius: Option<f32>,
    ) -> Self {
        let store = FilterStore::mount(ctx.history, FilterScope::Map);
        let changes = store.subscribe();
        let mut source = MapDataSource::new(api, mode, handle).with_repaint(repaint);
        source.load(&store.current());

        let zoom = if mode.is_global() { 3.0 } else { 9.0 };
        let canvas = MapCanvas::new(INITIAL_CENTER, zoom, cluster_radius);
        info!("mounted {mode:?} map at {}", ctx.history.current());

        Self {
            mode,
            store,
            changes,
            source,
            reconciler: OverlayReconciler::new(canvas),
            data: None,
            error: None,
            view: DerivedView::empty(),
            seen_countries: BTreeSet::new(),
        }
    }

    pub fn ui(&mut self, egui_ctx: &egui::Context, ctx: &mut PageContext<'_>) {
        if let Some(snapshot) = self.source.poll() {
            self.apply(snapshot);
        }

        egui::SidePanel::left(egui::Id::new(("map_filters", self.mode.is_global())))
            .resizable(false)
            .default_width(240.0)
            .show(egui_ctx, |ui| self.side_panel(ui, ctx));

        if self.changes.has_changed().unwrap_or(false) {
            let filter = self.changes.borrow_and_update().clone();
            self.source.load(&filter);
            self.rederive();
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(egui_ctx, |ui| {
                if let Some(message) = self.error.clone() {
                    self.error_banner(ui, &message);
                }
                let map = Map::new(
                    ("map", self.mode.is_global()),
                    ctx.tile_cache,
                    self.reconciler.widget_mut(),
                    ctx.missing_tiles,
                )
                .attribution(ctx.attribution);
                ui.add(map);
            });
    }

    fn side_panel(&mut self, ui: &mut egui::Ui, ctx: &mut PageContext<'_>) {
        let filter = self.store.current();

        ui.horizontal(|ui| {
            ui.heading("Фильтры");
            if self.source.is_loading() {
                ui.spinner();
            }
        });
        ui.separator();

        ui.label("Страна");
        if let Some(countries) = filters::country_checkboxes(ui, &self.seen_countries, filter.countries()) {
            self.store.update(FilterPatch::countries(countries), ctx.history);
        }

        ui.add_space(6.0);
        ui.label("Транспорт");
        if let Some(transport) = filters::transport_combo(ui, filter.transport()) {
            self.store.update(FilterPatch::transport(transport), ctx.history);
        }

        ui.add_space(6.0);
        ui.label("Тип объекта");
        if let Some(kind) = filters::poi_type_combo(ui, filter.poi_type()) {
            self.store.update(FilterPatch::poi_type(kind), ctx.history);
        }

        if !filter.is_empty() && ui.button("Сбросить").clicked() {
            self.store.update(FilterPatch::reset(), ctx.history);
        }

        ui.add_space(12.0);
        ui.heading("Легенда");
        ui.separator();
        filters::legend(ui, &self.view.legend);

        ui.add_space(12.0);
        ui.weak(format!(
            "Маршрутов: {}, объектов: {}",
            self.view.visible_routes.len(),
            self.view.visible_pois.len()
        ));
    }

    fn error_banner(&mut self, ui: &mut egui::Ui, message: &str) {
        egui::Frame::none()
            .fill(Color32::from_rgb(127, 29, 29))
            .inner_margin(egui::Margin::same(6.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(format!("Ошибка загрузки: {message}")).color(Color32::WHITE));
                    if ui.button("Повторить").clicked() {
                        self.source.load(&self.store.current());
                    }
                });
            });
    }

    /// Takes a finished load: recenter and rebuild the overlays on
    /// success, clear them and keep the message on failure.
    fn apply(&mut self, snapshot: Snapshot<MapData>) {
        match snapshot {
            Ok(data) => {
                self.error = None;
                self.seen_countries
                    .extend(data.routes.iter().filter_map(|r| r.country()).map(str::to_string));
                self.reconciler.recenter(&data.config);
                self.data = Some(data);
                self.rederive();
            }
            Err(e) => {
                warn!("map load failed: {e}");
                self.error = Some(e.to_string());
                self.data = None;
                self.view = DerivedView::empty();
                self.reconciler.reconcile(&self.view);
            }
        }
    }

    fn rederive(&mut self) {
        let Some(data) = &self.data else {
            return;
        };
        let filter = self.store.current();
        self.view = derive(&data.routes, &data.pois, &filter, self.mode);
        let stats = self.reconciler.reconcile(&self.view);
        debug!("{:?} map rederived: {stats:?}", self.mode);
    }

    pub fn teardown(&mut self) {
        self.source.teardown();
        self.reconciler.teardown();
    }
}
