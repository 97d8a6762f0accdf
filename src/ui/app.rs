use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui;
use log::{debug, info, warn};
use lru::LruCache;
use tokio::sync::mpsc;

use super::{style, MapPage, PageContext, ParticipantsPage, Route};
use crate::config::AppConfig;
use crate::error::{StartupError, TileError};
use crate::fetch::Repaint;
use crate::filter::{History, Location};
use crate::map::{MapTile, TileKey};
use crate::maps_api::tile_retriever::TileRetriever;
use crate::maps_api::ApiClient;
use crate::model::ViewMode;

const LOCATION_KEY: &str = "location";
const USER_AGENT: &str = concat!("histmap/", env!("CARGO_PKG_VERSION"));

type TileResult = (TileKey, Result<MapTile, TileError>);

enum Page {
    Map(MapPage<ApiClient>),
    Participants(ParticipantsPage<ApiClient>),
    NotFound,
}

impl Page {
    fn teardown(&mut self) {
        match self {
            Page::Map(page) => page.teardown(),
            Page::Participants(page) => page.teardown(),
            Page::NotFound => {}
        }
    }
}

enum NavAction {
    Back,
    Forward,
    Go(Location),
}

/// Navigation shell: address bar, history, page lifecycle and the tile
/// pipeline shared by the map pages.
pub struct HistMapApp {
    config: AppConfig,
    runtime: tokio::runtime::Runtime,
    api: ApiClient,
    history: History,
    route: Route,
    page: Page,
    address: String,
    address_editing: bool,
    attribution: String,
    tile_cache: LruCache<TileKey, MapTile>,
    tile_retriever: TileRetriever,
    pending_tiles: HashSet<TileKey>,
    tile_tx: mpsc::UnboundedSender<TileResult>,
    tile_rx: mpsc::UnboundedReceiver<TileResult>,
}

impl eframe::App for HistMapApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, LOCATION_KEY, &self.history.current().to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // F11 toggles fullscreen
        if let Some(new_fullscreen) = ctx.input(|i| {
            i.key_pressed(egui::Key::F11)
                .then(|| !i.viewport().fullscreen.unwrap_or(false))
        }) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(new_fullscreen));
            ctx.send_viewport_cmd(egui::ViewportCommand::Decorations(!new_fullscreen));
        }

        self.receive_tiles();

        if !self.address_editing {
            self.address = self.history.current().to_string();
        }
        if let Some(action) = self.nav_bar(ctx) {
            self.apply(ctx, action);
        }

        let mut missing_tiles = Vec::new();
        let mut go_home = false;
        let mut page_ctx = PageContext {
            history: &mut self.history,
            tile_cache: &mut self.tile_cache,
            missing_tiles: &mut missing_tiles,
            attribution: &self.attribution,
        };
        match &mut self.page {
            Page::Map(page) => page.ui(ctx, &mut page_ctx),
            Page::Participants(page) => page.ui(ctx, &mut page_ctx),
            Page::NotFound => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Страница не найдена");
                    go_home = ui.link("На главную").clicked();
                });
            }
        }
        if go_home {
            self.apply(ctx, NavAction::Go(Location::new(Route::WorldMap.path(), "")));
        }

        self.request_tiles(ctx, missing_tiles);
    }
}

impl HistMapApp {
    /// `start` is an explicit location from the command line. Without it
    /// the configured start, then the persisted location, then `/` is used.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        start: Option<String>,
    ) -> Result<Self, StartupError> {
        cc.egui_ctx.set_style(style::dark_theme(&cc.egui_ctx));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .thread_name("histmap-io")
            .thread_stack_size(3 * 1024 * 1024)
            .enable_all()
            .build()?;
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        let api = ApiClient::new(client.clone(), config.api_base.clone());
        let health_api = api.clone();
        runtime.spawn(async move {
            match health_api.health().await {
                Ok(()) => info!("history API at {} is up", health_api.base()),
                Err(e) => warn!("history API at {} is not healthy: {e}", health_api.base()),
            }
        });

        let persisted = cc
            .storage
            .and_then(|storage| eframe::get_value::<String>(storage, LOCATION_KEY));
        let start = start
            .or_else(|| config.start_location.clone())
            .or(persisted)
            .unwrap_or_else(|| "/".to_string());
        info!("starting at {start}");

        let attribution = if config.tile_url.contains("openstreetmap") {
            "© OpenStreetMap contributors".to_string()
        } else {
            String::new()
        };
        let tile_retriever = TileRetriever::new(client, config.tile_url.clone(), config.tile_token.clone());
        let (tile_tx, tile_rx) = mpsc::unbounded_channel();

        let mut app = Self {
            tile_cache: LruCache::new(config.tile_cache),
            config,
            runtime,
            api,
            history: History::new(Location::parse(&start)),
            route: Route::NotFound,
            page: Page::NotFound,
            address: start,
            address_editing: false,
            attribution,
            tile_retriever,
            pending_tiles: HashSet::new(),
            tile_tx,
            tile_rx,
        };
        app.mount(&cc.egui_ctx);
        Ok(app)
    }

    /// Tears down the current page, then mounts the one for the current
    /// location.
    fn mount(&mut self, ctx: &egui::Context) {
        self.page.teardown();

        let route = Route::from_path(self.history.current().path());
        if route == Route::NotFound {
            warn!("no page at {}", self.history.current());
        }
        let handle = self.runtime.handle().clone();
        let repaint: Repaint = {
            let ctx = ctx.clone();
            Arc::new(move || ctx.request_repaint())
        };
        let mut missing_tiles = Vec::new();
        let mut page_ctx = PageContext {
            history: &mut self.history,
            tile_cache: &mut self.tile_cache,
            missing_tiles: &mut missing_tiles,
            attribution: &self.attribution,
        };
        let cluster_radius = self.config.cluster_radius;
        self.page = match route {
            Route::WorldMap => Page::Map(MapPage::mount(
                ViewMode::Global,
                &mut page_ctx,
                self.api.clone(),
                handle,
                repaint,
                cluster_radius,
            )),
            Route::LocalMap => Page::Map(MapPage::mount(
                ViewMode::Local,
                &mut page_ctx,
                self.api.clone(),
                handle,
                repaint,
                cluster_radius,
            )),
            Route::Participants => {
                Page::Participants(ParticipantsPage::mount(&mut page_ctx, self.api.clone(), handle, repaint))
            }
            Route::NotFound => Page::NotFound,
        };
        self.route = route;
    }

    fn apply(&mut self, ctx: &egui::Context, action: NavAction) {
        let moved = match action {
            NavAction::Back => self.history.back(),
            NavAction::Forward => self.history.forward(),
            NavAction::Go(location) => {
                if &location != self.history.current() {
                    info!("navigate to {location}");
                    self.history.push(location);
                }
                true
            }
        };
        if moved {
            self.address_editing = false;
            self.mount(ctx);
        }
    }

    fn nav_bar(&mut self, ctx: &egui::Context) -> Option<NavAction> {
        let mut action = None;
        egui::TopBottomPanel::top("nav_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.add_enabled(self.history.can_go_back(), egui::Button::new("←")).clicked() {
                    action = Some(NavAction::Back);
                }
                if ui.add_enabled(self.history.can_go_forward(), egui::Button::new("→")).clicked() {
                    action = Some(NavAction::Forward);
                }
                for route in [Route::WorldMap, Route::LocalMap, Route::Participants] {
                    if ui.selectable_label(self.route == route, route.title()).clicked() {
                        action = Some(NavAction::Go(Location::new(route.path(), "")));
                    }
                }
                ui.separator();
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.address)
                        .font(egui::TextStyle::Monospace)
                        .desired_width(f32::INFINITY),
                );
                self.address_editing = response.has_focus();
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    action = Some(NavAction::Go(Location::parse(&self.address)));
                }
            });
        });
        action
    }

    fn receive_tiles(&mut self) {
        while let Ok((key, result)) = self.tile_rx.try_recv() {
            match result {
                Ok(tile) => {
                    self.tile_cache.put(key, tile);
                    self.pending_tiles.remove(&key);
                }
                // stays pending so a broken tile is not refetched every frame
                Err(e) => warn!("tile {}/{}/{} failed: {e}", key.zoom, key.x, key.y),
            }
        }
    }

    fn request_tiles(&mut self, ctx: &egui::Context, missing: Vec<TileKey>) {
        for key in missing {
            if self.pending_tiles.contains(&key) || self.tile_cache.peek(&key).is_some() {
                continue;
            }
            let sender = self.tile_tx.clone();
            let retriever = self.tile_retriever.clone();
            let requester = ctx.clone();
            self.runtime.spawn(async move {
                let result = retriever.fetch_tile(key).await;
                if sender.send((key, result)).is_err() {
                    debug!("tile {key:?} arrived after shutdown");
                    return;
                }
                requester.request_repaint();
            });
            self.pending_tiles.insert(key);
        }
    }
}

impl Drop for HistMapApp {
    fn drop(&mut self) {
        self.page.teardown();
    }
}
