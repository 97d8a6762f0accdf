use egui::epaint::{emath::lerp, vec2, Color32, Pos2, Rect, Shape, Stroke};
use egui::{pos2, Align2, FontId, Rangef, Response, Sense, Ui, Widget};
use lru::LruCache;

use super::canvas::{MapCanvas, Overlay};
use super::map_tile::{MapTile, TileKey};
use super::projection::{distance_to_segment, world_size, Viewport, MAX_ZOOM, MIN_ZOOM};
use crate::model::LatLng;

const LINE_WIDTH: f32 = 3.0;
const LINE_HIT_PX: f32 = 6.0;
const MARKER_RADIUS: f32 = 7.0;
const CLUSTER_RADIUS: f32 = 14.0;
const MARKER_FILL: Color32 = Color32::from_rgb(220, 38, 38);
const CLUSTER_FILL: Color32 = Color32::from_rgb(37, 99, 235);

/// Interactive slippy map. View state lives in the [`MapCanvas`]; tiles
/// not yet in the cache are painted gray and reported in `missing_tiles`.
pub struct Map<'a> {
    id: egui::Id,
    tile_cache: &'a mut LruCache<TileKey, MapTile>,
    canvas: &'a mut MapCanvas,
    missing_tiles: &'a mut Vec<TileKey>,
    attribution: Option<&'a str>,
}

impl<'a> Widget for Map<'a> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let mut viewport = Viewport::new(rect, self.canvas.center(), self.canvas.zoom());

        // Handle interactions
        if response.dragged() {
            viewport.pan(response.drag_delta());
        }

        let mut zoomed = false;
        if response.hovered() {
            let pointer = ui.input(|i| i.pointer.hover_pos()).unwrap_or(rect.center());

            // Pinch / touch
            let zoom_delta = ui.input(|i| i.zoom_delta()) - 1.0;
            if zoom_delta.abs() > f32::EPSILON {
                let step = lerp(Rangef::new(0.0, 1.0), zoom_delta.abs()) * zoom_delta.signum();
                zoom_by(&mut viewport, pointer, step);
                zoomed = true;
            }

            // Scroll, normalized with tanh
            let scroll = ui.input(|i| i.smooth_scroll_delta).y;
            if scroll.abs() > f32::EPSILON && !zoomed {
                zoom_by(&mut viewport, pointer, (scroll / 10.0).tanh());
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.handle_click(&mut viewport, pos);
            }
        }

        self.canvas.set_view(viewport.center_latlng(), viewport.zoom);

        let painter = ui.painter().with_clip_rect(rect);

        for (key, tile_rect) in viewport.visible_tiles() {
            if let Some(tile) = self.tile_cache.get_mut(&key) {
                let texture = tile.texture(ui.ctx());
                painter.image(
                    texture.id(),
                    tile_rect,
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            } else {
                self.missing_tiles.push(key);
                painter.rect_filled(tile_rect, 0.0, Color32::GRAY);
            }
        }

        for (_, overlay) in self.canvas.overlays() {
            if let Overlay::Polyline { path, color, .. } = overlay {
                let points: Vec<Pos2> = path.iter().map(|p| viewport.to_screen(*p)).collect();
                painter.add(Shape::line(points, Stroke::new(LINE_WIDTH, *color)));
            }
        }

        for group in self.canvas.marker_groups() {
            let center = viewport.to_screen(group.center);
            if group.members.len() > 1 {
                painter.circle(center, CLUSTER_RADIUS, CLUSTER_FILL, Stroke::new(2.0, Color32::WHITE));
                painter.text(
                    center,
                    Align2::CENTER_CENTER,
                    group.members.len().to_string(),
                    FontId::proportional(12.0),
                    Color32::WHITE,
                );
            } else {
                painter.circle(center, MARKER_RADIUS, MARKER_FILL, Stroke::new(1.5, Color32::WHITE));
            }
        }

        if let Some(text) = self.attribution {
            painter.text(
                rect.right_bottom() - vec2(4.0, 2.0),
                Align2::RIGHT_BOTTOM,
                text,
                FontId::proportional(11.0),
                Color32::from_gray(40),
            );
        }

        self.show_popup(ui, &viewport);

        response
    }
}

impl<'a> Map<'a> {
    pub fn new(
        id_source: impl std::hash::Hash,
        tile_cache: &'a mut LruCache<TileKey, MapTile>,
        canvas: &'a mut MapCanvas,
        missing_tiles: &'a mut Vec<TileKey>,
    ) -> Self {
        Self {
            id: egui::Id::new(id_source),
            tile_cache,
            canvas,
            missing_tiles,
            attribution: None,
        }
    }

    pub fn attribution(mut self, text: &'a str) -> Self {
        self.attribution = Some(text).filter(|t| !t.is_empty());
        self
    }

    /// Clusters zoom in, markers and lines open their popup, empty map
    /// closes it.
    fn handle_click(&mut self, viewport: &mut Viewport, pos: Pos2) {
        for group in self.canvas.marker_groups() {
            let center = viewport.to_screen(group.center);
            match group.members.as_slice() {
                [layer] if center.distance(pos) <= MARKER_RADIUS + 2.0 => {
                    self.canvas.set_open_popup(Some(*layer));
                    return;
                }
                [_, _, ..] if center.distance(pos) <= CLUSTER_RADIUS => {
                    zoom_by(viewport, center, 2.0);
                    return;
                }
                _ => {}
            }
        }

        let hit = self.canvas.overlays().find_map(|(layer, overlay)| match overlay {
            Overlay::Polyline { path, .. } => {
                let points: Vec<Pos2> = path.iter().map(|p| viewport.to_screen(*p)).collect();
                points
                    .windows(2)
                    .any(|w| distance_to_segment(pos, w[0], w[1]) <= LINE_HIT_PX)
                    .then_some(layer)
            }
            Overlay::Marker { .. } => None,
        });
        self.canvas.set_open_popup(hit);
    }

    fn show_popup(&mut self, ui: &Ui, viewport: &Viewport) {
        let Some(layer) = self.canvas.open_popup() else {
            return;
        };
        let Some((anchor, popup)) = self.canvas.overlay(layer).and_then(|o| popup_anchor(o).map(|a| (a, o.popup().clone()))) else {
            return;
        };
        let anchor = viewport.to_screen(anchor);
        if !viewport.rect.contains(anchor) {
            return;
        }

        let mut close = false;
        egui::Area::new(self.id.with(("popup", layer)))
            .order(egui::Order::Foreground)
            .fixed_pos(anchor + vec2(10.0, -10.0))
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(280.0);
                    ui.horizontal(|ui| {
                        ui.strong(&popup.title);
                        close = ui.small_button("×").clicked();
                    });
                    for line in &popup.lines {
                        ui.label(line);
                    }
                    if let Some(url) = &popup.image_url {
                        ui.hyperlink_to("Фото", url);
                    }
                });
            });
        if close {
            self.canvas.set_open_popup(None);
        }
    }
}

fn popup_anchor(overlay: &Overlay) -> Option<LatLng> {
    match overlay {
        Overlay::Marker { position, .. } => Some(*position),
        Overlay::Polyline { path, .. } => path.get(path.len() / 2).copied(),
    }
}

fn zoom_by(viewport: &mut Viewport, pointer: Pos2, step: f32) {
    let zoom = viewport.zoom + step;
    zoom_around(viewport, pointer, zoom);
}

/// Changes the zoom keeping the world point under `pointer` fixed.
fn zoom_around(viewport: &mut Viewport, pointer: Pos2, zoom: f32) {
    let anchor = viewport.screen_to_world(pointer);
    viewport.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    let size = world_size(viewport.zoom);
    let d = pointer - viewport.rect.center();
    viewport.center = [
        (anchor[0] - d.x as f64 / size).rem_euclid(1.0),
        (anchor[1] - d.y as f64 / size).clamp(0.0, 1.0),
    ];
}
