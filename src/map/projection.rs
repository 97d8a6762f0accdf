//! Web Mercator math. Positions are kept in normalized world coordinates
//! (`[0, 1]` on both axes, y growing south) so they are zoom independent.

use egui::{vec2, Pos2, Rect};

use super::map_tile::TileKey;
use crate::model::LatLng;

pub const TILE_SIZE: f64 = 256.0;
pub const MAX_LATITUDE: f64 = 85.051_128_78;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 19.0;

pub fn project(p: LatLng) -> [f64; 2] {
    let lat = p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (p.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0;
    [x, y]
}

pub fn unproject(m: [f64; 2]) -> LatLng {
    let lng = m[0] * 360.0 - 180.0;
    let lat = (std::f64::consts::PI * (1.0 - 2.0 * m[1])).sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Side of the whole world in screen pixels at `zoom`.
pub fn world_size(zoom: f32) -> f64 {
    TILE_SIZE * 2f64.powf(zoom as f64)
}

/// Maps between geographic positions and a screen rectangle.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub rect: Rect,
    pub center: [f64; 2],
    pub zoom: f32,
}

impl Viewport {
    pub fn new(rect: Rect, center: LatLng, zoom: f32) -> Self {
        Self {
            rect,
            center: project(center),
            zoom,
        }
    }

    pub fn to_screen(&self, p: LatLng) -> Pos2 {
        self.world_to_screen(project(p))
    }

    pub fn world_to_screen(&self, m: [f64; 2]) -> Pos2 {
        let size = world_size(self.zoom);
        let dx = (m[0] - self.center[0]) * size;
        let dy = (m[1] - self.center[1]) * size;
        self.rect.center() + vec2(dx as f32, dy as f32)
    }

    pub fn screen_to_world(&self, pos: Pos2) -> [f64; 2] {
        let size = world_size(self.zoom);
        let d = pos - self.rect.center();
        [
            self.center[0] + d.x as f64 / size,
            self.center[1] + d.y as f64 / size,
        ]
    }

    /// Tiles at `floor(zoom)` covering the rectangle, with their screen
    /// rectangles. Columns wrap around the antimeridian; rows outside the
    /// world are skipped.
    pub fn visible_tiles(&self) -> Vec<(TileKey, Rect)> {
        let z = self.zoom.floor().clamp(0.0, MAX_ZOOM) as u32;
        let n = 1i64 << z;
        let tile_px = world_size(self.zoom) / n as f64;

        let top_left = self.screen_to_world(self.rect.min);
        let bottom_right = self.screen_to_world(self.rect.max);
        let min_x = (top_left[0] * n as f64).floor() as i64;
        let max_x = (bottom_right[0] * n as f64).ceil() as i64 - 1;
        let min_y = ((top_left[1] * n as f64).floor() as i64).max(0);
        let max_y = ((bottom_right[1] * n as f64).ceil() as i64 - 1).min(n - 1);

        let mut tiles = Vec::new();
        for ty in min_y..=max_y {
            for tx in min_x..=max_x {
                let origin = self.world_to_screen([tx as f64 / n as f64, ty as f64 / n as f64]);
                let rect = Rect::from_min_size(origin, vec2(tile_px as f32, tile_px as f32));
                let key = TileKey {
                    zoom: z,
                    x: tx.rem_euclid(n) as u32,
                    y: ty as u32,
                };
                tiles.push((key, rect));
            }
        }
        tiles
    }

    /// Moves the center by a screen-space drag delta.
    pub fn pan(&mut self, delta: egui::Vec2) {
        let size = world_size(self.zoom);
        self.center[0] = (self.center[0] - delta.x as f64 / size).rem_euclid(1.0);
        self.center[1] = (self.center[1] - delta.y as f64 / size).clamp(0.0, 1.0);
    }

    pub fn center_latlng(&self) -> LatLng {
        unproject(self.center)
    }
}

/// Distance in pixels from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_sq();
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use egui::pos2;

    #[test]
    fn project_round_trip() {
        for p in [LatLng::new(44.4952, 34.1433), LatLng::new(-33.9, 151.2), LatLng::new(0.0, 0.0)] {
            let back = unproject(project(p));
            assert_abs_diff_eq!(back.lat, p.lat, epsilon = 1e-9);
            assert_abs_diff_eq!(back.lng, p.lng, epsilon = 1e-9);
        }
        let origin = project(LatLng::new(0.0, 0.0));
        assert_abs_diff_eq!(origin[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(origin[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn center_maps_to_rect_center() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let view = Viewport::new(rect, LatLng::new(44.5, 34.1), 10.0);
        let center = view.to_screen(LatLng::new(44.5, 34.1));
        assert_abs_diff_eq!(center.x, 400.0, epsilon = 1e-3);
        assert_abs_diff_eq!(center.y, 300.0, epsilon = 1e-3);
        let back = unproject(view.screen_to_world(center));
        assert_abs_diff_eq!(back.lat, 44.5, epsilon = 1e-6);
    }

    #[test]
    fn tiles_cover_viewport() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(512.0, 512.0));
        let view = Viewport::new(rect, LatLng::new(0.0, 0.0), 1.0);
        let tiles = view.visible_tiles();
        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|(k, _)| k.zoom == 1 && k.x < 2 && k.y < 2));
        let (_, first) = tiles[0];
        assert_abs_diff_eq!(first.min.x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(first.width(), 256.0, epsilon = 1e-3);
    }

    #[test]
    fn tile_columns_wrap() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(300.0, 100.0));
        let view = Viewport::new(rect, LatLng::new(0.0, 179.9), 2.0);
        let xs: Vec<u32> = view.visible_tiles().iter().map(|(k, _)| k.x).collect();
        assert!(xs.contains(&3));
        assert!(xs.contains(&0));
    }

    #[test]
    fn segment_distance() {
        let d = distance_to_segment(pos2(5.0, 5.0), pos2(0.0, 0.0), pos2(10.0, 0.0));
        assert_abs_diff_eq!(d, 5.0, epsilon = 1e-5);
        let d = distance_to_segment(pos2(-3.0, 4.0), pos2(0.0, 0.0), pos2(10.0, 0.0));
        assert_abs_diff_eq!(d, 5.0, epsilon = 1e-5);
    }
}
