use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TileKey {
    pub zoom: u32,
    pub x: u32,
    pub y: u32,
}

pub struct MapTile {
    pub key: TileKey,
    pub image_size: [usize; 2], // In pixels
    image_data: Vec<u8>,        // RGBA8
    texture: Option<egui::TextureHandle>, // Loaded lazily, needs the egui context
}

impl MapTile {
    pub fn new(key: TileKey, image_size: [usize; 2], image_data: Vec<u8>) -> Self {
        Self {
            key,
            image_size,
            image_data,
            texture: None,
        }
    }

    pub fn texture(&mut self, ctx: &egui::Context) -> &egui::TextureHandle {
        let Self {
            key,
            image_size,
            image_data,
            texture,
        } = self;
        texture.get_or_insert_with(|| {
            let color_image = egui::ColorImage::from_rgba_unmultiplied(*image_size, image_data);
            ctx.load_texture(
                format!("tile_{}_{}_zoom{}", key.x, key.y, key.zoom),
                color_image,
                egui::TextureOptions::default(),
            )
        })
    }
}
