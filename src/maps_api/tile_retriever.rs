use log::debug;

use crate::error::TileError;
use crate::map::map_tile::{MapTile, TileKey};

/// Fetches raster tiles from a `{z}/{x}/{y}` URL template.
#[derive(Debug, Clone)]
pub struct TileRetriever {
    client: reqwest::Client,
    url_template: String,
    access_token: Option<String>,
}

impl TileRetriever {
    pub fn new(client: reqwest::Client, url_template: String, access_token: Option<String>) -> Self {
        Self {
            client,
            url_template,
            access_token,
        }
    }

    pub fn tile_url(&self, key: TileKey) -> String {
        self.url_template
            .replace("{z}", &key.zoom.to_string())
            .replace("{x}", &key.x.to_string())
            .replace("{y}", &key.y.to_string())
            .replace("{token}", self.access_token.as_deref().unwrap_or_default())
    }

    /// Asynchronously fetches a tile and decodes it into a MapTile.
    pub async fn fetch_tile(&self, key: TileKey) -> Result<MapTile, TileError> {
        let url = self.tile_url(key);
        debug!("fetching tile from {url}");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(TileError::Status(response.status()));
        }

        let bytes = response.bytes().await?;
        let image = image::load_from_memory(&bytes)?.to_rgba8();
        let (width, height) = image.dimensions();

        Ok(MapTile::new(key, [width as usize, height as usize], image.into_raw()))
    }
}
