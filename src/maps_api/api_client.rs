use futures::future::{BoxFuture, FutureExt};
use log::debug;
use serde::de::DeserializeOwned;
use url::Url;

use super::query::{self, ParticipantQuery, PoiQuery, RouteQuery};
use super::MapApi;
use crate::error::{ApiError, ApiResult};
use crate::model::{MapConfig, Participant, ParticipantId, Poi, Route, ViewMode};

/// HTTP client for the history API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(client: reqwest::Client, mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { client, base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str, pairs: &[(&'static str, String)]) -> ApiResult<Url> {
        let mut url = self.base.join(path.trim_start_matches('/'))?;
        let query = query::encode(pairs);
        url.set_query((!query.is_empty()).then_some(query.as_str()));
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        debug!("GET {url}");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            endpoint: url.path().to_string(),
            source,
        })
    }

    /// Checks `/health`. Only used to warn early about a missing backend.
    pub async fn health(&self) -> ApiResult<()> {
        let url = self.endpoint("/health", &[])?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(())
    }
}

impl MapApi for ApiClient {
    fn routes(&self, mode: ViewMode, query: RouteQuery) -> BoxFuture<'static, ApiResult<Vec<Route>>> {
        let this = self.clone();
        async move {
            let url = this.endpoint(mode.routes_endpoint(), query.pairs())?;
            this.get_json(url).await
        }
        .boxed()
    }

    fn pois(&self, query: PoiQuery) -> BoxFuture<'static, ApiResult<Vec<Poi>>> {
        let this = self.clone();
        async move {
            let url = this.endpoint("/api/poi", query.pairs())?;
            this.get_json(url).await
        }
        .boxed()
    }

    fn map_config(&self) -> BoxFuture<'static, ApiResult<MapConfig>> {
        let this = self.clone();
        async move {
            let url = this.endpoint("/api/map-config", &[])?;
            this.get_json(url).await
        }
        .boxed()
    }

    fn participants(&self, query: ParticipantQuery) -> BoxFuture<'static, ApiResult<Vec<Participant>>> {
        let this = self.clone();
        async move {
            let url = this.endpoint("/api/participants", query.pairs())?;
            this.get_json(url).await
        }
        .boxed()
    }

    fn participant_routes(&self, id: ParticipantId) -> BoxFuture<'static, ApiResult<Vec<Route>>> {
        let this = self.clone();
        async move {
            let url = this.endpoint(&format!("/api/participants/{}/routes", id.0), &[])?;
            this.get_json(url).await
        }
        .boxed()
    }

    fn participant_pois(&self, id: ParticipantId) -> BoxFuture<'static, ApiResult<Vec<Poi>>> {
        let this = self.clone();
        async move {
            let url = this.endpoint(&format!("/api/participants/{}/pois", id.0), &[])?;
            this.get_json(url).await
        }
        .boxed()
    }
}
