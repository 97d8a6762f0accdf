//! Clients for the two remote collaborators: the history API and the
//! raster tile server.

pub mod api_client;
pub mod query;
pub mod tile_retriever;

use futures::future::BoxFuture;

use crate::error::ApiResult;
use crate::model::{MapConfig, Participant, ParticipantId, Poi, Route, ViewMode};

pub use api_client::ApiClient;
pub use query::{ParticipantQuery, PoiQuery, RouteQuery};

/// Read-only view of the history API. Futures are `'static` so they can be
/// spawned on the runtime.
pub trait MapApi: Clone + Send + Sync + 'static {
    fn routes(&self, mode: ViewMode, query: RouteQuery) -> BoxFuture<'static, ApiResult<Vec<Route>>>;

    fn pois(&self, query: PoiQuery) -> BoxFuture<'static, ApiResult<Vec<Poi>>>;

    fn map_config(&self) -> BoxFuture<'static, ApiResult<MapConfig>>;

    fn participants(&self, query: ParticipantQuery) -> BoxFuture<'static, ApiResult<Vec<Participant>>>;

    fn participant_routes(&self, id: ParticipantId) -> BoxFuture<'static, ApiResult<Vec<Route>>>;

    fn participant_pois(&self, id: ParticipantId) -> BoxFuture<'static, ApiResult<Vec<Poi>>>;
}
