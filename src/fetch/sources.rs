use log::info;
use tokio::runtime::Handle;

use super::loader::{Loader, Repaint};
use crate::error::ApiError;
use crate::filter::FilterState;
use crate::maps_api::{MapApi, ParticipantQuery, PoiQuery, RouteQuery};
use crate::model::{MapConfig, Participant, ParticipantId, Poi, Route, ViewMode};

/// Outcome of one load: all requested data, or the first failure.
pub type Snapshot<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq)]
pub struct MapData {
    pub routes: Vec<Route>,
    pub pois: Vec<Poi>,
    pub config: MapConfig,
}

/// Loads routes, POIs and the map config for one map page.
pub struct MapDataSource<A: MapApi> {
    api: A,
    mode: ViewMode,
    loader: Loader<Snapshot<MapData>>,
}

impl<A: MapApi> MapDataSource<A> {
    pub fn new(api: A, mode: ViewMode, handle: Handle) -> Self {
        Self {
            api,
            mode,
            loader: Loader::new(handle),
        }
    }

    pub fn with_repaint(mut self, repaint: Repaint) -> Self {
        self.loader = self.loader.with_repaint(repaint);
        self
    }

    /// Issues the three requests concurrently. If any of them fails the
    /// whole snapshot fails with that error.
    pub fn load(&mut self, filter: &FilterState) -> u64 {
        let routes = self.api.routes(self.mode, RouteQuery::from_filter(filter));
        let pois = self.api.pois(PoiQuery::from_filter(filter));
        let config = self.api.map_config();
        let generation = self.loader.issue(async move {
            let (routes, pois, config) = futures::try_join!(routes, pois, config)?;
            Ok::<_, ApiError>(MapData { routes, pois, config })
        });
        info!("map load {generation} ({:?}): {}", self.mode, filter.to_query());
        generation
    }

    pub fn poll(&mut self) -> Option<Snapshot<MapData>> {
        self.loader.try_latest()
    }

    pub async fn next(&mut self) -> Option<Snapshot<MapData>> {
        self.loader.next_current().await
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn teardown(&mut self) {
        self.loader.teardown();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantDetail {
    pub id: ParticipantId,
    pub routes: Vec<Route>,
    pub pois: Vec<Poi>,
}

/// Loads the participant directory and, separately, the routes and POIs
/// of the selected participant. The two loads have independent guards.
pub struct ParticipantSource<A: MapApi> {
    api: A,
    list: Loader<Snapshot<Vec<Participant>>>,
    detail: Loader<Snapshot<ParticipantDetail>>,
}

impl<A: MapApi> ParticipantSource<A> {
    pub fn new(api: A, handle: Handle) -> Self {
        Self {
            api,
            list: Loader::new(handle.clone()),
            detail: Loader::new(handle),
        }
    }

    pub fn with_repaint(mut self, repaint: Repaint) -> Self {
        self.list = self.list.with_repaint(repaint.clone());
        self.detail = self.detail.with_repaint(repaint);
        self
    }

    pub fn load(&mut self, filter: &FilterState) -> u64 {
        let participants = self.api.participants(ParticipantQuery::from_filter(filter));
        let generation = self.list.issue(participants);
        info!("participant load {generation}: {}", filter.to_query());
        generation
    }

    pub fn load_detail(&mut self, id: ParticipantId) -> u64 {
        let routes = self.api.participant_routes(id);
        let pois = self.api.participant_pois(id);
        self.detail.issue(async move {
            let (routes, pois) = futures::try_join!(routes, pois)?;
            Ok::<_, ApiError>(ParticipantDetail { id, routes, pois })
        })
    }

    pub fn poll(&mut self) -> Option<Snapshot<Vec<Participant>>> {
        self.list.try_latest()
    }

    pub fn poll_detail(&mut self) -> Option<Snapshot<ParticipantDetail>> {
        self.detail.try_latest()
    }

    pub async fn next(&mut self) -> Option<Snapshot<Vec<Participant>>> {
        self.list.next_current().await
    }

    pub async fn next_detail(&mut self) -> Option<Snapshot<ParticipantDetail>> {
        self.detail.next_current().await
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn is_loading_detail(&self) -> bool {
        self.detail.is_loading()
    }

    pub fn teardown(&mut self) {
        self.list.teardown();
        self.detail.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiResult;
    use crate::model::{RouteId, Transport};
    use futures::future::{self, BoxFuture, FutureExt};
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::oneshot;

    type Gate<T> = oneshot::Sender<ApiResult<T>>;

    /// Test double whose route and participant requests stay pending until
    /// the test opens their gate, so completions can be reordered at will.
    #[derive(Clone, Default)]
    struct GatedApi {
        route_gates: Arc<Mutex<Vec<Gate<Vec<Route>>>>>,
        participant_gates: Arc<Mutex<Vec<Gate<Vec<Participant>>>>>,
        route_queries: Arc<Mutex<Vec<RouteQuery>>>,
        fail_pois: Option<&'static str>,
    }

    impl GatedApi {
        fn open_route_gate(&self, index: usize, result: ApiResult<Vec<Route>>) {
            let gate = self.route_gates.lock().unwrap().remove(index);
            gate.send(result).unwrap();
        }

        fn open_participant_gate(&self, index: usize, result: ApiResult<Vec<Participant>>) {
            let gate = self.participant_gates.lock().unwrap().remove(index);
            gate.send(result).unwrap();
        }
    }

    fn gated<T: Send + 'static>(gates: &Mutex<Vec<Gate<T>>>) -> BoxFuture<'static, ApiResult<T>> {
        let (tx, rx) = oneshot::channel();
        gates.lock().unwrap().push(tx);
        async move {
            rx.await.unwrap_or_else(|_| {
                Err(ApiError::Status {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: "gate dropped".to_string(),
                })
            })
        }
        .boxed()
    }

    impl MapApi for GatedApi {
        fn routes(&self, _mode: ViewMode, query: RouteQuery) -> BoxFuture<'static, ApiResult<Vec<Route>>> {
            self.route_queries.lock().unwrap().push(query);
            gated(&self.route_gates)
        }

        fn pois(&self, _query: PoiQuery) -> BoxFuture<'static, ApiResult<Vec<Poi>>> {
            let result = match self.fail_pois {
                Some(body) => Err(ApiError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: body.to_string(),
                }),
                None => Ok(Vec::new()),
            };
            future::ready(result).boxed()
        }

        fn map_config(&self) -> BoxFuture<'static, ApiResult<MapConfig>> {
            future::ready(Ok(MapConfig { center_lat: 44.5, center_lng: 34.1, zoom: 10.0 })).boxed()
        }

        fn participants(&self, _query: ParticipantQuery) -> BoxFuture<'static, ApiResult<Vec<Participant>>> {
            gated(&self.participant_gates)
        }

        fn participant_routes(&self, _id: ParticipantId) -> BoxFuture<'static, ApiResult<Vec<Route>>> {
            future::ready(Ok(vec![route(9, "США")])).boxed()
        }

        fn participant_pois(&self, _id: ParticipantId) -> BoxFuture<'static, ApiResult<Vec<Poi>>> {
            future::ready(Ok(Vec::new())).boxed()
        }
    }

    fn route(id: i64, country: &str) -> Route {
        Route {
            id: RouteId(id),
            name: format!("route {id}"),
            path: vec![],
            transport: Transport::Air,
            country: Some(country.to_string()),
            is_global: true,
            category_participant_id: None,
        }
    }

    fn participant(id: i64, name: &str) -> Participant {
        Participant {
            id: ParticipantId(id),
            name: name.to_string(),
            role: String::new(),
            country: String::new(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn only_the_latest_filter_is_applied() {
        let api = GatedApi::default();
        let mut source = MapDataSource::new(api.clone(), ViewMode::Global, Handle::current());

        source.load(&FilterState::new().with_country("США"));
        source.load(&FilterState::new().with_country("СССР"));

        // newest first, then the superseded one
        api.open_route_gate(1, Ok(vec![route(2, "СССР")]));
        let applied = source.next().await.unwrap().unwrap();
        assert_eq!(applied.routes[0].id, RouteId(2));

        api.open_route_gate(0, Ok(vec![route(1, "США")]));
        let late = tokio::time::timeout(Duration::from_millis(100), source.next()).await;
        assert!(late.is_err());
        assert!(source.poll().is_none());
    }

    #[tokio::test]
    async fn superseded_failure_is_not_surfaced() {
        let api = GatedApi::default();
        let mut source = MapDataSource::new(api.clone(), ViewMode::Local, Handle::current());
        source.load(&FilterState::new());
        source.load(&FilterState::new().with_transport(Some(Transport::Rail)));

        api.open_route_gate(0, Err(ApiError::Status { status: StatusCode::BAD_GATEWAY, body: "old".into() }));
        api.open_route_gate(0, Ok(vec![route(5, "США")]));
        let applied = source.next().await.unwrap();
        assert!(applied.is_ok());
    }

    #[tokio::test]
    async fn any_failure_fails_the_whole_load() {
        let api = GatedApi { fail_pois: Some("poi table missing"), ..GatedApi::default() };
        let mut source = MapDataSource::new(api.clone(), ViewMode::Global, Handle::current());
        source.load(&FilterState::new());
        let err = source.next().await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "poi table missing");
    }

    #[tokio::test]
    async fn route_query_follows_filter() {
        let api = GatedApi::default();
        let mut source = MapDataSource::new(api.clone(), ViewMode::Global, Handle::current());
        let filter = FilterState::new().with_country("США").with_transport(Some(Transport::Sea));
        source.load(&filter);
        let queries = api.route_queries.lock().unwrap().clone();
        assert_eq!(queries, vec![RouteQuery::from_filter(&filter)]);
    }

    #[tokio::test]
    async fn teardown_drops_in_flight_participants() {
        let api = GatedApi::default();
        let mut source = ParticipantSource::new(api.clone(), Handle::current());
        source.load(&FilterState::new());
        source.teardown();
        api.open_participant_gate(0, Ok(vec![participant(1, "Ф. Рузвельт")]));
        tokio::task::yield_now().await;
        assert!(source.poll().is_none());
        assert!(source.next().await.is_none());
    }

    #[tokio::test]
    async fn participant_list_and_detail_are_guarded_separately() {
        let api = GatedApi::default();
        let mut source = ParticipantSource::new(api.clone(), Handle::current());
        source.load(&FilterState::new());
        source.load_detail(ParticipantId(1));
        assert!(source.is_loading_detail());
        let detail = source.next_detail().await.unwrap().unwrap();
        assert_eq!(detail.id, ParticipantId(1));
        assert_eq!(detail.routes.len(), 1);
        assert!(!source.is_loading_detail());
        assert!(source.is_loading());

        api.open_participant_gate(0, Ok(vec![participant(1, "Ф. Рузвельт")]));
        let list = source.next().await.unwrap().unwrap();
        assert_eq!(list[0].name, "Ф. Рузвельт");
    }
}
