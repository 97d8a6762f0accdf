use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use log::debug;

use super::{Attach, MapWidget, MarkerSpec, PolylineSpec};
use crate::derive::{DerivedView, StyledPoi, StyledRoute};
use crate::model::{LatLng, MapConfig, PoiId, RouteId};

/// A live widget object together with the attributes last applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayHandle<L, A> {
    pub layer: L,
    pub applied: A,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileStats {
    pub created: usize,
    pub moved: usize,
    pub restyled: usize,
    pub rebuilt: usize,
    pub removed: usize,
}

impl ReconcileStats {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Owns one map widget for the lifetime of a page and the overlays on it.
///
/// After every [`OverlayReconciler::reconcile`] there is exactly one
/// overlay per visible id and none for ids that are not visible. Dropping
/// the reconciler disposes the overlays, the cluster group and the widget,
/// in that order.
pub struct OverlayReconciler<W: MapWidget> {
    widget: W,
    polylines: HashMap<RouteId, OverlayHandle<W::Layer, PolylineSpec>>,
    markers: HashMap<PoiId, OverlayHandle<W::Layer, MarkerSpec>>,
    view: Option<(LatLng, f32)>,
    disposed: bool,
}

impl<W: MapWidget> OverlayReconciler<W> {
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            polylines: HashMap::new(),
            markers: HashMap::new(),
            view: None,
            disposed: false,
        }
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn route_overlays(&self) -> &HashMap<RouteId, OverlayHandle<W::Layer, PolylineSpec>> {
        &self.polylines
    }

    pub fn poi_overlays(&self) -> &HashMap<PoiId, OverlayHandle<W::Layer, MarkerSpec>> {
        &self.markers
    }

    fn marker_attach(&self) -> Attach {
        if self.widget.has_cluster_group() {
            Attach::ClusterGroup
        } else {
            Attach::Map
        }
    }

    pub fn reconcile(&mut self, view: &DerivedView) -> ReconcileStats {
        if self.disposed {
            return ReconcileStats::default();
        }
        let mut stats = ReconcileStats::default();
        self.reconcile_routes(&view.visible_routes, &mut stats);
        self.reconcile_pois(&view.visible_pois, &mut stats);
        if !stats.is_noop() {
            debug!("reconciled overlays: {stats:?}");
        }
        stats
    }

    fn reconcile_routes(&mut self, routes: &[StyledRoute], stats: &mut ReconcileStats) {
        let wanted: Vec<(RouteId, PolylineSpec)> = dedup_by_id(routes.iter().map(|r| {
            (
                r.id,
                PolylineSpec {
                    path: r.path.clone(),
                    color: r.color,
                    popup: r.popup.clone(),
                },
            )
        }));
        let keep: HashSet<RouteId> = wanted.iter().map(|(id, _)| *id).collect();

        let gone: Vec<RouteId> = self.polylines.keys().filter(|id| !keep.contains(id)).copied().collect();
        for id in gone {
            if let Some(handle) = self.polylines.remove(&id) {
                self.widget.remove(handle.layer, Attach::Map);
                stats.removed += 1;
            }
        }

        for (id, spec) in wanted {
            match self.polylines.get_mut(&id) {
                None => {
                    let layer = self.widget.add_polyline(&spec);
                    self.polylines.insert(id, OverlayHandle { layer, applied: spec });
                    stats.created += 1;
                }
                Some(handle) if handle.applied == spec => {}
                Some(handle) => {
                    if handle.applied.path != spec.path {
                        self.widget.set_polyline_path(handle.layer, &spec.path);
                        stats.moved += 1;
                    }
                    if handle.applied.color != spec.color || handle.applied.popup != spec.popup {
                        if self.widget.restyle_polyline(handle.layer, &spec) {
                            stats.restyled += 1;
                        } else {
                            self.widget.remove(handle.layer, Attach::Map);
                            handle.layer = self.widget.add_polyline(&spec);
                            stats.rebuilt += 1;
                        }
                    }
                    handle.applied = spec;
                }
            }
        }
    }

    fn reconcile_pois(&mut self, pois: &[StyledPoi], stats: &mut ReconcileStats) {
        let attach = self.marker_attach();
        let wanted: Vec<(PoiId, MarkerSpec)> = dedup_by_id(pois.iter().map(|p| {
            (
                p.id,
                MarkerSpec {
                    position: p.position,
                    popup: p.popup.clone(),
                },
            )
        }));
        let keep: HashSet<PoiId> = wanted.iter().map(|(id, _)| *id).collect();

        let gone: Vec<PoiId> = self.markers.keys().filter(|id| !keep.contains(id)).copied().collect();
        for id in gone {
            if let Some(handle) = self.markers.remove(&id) {
                self.widget.remove(handle.layer, attach);
                stats.removed += 1;
            }
        }

        for (id, spec) in wanted {
            match self.markers.get_mut(&id) {
                None => {
                    let layer = self.widget.add_marker(&spec, attach);
                    self.markers.insert(id, OverlayHandle { layer, applied: spec });
                    stats.created += 1;
                }
                Some(handle) if handle.applied == spec => {}
                Some(handle) => {
                    if handle.applied.position != spec.position {
                        self.widget.set_marker_position(handle.layer, spec.position);
                        stats.moved += 1;
                    }
                    if handle.applied.popup != spec.popup {
                        if self.widget.restyle_marker(handle.layer, &spec) {
                            stats.restyled += 1;
                        } else {
                            self.widget.remove(handle.layer, attach);
                            handle.layer = self.widget.add_marker(&spec, attach);
                            stats.rebuilt += 1;
                        }
                    }
                    handle.applied = spec;
                }
            }
        }
    }

    /// Applies the configured center and zoom in place. Repeated calls with
    /// the same config leave the user's pan and zoom alone.
    pub fn recenter(&mut self, config: &MapConfig) {
        if self.disposed {
            return;
        }
        let target = (config.center(), config.zoom);
        if self.view != Some(target) {
            self.widget.recenter(target.0, target.1);
            self.view = Some(target);
        }
    }

    /// Disposes all overlays, then the cluster group, then the widget.
    /// Idempotent.
    pub fn teardown(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let attach = self.marker_attach();
        let removed = self.polylines.len() + self.markers.len();
        for (_, handle) in self.polylines.drain() {
            self.widget.remove(handle.layer, Attach::Map);
        }
        for (_, handle) in self.markers.drain() {
            self.widget.remove(handle.layer, attach);
        }
        if self.widget.has_cluster_group() {
            self.widget.dispose_cluster_group();
        }
        self.widget.dispose();
        debug!("map torn down, {removed} overlays released");
    }
}

impl<W: MapWidget> Drop for OverlayReconciler<W> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Ids are unique per response; if not, the last occurrence wins so the
/// one-overlay-per-id invariant still holds.
fn dedup_by_id<K: Copy + Eq + Hash, V>(items: impl Iterator<Item = (K, V)>) -> Vec<(K, V)> {
    let mut out: Vec<(K, V)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();
    for (k, v) in items {
        match index.get(&k) {
            Some(&i) => out[i].1 = v,
            None => {
                index.insert(k, out.len());
                out.push((k, v));
            }
        }
    }
    out
}
