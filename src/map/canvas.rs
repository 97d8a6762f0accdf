use std::collections::BTreeMap;

use egui::Color32;
use log::debug;

use super::cluster::{Cluster, ClusterGroup};
use super::projection::{project, MAX_ZOOM, MIN_ZOOM};
use super::LayerId;
use crate::derive::Popup;
use crate::model::LatLng;
use crate::overlay::{Attach, MapWidget, MarkerSpec, PolylineSpec};

#[derive(Debug, Clone)]
pub enum Overlay {
    Polyline {
        path: Vec<LatLng>,
        color: Color32,
        popup: Popup,
    },
    Marker {
        position: LatLng,
        world: [f64; 2],
        popup: Popup,
        attach: Attach,
    },
}

impl Overlay {
    pub fn popup(&self) -> &Popup {
        match self {
            Overlay::Polyline { popup, .. } | Overlay::Marker { popup, .. } => popup,
        }
    }
}

/// Retained overlay state of one map, painted every frame by
/// [`super::map::Map`].
#[derive(Debug)]
pub struct MapCanvas {
    next_layer: LayerId,
    overlays: BTreeMap<LayerId, Overlay>,
    cluster: Option<ClusterGroup>,
    center: LatLng,
    zoom: f32,
    open_popup: Option<LayerId>,
}

impl MapCanvas {
    /// A canvas with a clustering group when `cluster_radius_px` is set.
    pub fn new(center: LatLng, zoom: f32, cluster_radius_px: Option<f32>) -> Self {
        Self {
            next_layer: 0,
            overlays: BTreeMap::new(),
            cluster: cluster_radius_px.map(ClusterGroup::new),
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            open_popup: None,
        }
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f32) {
        self.center = center;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn overlays(&self) -> impl Iterator<Item = (LayerId, &Overlay)> {
        self.overlays.iter().map(|(id, o)| (*id, o))
    }

    pub fn overlay(&self, layer: LayerId) -> Option<&Overlay> {
        self.overlays.get(&layer)
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Markers attached straight to the map, plus the clusters of the
    /// clustering group at the current zoom.
    pub fn marker_groups(&self) -> Vec<Cluster> {
        let mut groups: Vec<Cluster> = self
            .overlays
            .iter()
            .filter_map(|(id, o)| match o {
                Overlay::Marker {
                    position,
                    attach: Attach::Map,
                    ..
                } => Some(Cluster {
                    center: *position,
                    members: vec![*id],
                }),
                _ => None,
            })
            .collect();
        if let Some(cluster) = &self.cluster {
            groups.extend(cluster.clusters(self.zoom));
        }
        groups
    }

    pub fn open_popup(&self) -> Option<LayerId> {
        self.open_popup
    }

    pub fn set_open_popup(&mut self, layer: Option<LayerId>) {
        self.open_popup = layer.filter(|l| self.overlays.contains_key(l));
    }

    fn allocate(&mut self) -> LayerId {
        self.next_layer += 1;
        self.next_layer
    }
}

impl MapWidget for MapCanvas {
    type Layer = LayerId;

    fn add_polyline(&mut self, spec: &PolylineSpec) -> LayerId {
        let layer = self.allocate();
        self.overlays.insert(
            layer,
            Overlay::Polyline {
                path: spec.path.clone(),
                color: spec.color,
                popup: spec.popup.clone(),
            },
        );
        layer
    }

    fn set_polyline_path(&mut self, layer: LayerId, new_path: &[LatLng]) {
        if let Some(Overlay::Polyline { path, .. }) = self.overlays.get_mut(&layer) {
            *path = new_path.to_vec();
        }
    }

    fn restyle_polyline(&mut self, layer: LayerId, spec: &PolylineSpec) -> bool {
        match self.overlays.get_mut(&layer) {
            Some(Overlay::Polyline { color, popup, .. }) => {
                *color = spec.color;
                *popup = spec.popup.clone();
                true
            }
            _ => false,
        }
    }

    fn add_marker(&mut self, spec: &MarkerSpec, attach: Attach) -> LayerId {
        let layer = self.allocate();
        let world = project(spec.position);
        let attach = match (&mut self.cluster, attach) {
            (Some(cluster), Attach::ClusterGroup) => {
                cluster.insert(layer, world);
                Attach::ClusterGroup
            }
            _ => Attach::Map,
        };
        self.overlays.insert(
            layer,
            Overlay::Marker {
                position: spec.position,
                world,
                popup: spec.popup.clone(),
                attach,
            },
        );
        layer
    }

    fn set_marker_position(&mut self, layer: LayerId, new_position: LatLng) {
        if let Some(Overlay::Marker {
            position,
            world,
            attach,
            ..
        }) = self.overlays.get_mut(&layer)
        {
            let new_world = project(new_position);
            if let (Attach::ClusterGroup, Some(cluster)) = (*attach, &mut self.cluster) {
                cluster.remove(layer, *world);
                cluster.insert(layer, new_world);
            }
            *position = new_position;
            *world = new_world;
        }
    }

    fn restyle_marker(&mut self, layer: LayerId, spec: &MarkerSpec) -> bool {
        match self.overlays.get_mut(&layer) {
            Some(Overlay::Marker { popup, .. }) => {
                *popup = spec.popup.clone();
                true
            }
            _ => false,
        }
    }

    fn remove(&mut self, layer: LayerId, _attach: Attach) {
        let Some(overlay) = self.overlays.remove(&layer) else {
            debug!("remove of unknown layer {layer}");
            return;
        };
        if let (
            Overlay::Marker {
                world,
                attach: Attach::ClusterGroup,
                ..
            },
            Some(cluster),
        ) = (&overlay, &mut self.cluster)
        {
            cluster.remove(layer, *world);
        }
        if self.open_popup == Some(layer) {
            self.open_popup = None;
        }
    }

    fn has_cluster_group(&self) -> bool {
        self.cluster.is_some()
    }

    fn dispose_cluster_group(&mut self) {
        if let Some(cluster) = self.cluster.take() {
            debug!("cluster group disposed with {} markers", cluster.len());
        }
    }

    fn recenter(&mut self, center: LatLng, zoom: f32) {
        self.set_view(center, zoom);
    }

    fn dispose(&mut self) {
        self.overlays.clear();
        self.open_popup = None;
    }
}
