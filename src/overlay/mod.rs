//! Keeps the overlays of a map widget in step with the derived view.

pub mod reconciler;

use std::fmt::Debug;

use egui::Color32;

use crate::derive::Popup;
use crate::model::LatLng;

pub use reconciler::{OverlayHandle, OverlayReconciler, ReconcileStats};

#[derive(Debug, Clone, PartialEq)]
pub struct PolylineSpec {
    pub path: Vec<LatLng>,
    pub color: Color32,
    pub popup: Popup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub popup: Popup,
}

/// Where a marker is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attach {
    Map,
    ClusterGroup,
}

/// Imperative interface of the map widget. The widget owns the drawing
/// objects; callers only hold the opaque layer ids it hands out.
pub trait MapWidget {
    type Layer: Copy + Eq + Debug;

    fn add_polyline(&mut self, spec: &PolylineSpec) -> Self::Layer;

    fn set_polyline_path(&mut self, layer: Self::Layer, path: &[LatLng]);

    /// Changes color and popup in place. Returns `false` when the widget
    /// cannot, in which case the caller rebuilds the object.
    fn restyle_polyline(&mut self, layer: Self::Layer, spec: &PolylineSpec) -> bool;

    fn add_marker(&mut self, spec: &MarkerSpec, attach: Attach) -> Self::Layer;

    fn set_marker_position(&mut self, layer: Self::Layer, position: LatLng);

    fn restyle_marker(&mut self, layer: Self::Layer, spec: &MarkerSpec) -> bool;

    fn remove(&mut self, layer: Self::Layer, attach: Attach);

    fn has_cluster_group(&self) -> bool;

    fn dispose_cluster_group(&mut self);

    fn recenter(&mut self, center: LatLng, zoom: f32);

    /// Releases the widget itself. Nothing may be called afterwards.
    fn dispose(&mut self);
}
