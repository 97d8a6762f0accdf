use rstar::primitives::GeomWithData;
use rstar::RTree;

use super::projection::{unproject, world_size};
use super::LayerId;
use crate::model::LatLng;

type Entry = GeomWithData<[f64; 2], LayerId>;

/// Markers that would overlap on screen at the current zoom.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub center: LatLng,
    pub members: Vec<LayerId>,
}

/// Groups markers whose screen distance is below a pixel radius. Markers
/// are indexed in normalized world coordinates so the index survives zoom
/// changes.
#[derive(Debug)]
pub struct ClusterGroup {
    tree: RTree<Entry>,
    radius_px: f32,
}

impl ClusterGroup {
    pub fn new(radius_px: f32) -> Self {
        Self {
            tree: RTree::new(),
            radius_px,
        }
    }

    pub fn insert(&mut self, layer: LayerId, world: [f64; 2]) {
        self.tree.insert(GeomWithData::new(world, layer));
    }

    pub fn remove(&mut self, layer: LayerId, world: [f64; 2]) -> bool {
        self.tree.remove(&GeomWithData::new(world, layer)).is_some()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Greedy clustering in layer order: each unassigned marker absorbs
    /// every unassigned marker within the radius.
    pub fn clusters(&self, zoom: f32) -> Vec<Cluster> {
        let radius = self.radius_px as f64 / world_size(zoom);
        let mut entries: Vec<&Entry> = self.tree.iter().collect();
        entries.sort_by_key(|e| e.data);

        let mut assigned = std::collections::HashSet::new();
        let mut clusters = Vec::new();
        for seed in entries {
            if assigned.contains(&seed.data) {
                continue;
            }
            let mut members: Vec<&Entry> = self
                .tree
                .locate_within_distance(*seed.geom(), radius * radius)
                .filter(|e| !assigned.contains(&e.data))
                .collect();
            members.sort_by_key(|e| e.data);

            let n = members.len() as f64;
            let sum = members
                .iter()
                .fold([0.0, 0.0], |acc, e| [acc[0] + e.geom()[0], acc[1] + e.geom()[1]]);
            let ids: Vec<LayerId> = members.iter().map(|e| e.data).collect();
            assigned.extend(ids.iter().copied());
            clusters.push(Cluster {
                center: unproject([sum[0] / n, sum[1] / n]),
                members: ids,
            });
        }
        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::projection::project;

    #[test]
    fn nearby_markers_merge_until_zoomed_in() {
        let mut group = ClusterGroup::new(40.0);
        let a = project(LatLng::new(44.467, 34.143));
        let b = project(LatLng::new(44.468, 34.144));
        let far = project(LatLng::new(55.75, 37.61));
        group.insert(1, a);
        group.insert(2, b);
        group.insert(3, far);

        let coarse = group.clusters(8.0);
        assert_eq!(coarse.len(), 2);
        assert_eq!(coarse[0].members, vec![1, 2]);
        assert_eq!(coarse[1].members, vec![3]);

        let fine = group.clusters(18.0);
        assert_eq!(fine.len(), 3);
    }

    #[test]
    fn remove_needs_matching_position() {
        let mut group = ClusterGroup::new(40.0);
        let p = project(LatLng::new(44.5, 34.1));
        group.insert(7, p);
        assert!(!group.remove(7, project(LatLng::new(0.0, 0.0))));
        assert!(group.remove(7, p));
        assert!(group.is_empty());
    }
}
