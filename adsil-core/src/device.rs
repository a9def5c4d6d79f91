//! Directional sensor/emitter and its field-of-view point filter (§3/§4.D).

use crate::error::AdsilError;
use crate::graph::{NodeId, SceneGraph};
use crate::math::{self, Point, Vector};
use crate::pointcloud::PointCloud;
use crate::transform::Transform;

#[derive(Debug, Clone)]
pub struct Device {
    node: NodeId,
    horizontal_fov: f32,
    vertical_fov: f32,
    range: f32,
    pub name: String,
}

impl Device {
    /// Validates `horizontal_fov`/`vertical_fov ∈ (0, π)` and `range > 0`
    /// before inserting the device's node into `graph`.
    pub fn new(
        graph: &mut SceneGraph,
        local: Transform,
        horizontal_fov: f32,
        vertical_fov: f32,
        range: f32,
        name: impl Into<String>,
    ) -> Result<Self, AdsilError> {
        if !(horizontal_fov > 0.0 && horizontal_fov < std::f32::consts::PI) {
            return Err(AdsilError::Configuration(format!(
                "horizontal FOV {horizontal_fov} rad out of (0, pi)"
            )));
        }
        if !(vertical_fov > 0.0 && vertical_fov < std::f32::consts::PI) {
            return Err(AdsilError::Configuration(format!(
                "vertical FOV {vertical_fov} rad out of (0, pi)"
            )));
        }
        if !(range > 0.0) {
            return Err(AdsilError::Configuration(format!(
                "range {range} must be positive"
            )));
        }
        let node = graph.insert(local);
        Ok(Self {
            node,
            horizontal_fov,
            vertical_fov,
            range,
            name: name.into(),
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    pub fn global_position(&self, graph: &mut SceneGraph) -> Point {
        graph.global(self.node).position
    }

    pub fn global_forward(&self, graph: &mut SceneGraph) -> Vector {
        graph.global(self.node).forward()
    }

    /// The four far-plane corners (device-local +Z forward, winding order
    /// suitable for [`math::point_in_convex_quad`]) in world coordinates.
    fn world_corners(&self, graph: &mut SceneGraph) -> [Point; 4] {
        let half_w = self.range * (self.horizontal_fov / 2.0).tan();
        let half_h = self.range * (self.vertical_fov / 2.0).tan();
        let local_corners = [
            Point::new(-half_w, -half_h, self.range),
            Point::new(half_w, -half_h, self.range),
            Point::new(half_w, half_h, self.range),
            Point::new(-half_w, half_h, self.range),
        ];
        let global = graph.global(self.node);
        local_corners.map(|c| global.compose(&Transform::new(c, Vector::default())).position)
    }

    /// Clip `cloud` to this device's truncated-pyramid frustum (§4.D).
    pub fn points_in_fov(&self, graph: &mut SceneGraph, cloud: &PointCloud) -> PointCloud {
        let global = graph.global(self.node);
        let origin = global.position;
        let forward = global.forward();
        let corners = self.world_corners(graph);
        let edge_vectors = corners.map(|c| c - origin);

        cloud
            .iter()
            .copied()
            .filter(|&p| {
                // The line-plane construction below is symmetric through
                // `origin`, so a point exactly behind the device would
                // otherwise land at the center of the mirrored quad.
                if forward.dot(&(p - origin)) < -math::EPSILON {
                    return false;
                }
                let mut hits = [Point::ORIGIN; 4];
                for (k, v_k) in edge_vectors.iter().enumerate() {
                    match math::line_hits_plane(p, forward, origin, *v_k) {
                        Some(hit) => hits[k] = hit,
                        None => return false,
                    }
                }
                math::point_in_convex_quad(p, hits[0], hits[1], hits[2], hits[3])
            })
            .collect()
    }
}

/// Filter `cloud` by `tx`'s frustum, then by `rx`'s, reusing the
/// Tx-filtered set (§4.D "Variant (performance)"). Must equal
/// `rx.points_in_fov(graph, &tx.points_in_fov(graph, cloud))` for any
/// input — it *is* that composition, computed once so callers driving many
/// receivers against a fixed Tx don't refilter by the Tx repeatedly.
pub fn points_in_fov_chained(
    tx: &Device,
    rx: &Device,
    graph: &mut SceneGraph,
    cloud: &PointCloud,
) -> PointCloud {
    let tx_filtered = tx.points_in_fov(graph, cloud);
    rx.points_in_fov(graph, &tx_filtered)
}
