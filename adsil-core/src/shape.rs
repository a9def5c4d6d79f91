//! Solid-obstacle primitives and their surface-mesh point samplers (§3/§4.C).

use crate::graph::{NodeId, SceneGraph};
use crate::math::{Point, Vector};
use crate::pointcloud::PointCloud;
use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Cube { side: f32 },
    Cylinder { height: f32, radius: f32 },
}

struct MeshCache {
    quality: u32,
    mesh: PointCloud,
}

pub struct Shape {
    node: NodeId,
    kind: ShapeKind,
    pub name: String,
    cache: Option<MeshCache>,
}

impl Shape {
    pub fn new(graph: &mut SceneGraph, local: Transform, kind: ShapeKind, name: impl Into<String>) -> Self {
        Self {
            node: graph.insert(local),
            kind,
            name: name.into(),
            cache: None,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Regenerate (or reuse the cached) surface mesh for `quality`. The
    /// cache is invalidated whenever the node's global transform is dirty
    /// (§4.C "invalidated when the shape's TransformNode becomes dirty") or
    /// the requested quality doesn't match what's cached; intrinsic
    /// parameter changes go through [`Self::set_kind`], which clears the
    /// cache directly.
    pub fn surface_mesh(&mut self, graph: &mut SceneGraph, quality: u32) -> PointCloud {
        let stale = graph.is_dirty(self.node)
            || !matches!(&self.cache, Some(c) if c.quality == quality);
        if stale {
            let global = graph.global(self.node);
            let mesh = match self.kind {
                ShapeKind::Cube { side } => cube_mesh(global, side, quality),
                ShapeKind::Cylinder { height, radius } => cylinder_mesh(global, height, radius, quality),
            };
            self.cache = Some(MeshCache { quality, mesh });
        }
        self.cache.as_ref().unwrap().mesh.clone()
    }

    /// Replace the shape's kind and drop any cached mesh.
    pub fn set_kind(&mut self, kind: ShapeKind) {
        self.kind = kind;
        self.cache = None;
    }
}

fn to_world(global: &Transform, local: Point) -> Point {
    global.compose(&Transform::new(local, Vector::default())).position
}

fn cube_mesh(global: Transform, side: f32, quality: u32) -> PointCloud {
    let n = (quality as f32).sqrt().round().max(2.0) as u32;
    let half = side / 2.0;
    let step = side / (n - 1) as f32;

    struct Face {
        normal: Vector,
        u_axis: Vector,
        v_axis: Vector,
    }
    let faces = [
        Face { normal: Vector::new(1.0, 0.0, 0.0), u_axis: Vector::new(0.0, 1.0, 0.0), v_axis: Vector::new(0.0, 0.0, 1.0) },
        Face { normal: Vector::new(-1.0, 0.0, 0.0), u_axis: Vector::new(0.0, 1.0, 0.0), v_axis: Vector::new(0.0, 0.0, 1.0) },
        Face { normal: Vector::new(0.0, 1.0, 0.0), u_axis: Vector::new(1.0, 0.0, 0.0), v_axis: Vector::new(0.0, 0.0, 1.0) },
        Face { normal: Vector::new(0.0, -1.0, 0.0), u_axis: Vector::new(1.0, 0.0, 0.0), v_axis: Vector::new(0.0, 0.0, 1.0) },
        Face { normal: Vector::new(0.0, 0.0, 1.0), u_axis: Vector::new(1.0, 0.0, 0.0), v_axis: Vector::new(0.0, 1.0, 0.0) },
        Face { normal: Vector::new(0.0, 0.0, -1.0), u_axis: Vector::new(1.0, 0.0, 0.0), v_axis: Vector::new(0.0, 1.0, 0.0) },
    ];

    let mut mesh = PointCloud::new();
    for face in &faces {
        let center = face.normal * half;
        for i in 0..n {
            let u = -half + step * i as f32;
            for j in 0..n {
                let v = -half + step * j as f32;
                let local = center + face.u_axis * u + face.v_axis * v;
                mesh.push(to_world(&global, Point::new(local.x, local.y, local.z)));
            }
        }
    }
    mesh
}

fn cylinder_mesh(global: Transform, height: f32, radius: f32, quality: u32) -> PointCloud {
    let circ_res = quality.max(8);
    let height_res = (quality / 2).max(2);
    let half_h = height / 2.0;

    let mut mesh = PointCloud::new();

    for &z in &[-half_h, half_h] {
        for k in 0..circ_res {
            let angle = 2.0 * std::f32::consts::PI * k as f32 / circ_res as f32;
            let local = Point::new(radius * angle.cos(), radius * angle.sin(), z);
            mesh.push(to_world(&global, local));
        }
    }

    let z_step = if height_res > 1 { height / (height_res - 1) as f32 } else { 0.0 };
    for k in 0..circ_res {
        let angle = 2.0 * std::f32::consts::PI * k as f32 / circ_res as f32;
        let (x, y) = (radius * angle.cos(), radius * angle.sin());
        for m in 0..height_res {
            let z = -half_h + z_step * m as f32;
            mesh.push(to_world(&global, Point::new(x, y, z)));
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_mesh_count_matches_invariant() {
        let mut g = SceneGraph::new();
        let mut cube = Shape::new(&mut g, Transform::identity(), ShapeKind::Cube { side: 2.0 }, "c");
        let quality = 9;
        let n = (quality as f32).sqrt().round().max(2.0) as u32;
        let mesh = cube.surface_mesh(&mut g, quality);
        assert_eq!(mesh.len(), 6 * (n * n) as usize);
    }

    #[test]
    fn cylinder_mesh_count_matches_invariant() {
        let mut g = SceneGraph::new();
        let mut cyl = Shape::new(
            &mut g,
            Transform::identity(),
            ShapeKind::Cylinder { height: 4.0, radius: 1.0 },
            "cyl",
        );
        let quality = 12;
        let circ_res = quality.max(8);
        let height_res = (quality / 2).max(2);
        let mesh = cyl.surface_mesh(&mut g, quality);
        assert_eq!(mesh.len() as u32, 2 * circ_res + circ_res * height_res);
    }

    #[test]
    fn cache_reused_until_dirtied() {
        let mut g = SceneGraph::new();
        let mut cube = Shape::new(&mut g, Transform::identity(), ShapeKind::Cube { side: 2.0 }, "c");
        let first = cube.surface_mesh(&mut g, 9);
        let second = cube.surface_mesh(&mut g, 9);
        assert_eq!(first, second);

        g.set_local(cube.node(), Transform::new(Point::new(1.0, 0.0, 0.0), Vector::default()));
        let after_move = cube.surface_mesh(&mut g, 9);
        assert_ne!(first, after_move);
    }
}
