//! The composite rigid body carrying transmitters and receivers (§3).

use crate::device::Device;
use crate::error::AdsilError;
use crate::graph::{NodeId, SceneGraph};
use crate::math::Point;
use crate::transform::Transform;

/// Default tolerance for the receiver-0/transmitter collocation warning
/// (§9 "Open question — receiver 0 collocation"). The solver does not
/// validate this; it is purely an operator-visibility check.
pub const DEFAULT_COLLOCATION_TOLERANCE: f32 = 1e-2;

pub struct Vehicle {
    root: NodeId,
    /// (length, width, height)
    pub dimension: (f32, f32, f32),
    pub transmitters: Vec<Device>,
    pub receivers: Vec<Device>,
    trajectory: Vec<Point>,
}

impl Vehicle {
    /// Constructs the vehicle root node and reparents every transmitter
    /// and receiver device under it, so devices move with the vehicle
    /// (§3 Vehicle invariant). Seeds the trajectory with the initial
    /// global position.
    pub fn new(
        graph: &mut SceneGraph,
        root_local: Transform,
        dimension: (f32, f32, f32),
        transmitters: Vec<Device>,
        receivers: Vec<Device>,
    ) -> Result<Self, AdsilError> {
        let (length, width, height) = dimension;
        if !(length > 0.0 && width > 0.0 && height > 0.0) {
            return Err(AdsilError::Configuration(
                "vehicle dimension must be strictly positive".to_string(),
            ));
        }

        let root = graph.insert(root_local);
        for d in transmitters.iter().chain(receivers.iter()) {
            graph.set_parent(d.node(), Some(root))?;
        }

        warn_if_not_collocated(graph, &transmitters, &receivers);

        let trajectory = vec![graph.global(root).position];
        Ok(Self {
            root,
            dimension,
            transmitters,
            receivers,
            trajectory,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn global_position(&self, graph: &mut SceneGraph) -> Point {
        graph.global(self.root).position
    }

    pub fn trajectory(&self) -> &[Point] {
        &self.trajectory
    }

    /// Move the vehicle root to `position` (world coordinates), appending
    /// the resulting global position to the trajectory.
    pub fn move_to(&mut self, graph: &mut SceneGraph, position: Point) {
        let mut local = graph.local(self.root);
        local.position = position;
        graph.set_local(self.root, local);
        self.trajectory.push(graph.global(self.root).position);
    }
}

fn warn_if_not_collocated(graph: &mut SceneGraph, transmitters: &[Device], receivers: &[Device]) {
    let Some(r0) = receivers.first() else { return };
    let r0_pos = r0.global_position(graph);
    for tx in transmitters {
        let d = tx.global_position(graph).distance_to(&r0_pos);
        if d > DEFAULT_COLLOCATION_TOLERANCE {
            tracing::warn!(
                distance = d,
                tolerance = DEFAULT_COLLOCATION_TOLERANCE,
                "receiver 0 is not collocated with transmitter {:?}; ADSIL's bistatic R0 assumption may not hold",
                tx.name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{deg_to_rad, Vector};

    fn device(graph: &mut SceneGraph, x: f32) -> Device {
        Device::new(
            graph,
            Transform::new(Point::new(x, 0.0, 0.0), Vector::default()),
            deg_to_rad(60.0),
            deg_to_rad(60.0),
            10.0,
            "d",
        )
        .unwrap()
    }

    #[test]
    fn devices_reparented_under_vehicle_root_move_with_it() {
        let mut g = SceneGraph::new();
        let tx = device(&mut g, 1.0);
        let rx = device(&mut g, -1.0);
        let mut v = Vehicle::new(
            &mut g,
            Transform::identity(),
            (4.0, 2.0, 1.0),
            vec![tx],
            vec![rx],
        )
        .unwrap();

        v.move_to(&mut g, Point::new(10.0, 0.0, 0.0));
        assert_eq!(v.transmitters[0].global_position(&mut g), Point::new(11.0, 0.0, 0.0));
        assert_eq!(v.receivers[0].global_position(&mut g), Point::new(9.0, 0.0, 0.0));
    }

    #[test]
    fn trajectory_records_each_move() {
        let mut g = SceneGraph::new();
        let mut v = Vehicle::new(&mut g, Transform::identity(), (4.0, 2.0, 1.0), vec![], vec![]).unwrap();
        assert_eq!(v.trajectory().len(), 1);
        v.move_to(&mut g, Point::new(1.0, 0.0, 0.0));
        v.move_to(&mut g, Point::new(2.0, 0.0, 0.0));
        assert_eq!(v.trajectory().len(), 3);
        assert_eq!(v.trajectory()[2], Point::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn rejects_nonpositive_dimension() {
        let mut g = SceneGraph::new();
        let err = Vehicle::new(&mut g, Transform::identity(), (0.0, 2.0, 1.0), vec![], vec![]);
        assert!(err.is_err());
    }
}
