//! Scene/vehicle configuration wire schema and its fallible conversion into
//! the internal, radian-based scene graph types (§6, §9 degrees/radians
//! note).

use serde::Deserialize;

use super::PointWire;
use crate::device::Device;
use crate::error::AdsilError;
use crate::graph::SceneGraph;
use crate::math::deg_to_rad;
use crate::scene::Scene;
use crate::shape::{Shape, ShapeKind};
use crate::transform::Transform;
use crate::vehicle::Vehicle;

#[derive(Debug, Deserialize)]
pub struct SceneConfig {
    pub vehicle: VehicleConfig,
    #[serde(default)]
    pub shapes: Vec<ShapeConfig>,
}

#[derive(Debug, Deserialize)]
pub struct VehicleConfig {
    pub origin: PointWire,
    pub orientation: PointWire,
    pub dimension: DimensionConfig,
    #[serde(default)]
    pub transmitters: Vec<DeviceConfig>,
    #[serde(default)]
    pub receivers: Vec<DeviceConfig>,
}

#[derive(Debug, Deserialize)]
pub struct DimensionConfig {
    pub length: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    #[serde(alias = "origin")]
    pub position: PointWire,
    pub orientation: PointWire,
    pub horizontal_fov_deg: f32,
    pub vertical_fov_deg: f32,
    pub range: f32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeConfig {
    Cube {
        origin: PointWire,
        orientation: PointWire,
        dimension: f32,
        name: String,
    },
    Cylinder {
        origin: PointWire,
        orientation: PointWire,
        height: f32,
        radius: f32,
        name: String,
    },
}

impl DeviceConfig {
    /// Degree-to-radian conversion for orientation and both FOVs happens
    /// exactly here, at the load boundary (§9).
    fn build(self, graph: &mut SceneGraph) -> Result<Device, AdsilError> {
        let position = self.position.into();
        let orientation_deg: crate::math::Vector = self.orientation.into();
        let orientation = crate::math::Vector::new(
            deg_to_rad(orientation_deg.x),
            deg_to_rad(orientation_deg.y),
            deg_to_rad(orientation_deg.z),
        );
        Device::new(
            graph,
            Transform::new(position, orientation),
            deg_to_rad(self.horizontal_fov_deg),
            deg_to_rad(self.vertical_fov_deg),
            self.range,
            self.name,
        )
    }
}

impl ShapeConfig {
    fn build(self, graph: &mut SceneGraph) -> Shape {
        match self {
            ShapeConfig::Cube { origin, orientation, dimension, name } => {
                let local = wire_transform(origin, orientation);
                Shape::new(graph, local, ShapeKind::Cube { side: dimension }, name)
            }
            ShapeConfig::Cylinder { origin, orientation, height, radius, name } => {
                let local = wire_transform(origin, orientation);
                Shape::new(graph, local, ShapeKind::Cylinder { height, radius }, name)
            }
        }
    }
}

fn wire_transform(origin: PointWire, orientation: PointWire) -> Transform {
    let position = origin.into();
    let orientation_deg: crate::math::Vector = orientation.into();
    let orientation = crate::math::Vector::new(
        deg_to_rad(orientation_deg.x),
        deg_to_rad(orientation_deg.y),
        deg_to_rad(orientation_deg.z),
    );
    Transform::new(position, orientation)
}

impl SceneConfig {
    pub fn parse(json: &str) -> Result<Self, AdsilError> {
        serde_json::from_str(json).map_err(|e| AdsilError::Parse(e.to_string()))
    }

    /// Build a [`Scene`] (with its own fresh [`SceneGraph`]) from this
    /// configuration.
    pub fn build(self) -> Result<Scene, AdsilError> {
        let mut graph = SceneGraph::new();

        let vehicle_orientation_deg: crate::math::Vector = self.vehicle.orientation.into();
        let vehicle_orientation = crate::math::Vector::new(
            deg_to_rad(vehicle_orientation_deg.x),
            deg_to_rad(vehicle_orientation_deg.y),
            deg_to_rad(vehicle_orientation_deg.z),
        );
        let root_local = Transform::new(self.vehicle.origin.into(), vehicle_orientation);

        let transmitters = self
            .vehicle
            .transmitters
            .into_iter()
            .map(|d| d.build(&mut graph))
            .collect::<Result<Vec<_>, _>>()?;
        let receivers = self
            .vehicle
            .receivers
            .into_iter()
            .map(|d| d.build(&mut graph))
            .collect::<Result<Vec<_>, _>>()?;

        let dimension = (
            self.vehicle.dimension.length,
            self.vehicle.dimension.width,
            self.vehicle.dimension.height,
        );
        let vehicle = Vehicle::new(&mut graph, root_local, dimension, transmitters, receivers)?;

        let mut scene = Scene::new(graph, vehicle);
        for shape_config in self.shapes {
            let shape = shape_config.build(scene.graph_mut());
            scene.add_shape(shape);
        }
        Ok(scene)
    }
}
