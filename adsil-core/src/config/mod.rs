//! Wire-format adapters: JSON scene/vehicle configuration and per-frame
//! files (§6), plus the resource-directory resolver.

pub mod frame;
pub mod scene;

use std::path::PathBuf;

/// Resolve the base resource directory from `ADSIL_RESOURCE_DIR`, falling
/// back to a compiled-in default if unset (§6 "environment variables
/// consumed").
pub fn resource_dir() -> PathBuf {
    std::env::var("ADSIL_RESOURCE_DIR")
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./resources"))
}

/// A point as it appears on the wire: either `{x, y, z}` or `[x, y, z]`
/// (§6 frame file layout).
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(untagged)]
pub enum PointWire {
    Array([f32; 3]),
    Object { x: f32, y: f32, z: f32 },
}

impl From<PointWire> for crate::math::Point {
    fn from(w: PointWire) -> Self {
        match w {
            PointWire::Array([x, y, z]) => crate::math::Point::new(x, y, z),
            PointWire::Object { x, y, z } => crate::math::Point::new(x, y, z),
        }
    }
}

impl From<PointWire> for crate::math::Vector {
    fn from(w: PointWire) -> Self {
        let p: crate::math::Point = w.into();
        crate::math::Vector::new(p.x, p.y, p.z)
    }
}
