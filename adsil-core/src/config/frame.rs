//! The per-frame file wire schema and directory scan (§6 "Frame file
//! layout"), grounded in `FrameBufferManager::loadFrame`/`loadWindowAround`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::PointWire;
use crate::error::AdsilError;
use crate::frame::Frame;
use crate::math::Vector;
use crate::pointcloud::PointCloud;

#[derive(Debug, Deserialize)]
struct FrameFileWire {
    timestamp: f64,
    cloud: Vec<PointWire>,
    #[serde(default)]
    linear_acceleration: Option<[f32; 3]>,
    #[serde(default)]
    angular_velocity: Option<[f32; 3]>,
}

/// `frame_` + 5-digit zero-padded index + `suffix` (e.g. `.json`).
pub fn frame_file_name(index: usize, suffix: &str) -> String {
    format!("frame_{index:05}{suffix}")
}

pub fn frame_path(dir: &Path, index: usize, suffix: &str) -> PathBuf {
    dir.join(frame_file_name(index, suffix))
}

/// Count the contiguous `[0, N)` run of `frame_XXXXX<suffix>` files in
/// `dir` by probing upward from zero until a missing index is found — the
/// player's "`N` computed once at construction by scanning `D`" (§4.G).
pub fn count_frames(dir: &Path, suffix: &str) -> usize {
    let mut n = 0;
    while frame_path(dir, n, suffix).is_file() {
        n += 1;
    }
    n
}

/// Parse a frame file's JSON contents. `file_path` is stamped onto the
/// resulting [`Frame`] (the source frame carries no `filePath` field of
/// its own).
pub fn parse_frame(json: &str, file_path: String) -> Result<Frame, AdsilError> {
    let wire: FrameFileWire =
        serde_json::from_str(json).map_err(|e| AdsilError::Parse(e.to_string()))?;
    let cloud: PointCloud = wire.cloud.into_iter().map(crate::math::Point::from).collect();
    Ok(Frame {
        timestamp: wire.timestamp,
        cloud,
        file_path,
        linear_acceleration: wire.linear_acceleration.map(|[x, y, z]| Vector::new(x, y, z)),
        angular_velocity: wire.angular_velocity.map(|[x, y, z]| Vector::new(x, y, z)),
    })
}

/// Synchronously load and parse `frame_{index}{suffix}` from `dir`.
pub fn load_frame_sync(dir: &Path, index: usize, suffix: &str) -> Result<Frame, AdsilError> {
    let path = frame_path(dir, index, suffix);
    let json = std::fs::read_to_string(&path)?;
    parse_frame(&json, path.to_string_lossy().into_owned())
}
