//! ToF matrix synthesis and ADSIL trilateration (§4.E).

use crate::device::{points_in_fov_chained, Device};
use crate::error::AdsilError;
use crate::graph::SceneGraph;
use crate::math::EPSILON;
use crate::pointcloud::PointCloud;
use crate::scene::Scene;

/// Dense `|Tx| x |Rx|` matrix of non-negative path lengths; `0.0` means
/// "no valid closest point for that pair" (§3 ToFMatrix).
#[derive(Debug, Clone, PartialEq)]
pub struct ToFMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<f32>,
}

impl ToFMatrix {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.cells[i * self.cols + j]
    }

    fn set(&mut self, i: usize, j: usize, v: f32) {
        self.cells[i * self.cols + j] = v;
    }
}

/// Step 1: for each `(tx, rx)` pair, filter `cloud` through both devices'
/// frustums and keep the point minimizing `d(p, tx) + d(p, rx)`
/// (first-seen wins on ties). Also returns the raw cloud of every chosen
/// point across all pairs.
pub fn build_tof_matrix(
    graph: &mut SceneGraph,
    transmitters: &[Device],
    receivers: &[Device],
    cloud: &PointCloud,
) -> (ToFMatrix, PointCloud) {
    let mut matrix = ToFMatrix::new(transmitters.len(), receivers.len());
    let mut raw = PointCloud::new();

    for (i, tx) in transmitters.iter().enumerate() {
        let tx_pos = tx.global_position(graph);
        for (j, rx) in receivers.iter().enumerate() {
            let filtered = points_in_fov_chained(tx, rx, graph, cloud);
            let rx_pos = rx.global_position(graph);

            let mut best: Option<(f32, crate::math::Point)> = None;
            for &p in filtered.iter() {
                let d = p.distance_to(&tx_pos) + p.distance_to(&rx_pos);
                let replace = match best {
                    Some((bd, _)) => d < bd,
                    None => true,
                };
                if replace {
                    best = Some((d, p));
                }
            }

            if let Some((d, p)) = best {
                matrix.set(i, j, d);
                raw.push(p);
            }
        }
    }

    (matrix, raw)
}

/// Step 2 for a single Tx row. Returns the surviving trilateration
/// candidates (0, 1, or 2 points). `Err(AdsilError::Numeric(_))` signals a
/// degenerate-geometry row that the caller should skip without surfacing;
/// any other error kind is a hard failure.
fn trilaterate_row(
    graph: &mut SceneGraph,
    matrix: &ToFMatrix,
    row: usize,
    tx: &Device,
    receivers: &[Device],
) -> Result<Vec<crate::math::Point>, AdsilError> {
    let m0 = matrix.get(row, 0);
    let m1 = matrix.get(row, 1);
    let m2 = matrix.get(row, 2);
    let m3 = matrix.get(row, 3);
    if m0 <= EPSILON || m1 <= EPSILON || m2 <= EPSILON || m3 <= EPSILON {
        return Ok(Vec::new());
    }

    let r0 = m0 / 2.0;
    let (cap_r1, cap_r2, cap_r3) = (m1 - r0, m2 - r0, m3 - r0);

    let p1 = receivers[1].global_position(graph);
    let p2 = receivers[2].global_position(graph);
    let p3 = receivers[3].global_position(graph);

    let delta12 = p2 - p1;
    let d = delta12.magnitude();
    if d < EPSILON {
        return Err(AdsilError::Numeric("receivers too close".to_string()));
    }
    let e_x = delta12 * (1.0 / d);

    let c13 = p3 - p1;
    let i_coord = e_x.dot(&c13);
    let perp = c13 - e_x * i_coord;
    if perp.dot(&perp) < EPSILON {
        return Err(AdsilError::Numeric("receivers collinear".to_string()));
    }
    let e_y = perp.normalized();
    let e_z = e_x.cross(&e_y);
    let j_coord = e_y.dot(&c13);

    let x = (cap_r1 * cap_r1 - cap_r2 * cap_r2 + d * d) / (2.0 * d);
    let y = (cap_r1 * cap_r1 - cap_r3 * cap_r3 + i_coord * i_coord + j_coord * j_coord
        - 2.0 * i_coord * x)
        / (2.0 * j_coord);
    let z_sq = cap_r1 * cap_r1 - x * x - y * y;
    if z_sq < 0.0 {
        return Err(AdsilError::Numeric("no solution".to_string()));
    }
    let z = z_sq.sqrt();

    let base = p1 + e_x * x + e_y * y;
    let p_plus = base + e_z * z;
    let p_minus = base + e_z * -z;

    let candidates = PointCloud::from_points(vec![p_plus, p_minus]);
    let surviving = tx.points_in_fov(graph, &candidates);
    Ok(surviving.iter().copied().collect())
}

/// Full solve: requires exactly four receivers, builds the ToF matrix,
/// then trilaterates every Tx row. Row failures are local — they skip that
/// row's contribution and never abort the solve (§4.E).
#[tracing::instrument(skip(scene))]
pub fn solve(scene: &mut Scene, quality: u32) -> Result<PointCloud, AdsilError> {
    if scene.vehicle().receivers.len() != 4 {
        return Err(AdsilError::Configuration(
            "ADSIL requires exactly 4 receivers".to_string(),
        ));
    }

    let cloud = scene.merged_cloud(quality);
    let transmitters = scene.vehicle().transmitters.clone();
    let receivers = scene.vehicle().receivers.clone();
    let graph = scene.graph_mut();

    let (matrix, _raw) = build_tof_matrix(graph, &transmitters, &receivers, &cloud);

    let mut output = PointCloud::new();
    for (i, tx) in transmitters.iter().enumerate() {
        match trilaterate_row(graph, &matrix, i, tx, &receivers) {
            Ok(candidates) => output.extend(candidates),
            Err(AdsilError::Numeric(reason)) => {
                tracing::debug!(row = i, reason = %reason, "skipping ADSIL trilateration row");
            }
            Err(other) => return Err(other),
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{deg_to_rad, Point, Vector};
    use crate::transform::Transform;
    use crate::vehicle::Vehicle;

    fn wide_device(graph: &mut SceneGraph, pos: Point, name: &str) -> Device {
        Device::new(
            graph,
            Transform::new(pos, Vector::default()),
            deg_to_rad(120.0),
            deg_to_rad(120.0),
            1000.0,
            name,
        )
        .unwrap()
    }

    fn build_scene(receiver_positions: &[Point]) -> Scene {
        let mut graph = SceneGraph::new();
        let tx = wide_device(&mut graph, Point::ORIGIN, "tx");
        let receivers = receiver_positions
            .iter()
            .enumerate()
            .map(|(i, &p)| wide_device(&mut graph, p, &format!("rx{i}")))
            .collect();
        let vehicle = Vehicle::new(&mut graph, Transform::identity(), (1.0, 1.0, 1.0), vec![tx], receivers).unwrap();
        Scene::new(graph, vehicle)
    }

    #[test]
    fn s1_degenerate_empty_cloud_solves_to_empty_output() {
        let mut scene = build_scene(&[
            Point::new(3.0, 0.0, 0.0),
            Point::new(0.0, 3.0, 0.0),
            Point::new(0.0, 0.0, 3.0),
            Point::new(2.0, 2.0, 2.0),
        ]);
        let out = solve(&mut scene, 9).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn s2_three_receivers_rejected() {
        let mut scene = build_scene(&[
            Point::new(3.0, 0.0, 0.0),
            Point::new(0.0, 3.0, 0.0),
            Point::new(0.0, 0.0, 3.0),
        ]);
        let err = solve(&mut scene, 9);
        assert!(matches!(err, Err(AdsilError::Configuration(_))));
    }

    #[test]
    fn s3_single_point_produces_detection() {
        let mut scene = build_scene(&[
            Point::new(3.0, 0.0, 0.0),
            Point::new(0.0, 3.0, 0.0),
            Point::new(0.0, 0.0, 3.0),
            Point::new(2.0, 2.0, 2.0),
        ]);
        scene.set_external_cloud(PointCloud::from_points(vec![Point::new(5.0, 0.0, 0.0)]));
        let out = solve(&mut scene, 9).unwrap();
        assert!(!out.is_empty());
    }

    /// §8 property 6: swapping which device plays Tx and which plays Rx
    /// leaves `M[i][j]` unchanged, since path length is symmetric.
    #[test]
    fn tof_matrix_symmetric_under_device_swap() {
        let mut g = SceneGraph::new();
        let a = wide_device(&mut g, Point::new(-2.0, 0.0, 0.0), "a");
        let b = wide_device(&mut g, Point::new(2.0, 0.0, 0.0), "b");
        let cloud = PointCloud::from_points(vec![Point::new(0.0, 0.0, 5.0)]);

        let (m_ab, _) = build_tof_matrix(&mut g, std::slice::from_ref(&a), std::slice::from_ref(&b), &cloud);
        let (m_ba, _) = build_tof_matrix(&mut g, std::slice::from_ref(&b), std::slice::from_ref(&a), &cloud);

        assert!((m_ab.get(0, 0) - m_ba.get(0, 0)).abs() < 1e-4);
        assert!(m_ab.get(0, 0) > 0.0);
    }

    /// §8 property 7: when two candidate points tie on `d(p, tx) + d(p,
    /// rx)`, the one earlier in the cloud's iteration order wins.
    #[test]
    fn closest_point_tie_break_prefers_first_seen() {
        let mut g = SceneGraph::new();
        // Tx and Rx collocated at the origin so the tie reduces to equal
        // distance from the origin.
        let tx = wide_device(&mut g, Point::ORIGIN, "tx");
        let rx = wide_device(&mut g, Point::ORIGIN, "rx");
        let p1 = Point::new(0.0, 0.0, 5.0);
        let p2 = Point::new(4.0, 0.0, 3.0); // same magnitude (5), different direction
        let cloud = PointCloud::from_points(vec![p1, p2]);

        let (matrix, raw) = build_tof_matrix(
            &mut g,
            std::slice::from_ref(&tx),
            std::slice::from_ref(&rx),
            &cloud,
        );
        assert!((matrix.get(0, 0) - 10.0).abs() < 1e-4);
        assert_eq!(raw.iter().next().copied(), Some(p1));
    }

    /// §8 property 8 / scenario S3: inject a single synthetic reflector with
    /// a transmitter and receiver 0 collocated at the origin; the ADSIL
    /// trilateration must recover it to within `1e-3`.
    #[test]
    fn trilateration_round_trip_recovers_injected_point() {
        let mut g = SceneGraph::new();
        let tx = wide_device(&mut g, Point::ORIGIN, "tx");
        let r0 = wide_device(&mut g, Point::ORIGIN, "r0");
        let r1 = wide_device(&mut g, Point::new(3.0, 0.0, 0.0), "r1");
        let r2 = wide_device(&mut g, Point::new(0.0, 3.0, 0.0), "r2");
        let r3 = wide_device(&mut g, Point::new(0.0, 0.0, 3.0), "r3");
        let vehicle = Vehicle::new(
            &mut g,
            Transform::identity(),
            (1.0, 1.0, 1.0),
            vec![tx],
            vec![r0, r1, r2, r3],
        )
        .unwrap();
        let mut scene = Scene::new(g, vehicle);

        let target = Point::new(5.0, 2.0, 1.0);
        scene.set_external_cloud(PointCloud::from_points(vec![target]));

        let out = solve(&mut scene, 9).unwrap();
        assert!(
            out.iter().any(|p| p.distance_to(&target) < 1e-3),
            "expected a candidate within 1e-3 of the injected point, got {out:?}"
        );
    }

    /// §8 property 8 (mirror disambiguation half): a narrow Tx FOV admits
    /// the true reflector and rejects its mirror across the receiver plane.
    /// Receivers and target are chosen so the trilateration frame's `e_z`
    /// axis is exactly `(0, 0, -1)`, making the mirror land at the target's
    /// point reflected through `z = 0` — squarely behind a forward-facing
    /// narrow cone.
    #[test]
    fn mirror_candidate_rejected_outside_narrow_tx_fov() {
        let mut g = SceneGraph::new();
        let tx = Device::new(
            &mut g,
            Transform::identity(),
            deg_to_rad(30.0),
            deg_to_rad(30.0),
            1000.0,
            "tx",
        )
        .unwrap();
        let r0 = wide_device(&mut g, Point::ORIGIN, "r0");
        let r1 = wide_device(&mut g, Point::new(1.0, 0.0, 0.0), "r1");
        let r2 = wide_device(&mut g, Point::new(-1.0, 0.0, 0.0), "r2");
        let r3 = wide_device(&mut g, Point::new(0.0, 1.0, 0.0), "r3");
        let receivers = vec![r0, r1, r2, r3];

        // Hand-derived: with these receivers, e_x = (-1,0,0), e_y = (0,1,0),
        // e_z = (0,0,-1), so p_minus reproduces the target exactly and
        // p_plus is its mirror across z = 0.
        let target = Point::new(0.3, 0.2, 2.0);
        let cloud = PointCloud::from_points(vec![target]);
        let (matrix, _raw) = build_tof_matrix(&mut g, std::slice::from_ref(&tx), &receivers, &cloud);

        let candidates = trilaterate_row(&mut g, &matrix, 0, &tx, &receivers).unwrap();
        assert!(candidates.iter().any(|p| p.distance_to(&target) < 1e-3));
        assert!(
            !candidates
                .iter()
                .any(|p| p.distance_to(&Point::new(0.3, 0.2, -2.0)) < 1e-3),
            "mirror point behind the narrow Tx FOV must not survive: {candidates:?}"
        );
    }
}
