//! Exact ray-voxel intersection lengths, after Siddon's parametric method.

use itertools::Itertools;

use crate::{
    grid::ImageGrid,
    system_matrix::SystemMatrixRow,
    types::Lengthf32,
};

/// Components of the direction smaller than this are treated as zero: the ray
/// is parallel to that axis.
const PARALLEL: f32 = 1e-6;

/// Weights of the voxels of one axial plane of `grid`, crossed by the line at
/// angle `phi` and signed distance `s` from the axis.
///
/// The line is `{ s·n + t·d }`, with normal `n = (cos phi, sin phi)` and
/// direction `d = (-sin phi, cos phi)`. Each weight is the length of the line
/// inside the voxel; flat indices are those of plane 0.
pub fn ray_through_plane(grid: &ImageGrid, phi: f32, s: Lengthf32) -> SystemMatrixRow {
    let (sin, cos) = phi.sin_cos();
    let origin    = [ s * cos, s * sin];
    let direction = [-sin    , cos    ];
    let [nx, ny, _] = grid.n;
    let n    = [nx, ny];
    let half = [grid.half_width[0], grid.half_width[1]];
    let size = [grid.voxel_size[0], grid.voxel_size[1]];

    let mut row = SystemMatrixRow(Vec::with_capacity(nx + ny));

    // Parameter interval over which the line is inside the plane
    let (mut t_min, mut t_max) = (f32::NEG_INFINITY, f32::INFINITY);
    for a in 0..2 {
        if direction[a].abs() < PARALLEL {
            if origin[a].abs() >= half[a] { return row }
        } else {
            let t1 = (-half[a] - origin[a]) / direction[a];
            let t2 = ( half[a] - origin[a]) / direction[a];
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }
    }
    if t_max <= t_min { return row }

    // Parameter values where the line crosses internal voxel boundaries
    let mut crossings = vec![t_min, t_max];
    for a in 0..2 {
        if direction[a].abs() < PARALLEL { continue }
        for k in 1..n[a] {
            let t = (-half[a] + k as f32 * size[a] - origin[a]) / direction[a];
            if t > t_min && t < t_max { crossings.push(t) }
        }
    }
    crossings.sort_by(f32::total_cmp);

    // Each segment between consecutive crossings lies in a single voxel,
    // identified by the segment's midpoint
    for (&t0, &t1) in crossings.iter().tuple_windows() {
        let length = t1 - t0;
        if length <= 0.0 { continue }
        let t = 0.5 * (t0 + t1);
        let ix = voxel_index(origin[0] + t * direction[0], half[0], size[0], nx);
        let iy = voxel_index(origin[1] + t * direction[1], half[1], size[1], ny);
        row.0.push((ix + iy * nx, length));
    }
    row
}

#[inline]
fn voxel_index(x: Lengthf32, half: Lengthf32, size: Lengthf32, n: usize) -> usize {
    (((x + half) / size).floor().max(0.0) as usize).min(n - 1)
}
