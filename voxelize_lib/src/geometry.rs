//! Triangle / AABB overlap test used by the surface voxelizer
//!
//! Implements the separating axis theorem (SAT) test popularized by Akenine-Möller for
//! triangle/box intersection: a box and a triangle are disjoint iff there exists a
//! separating axis among the box's 3 face normals, the triangle's face normal, and the 9
//! cross products of each box edge with each triangle edge.

use nalgebra::Vector3;

use crate::Real;

/// Returns `true` if the axis-aligned box centered at `box_center` with half-extents
/// `box_half` overlaps the triangle `tri`.
pub fn triangle_box_overlap<R: Real>(
    box_center: &Vector3<R>,
    box_half: &Vector3<R>,
    tri: &[Vector3<R>; 3],
) -> bool {
    let v0 = tri[0] - box_center;
    let v1 = tri[1] - box_center;
    let v2 = tri[2] - box_center;

    let e0 = v1 - v0;
    let e1 = v2 - v1;
    let e2 = v0 - v2;

    // 3 box face normal axes: separation along x/y/z iff the triangle's own AABB misses
    // the box's extent on that axis.
    if !overlap_on_box_axes(&v0, &v1, &v2, box_half) {
        return false;
    }

    // 9 cross-product axes (box edge x triangle edge).
    let edges = [e0, e1, e2];
    for edge in &edges {
        if !overlap_on_axis(Vector3::new(R::zero(), -edge.z, edge.y), &v0, &v1, &v2, box_half) {
            return false;
        }
        if !overlap_on_axis(Vector3::new(edge.z, R::zero(), -edge.x), &v0, &v1, &v2, box_half) {
            return false;
        }
        if !overlap_on_axis(Vector3::new(-edge.y, edge.x, R::zero()), &v0, &v1, &v2, box_half) {
            return false;
        }
    }

    // Triangle face normal axis.
    let normal = e0.cross(&e1);
    if !overlap_on_axis(normal, &v0, &v1, &v2, box_half) {
        return false;
    }

    true
}

fn overlap_on_box_axes<R: Real>(
    v0: &Vector3<R>,
    v1: &Vector3<R>,
    v2: &Vector3<R>,
    box_half: &Vector3<R>,
) -> bool {
    let min_x = v0.x.min(v1.x).min(v2.x);
    let max_x = v0.x.max(v1.x).max(v2.x);
    if min_x > box_half.x || max_x < -box_half.x {
        return false;
    }
    let min_y = v0.y.min(v1.y).min(v2.y);
    let max_y = v0.y.max(v1.y).max(v2.y);
    if min_y > box_half.y || max_y < -box_half.y {
        return false;
    }
    let min_z = v0.z.min(v1.z).min(v2.z);
    let max_z = v0.z.max(v1.z).max(v2.z);
    if min_z > box_half.z || max_z < -box_half.z {
        return false;
    }
    true
}

/// Tests whether `axis` separates the (already box-centered) triangle `(v0,v1,v2)` from a
/// box of half-extents `box_half` centered at the origin. A near-zero axis (can arise from
/// degenerate/collinear triangle edges) is treated as non-separating.
fn overlap_on_axis<R: Real>(
    axis: Vector3<R>,
    v0: &Vector3<R>,
    v1: &Vector3<R>,
    v2: &Vector3<R>,
    box_half: &Vector3<R>,
) -> bool {
    if axis.norm_squared() <= R::from(1e-20).unwrap() {
        return true;
    }
    let p0 = axis.dot(v0);
    let p1 = axis.dot(v1);
    let p2 = axis.dot(v2);
    let min_p = p0.min(p1).min(p2);
    let max_p = p0.max(p1).max(p2);
    let r = box_half.x * axis.x.abs() + box_half.y * axis.y.abs() + box_half.z * axis.z.abs();
    !(min_p > r || max_p < -r)
}
