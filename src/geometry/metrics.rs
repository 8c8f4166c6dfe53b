//! Planar polygon metrics used by face ordering, validation and reconstruction.
//!
//! Rings are open: the closing vertex is implied and never repeated. All
//! functions treat coordinates as planar, so callers working on geographic
//! coordinates get degree-based areas.

const EPS: f64 = 1e-12;

/// Mean of the ring's vertices.
///
/// Returns `None` for an empty ring.
pub fn vertex_centroid(ring: &[[f64; 2]]) -> Option<[f64; 2]> {
    if ring.is_empty() {
        return None;
    }
    let n = ring.len() as f64;
    let (sx, sy) = ring
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
    Some([sx / n, sy / n])
}

/// Signed shoelace area; positive for counter-clockwise rings.
pub fn signed_area(ring: &[[f64; 2]]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for (i, p) in ring.iter().enumerate() {
        let q = ring[(i + 1) % ring.len()];
        acc += p[0] * q[1] - q[0] * p[1];
    }
    0.5 * acc
}

/// Unsigned polygon area.
pub fn polygon_area(ring: &[[f64; 2]]) -> f64 {
    signed_area(ring).abs()
}

/// Area-weighted centroid. Falls back to `None` for zero-area rings.
pub fn area_centroid(ring: &[[f64; 2]]) -> Option<[f64; 2]> {
    let area = signed_area(ring);
    if area.abs() < EPS {
        return None;
    }
    let (mut cx, mut cy) = (0.0, 0.0);
    for (i, p) in ring.iter().enumerate() {
        let q = ring[(i + 1) % ring.len()];
        let cross = p[0] * q[1] - q[0] * p[1];
        cx += (p[0] + q[0]) * cross;
        cy += (p[1] + q[1]) * cross;
    }
    Some([cx / (6.0 * area), cy / (6.0 * area)])
}

/// Polar angle of `p` about `center`, in `(-pi, pi]`.
#[inline]
pub fn polar_angle(p: [f64; 2], center: [f64; 2]) -> f64 {
    (p[1] - center[1]).atan2(p[0] - center[0])
}

/// `true` when no two non-adjacent ring segments touch or cross and the ring
/// encloses a non-zero area.
///
/// Quadratic in the ring length; faces are small.
pub fn is_simple(ring: &[[f64; 2]]) -> bool {
    let n = ring.len();
    if n < 3 || polygon_area(ring) < EPS {
        return false;
    }
    for i in 0..n {
        let a0 = ring[i];
        let a1 = ring[(i + 1) % n];
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if adjacent {
                continue;
            }
            let b0 = ring[j];
            let b1 = ring[(j + 1) % n];
            if segments_intersect(a0, a1, b0, b1) {
                return false;
            }
        }
    }
    true
}

fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn on_segment(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> bool {
    p[0] >= a[0].min(b[0]) - EPS
        && p[0] <= a[0].max(b[0]) + EPS
        && p[1] >= a[1].min(b[1]) - EPS
        && p[1] <= a[1].max(b[1]) + EPS
}

fn segments_intersect(a0: [f64; 2], a1: [f64; 2], b0: [f64; 2], b1: [f64; 2]) -> bool {
    let d1 = orient(b0, b1, a0);
    let d2 = orient(b0, b1, a1);
    let d3 = orient(a0, a1, b0);
    let d4 = orient(a0, a1, b1);

    if ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS))
        && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
    {
        return true;
    }
    (d1.abs() <= EPS && on_segment(b0, b1, a0))
        || (d2.abs() <= EPS && on_segment(b0, b1, a1))
        || (d3.abs() <= EPS && on_segment(a0, a1, b0))
        || (d4.abs() <= EPS && on_segment(a0, a1, b1))
}
