//! Geometry kernel: points, rays, line segments, and crown polygons.
//!
//! All geometry lives in the vertical plane along the wind direction —
//! `x` is horizontal distance, `y` is height above the surface at `x = 0`.

use serde::{Deserialize, Serialize};

use super::numerics::almost_zero;
use super::units::Radians;
use crate::error::ModelError;

/// A point in the vertical wind-aligned plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Coord { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Coord) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    #[must_use]
    pub fn angle_to(self, other: Coord) -> Radians {
        Radians((other.y - self.y).atan2(other.x - self.x))
    }

    #[must_use]
    pub fn translated(self, distance: f64, angle: Radians) -> Coord {
        Coord {
            x: self.x + distance * angle.0.cos(),
            y: self.y + distance * angle.0.sin(),
        }
    }

    fn sub(self, other: Coord) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }
}

fn cross(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.0 * b.1 - a.1 * b.0
}

/// A line defined by a point it passes through and a slope angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub point: Coord,
    pub angle: Radians,
}

impl Line {
    #[must_use]
    pub fn new(point: Coord, angle: Radians) -> Self {
        Line { point, angle }
    }

    /// A horizontal line through `point`, used for the surface and for
    /// the horizontal projection lines used during drying-factor
    /// computation.
    #[must_use]
    pub fn horizontal_through(point: Coord) -> Self {
        Line {
            point,
            angle: Radians(0.0),
        }
    }

    /// This line's intersection with `other`, or `None` if the two are
    /// parallel.
    #[must_use]
    pub fn intersect(&self, other: &Line) -> Option<Coord> {
        let d1 = (self.angle.0.cos(), self.angle.0.sin());
        let d2 = (other.angle.0.cos(), other.angle.0.sin());
        let denom = cross(d1, d2);
        if almost_zero(denom) {
            return None;
        }
        let diff = other.point.sub(self.point);
        let t = cross(diff, d2) / denom;
        Some(Coord {
            x: self.point.x + t * d1.0,
            y: self.point.y + t * d1.1,
        })
    }

    /// The point on this line such that a ray of `angle` from it passes
    /// through `target`.
    ///
    /// # Errors
    /// Returns [`ModelError::GeometryFailure`] if `angle` is parallel to
    /// this line (no such point exists, or every point on the line
    /// qualifies).
    pub fn origin_on_line(&self, target: Coord, angle: Radians) -> Result<Coord, ModelError> {
        let line_dir = (self.angle.0.cos(), self.angle.0.sin());
        let ray_dir = (angle.0.cos(), angle.0.sin());
        let denom = cross(line_dir, ray_dir);
        if almost_zero(denom) {
            return Err(ModelError::GeometryFailure {
                detail: "ray angle is parallel to the line".to_string(),
            });
        }
        let to_target = target.sub(self.point);
        let s = cross(to_target, ray_dir) / denom;
        Ok(Coord {
            x: self.point.x + s * line_dir.0,
            y: self.point.y + s * line_dir.1,
        })
    }
}

/// A ray: an origin and a direction angle, extending to infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Coord,
    pub angle: Radians,
}

impl Ray {
    #[must_use]
    pub fn new(origin: Coord, angle: Radians) -> Self {
        Ray { origin, angle }
    }

    fn direction(self) -> (f64, f64) {
        (self.angle.0.cos(), self.angle.0.sin())
    }

    /// Intersects this ray against a line segment, returning the
    /// ray parameter `t >= 0` and the intersection point, or `None` if
    /// the ray does not hit the segment.
    #[must_use]
    pub fn intersect_segment(self, segment: Segment) -> Option<(f64, Coord)> {
        let r = self.direction();
        let s = segment.end.sub(segment.start);
        let denom = cross(r, s);
        if almost_zero(denom) {
            return None;
        }
        let qp = segment.start.sub(self.origin);
        let t = cross(qp, s) / denom;
        let u = cross(qp, r) / denom;
        if t >= -1e-9 && (-1e-9..=1.0 + 1e-9).contains(&u) {
            let t = t.max(0.0);
            Some((t, self.origin.translated(t, self.angle)))
        } else {
            None
        }
    }
}

/// A straight segment from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Coord,
    pub end: Coord,
}

impl Segment {
    #[must_use]
    pub fn new(start: Coord, end: Coord) -> Self {
        Segment { start, end }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.start.distance_to(self.end)
    }
}

/// A plant crown's 2-D silhouette along the wind direction: a symmetric
/// hexagon built from five scalars.
///
/// `hc` is the canopy base height at the trunk, `he` the canopy base
/// height at the crown edge, `ht` the crown top height at the edge, `hp`
/// the crown top height (peak) at the centreline, and `w` the crown
/// width. Invariants: `hp > hc`, `ht >= he`, `w > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrownPoly {
    pub hc: f64,
    pub he: f64,
    pub ht: f64,
    pub hp: f64,
    pub w: f64,
}

impl CrownPoly {
    /// # Errors
    /// Returns [`ModelError::InvalidInput`] if `w <= 0`, `hp <= hc`, or
    /// `ht < he`.
    pub fn new(hc: f64, he: f64, ht: f64, hp: f64, w: f64) -> Result<Self, ModelError> {
        if w <= 0.0 {
            return Err(ModelError::InvalidInput {
                field: "w".to_string(),
                reason: "crown width must be positive".to_string(),
            });
        }
        if hp <= hc {
            return Err(ModelError::InvalidInput {
                field: "hp".to_string(),
                reason: "crown peak height must exceed the centreline base height".to_string(),
            });
        }
        if ht < he {
            return Err(ModelError::InvalidInput {
                field: "ht".to_string(),
                reason: "crown top-at-edge height must be at least the base-at-edge height"
                    .to_string(),
            });
        }
        Ok(CrownPoly { hc, he, ht, hp, w })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.w
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.ht.max(self.hp) - self.hc.min(self.he)
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        -self.w / 2.0
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.w / 2.0
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.hc.min(self.he)
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.ht.max(self.hp)
    }

    /// The six hexagon vertices in order, starting at the base centre.
    fn vertices(&self) -> [Coord; 6] {
        let r = self.w / 2.0;
        [
            Coord::new(0.0, self.hc),
            Coord::new(r, self.he),
            Coord::new(r, self.ht),
            Coord::new(0.0, self.hp),
            Coord::new(-r, self.ht),
            Coord::new(-r, self.he),
        ]
    }

    /// Polygon area via the shoelace formula.
    #[must_use]
    pub fn area(&self) -> f64 {
        let v = self.vertices();
        let mut sum = 0.0;
        for i in 0..v.len() {
            let j = (i + 1) % v.len();
            sum += v[i].x * v[j].y - v[j].x * v[i].y;
        }
        sum.abs() / 2.0
    }

    /// Polygon centroid via the standard shoelace centroid formula.
    #[must_use]
    pub fn centroid(&self) -> Coord {
        let v = self.vertices();
        let mut signed_area = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..v.len() {
            let j = (i + 1) % v.len();
            let cross_term = v[i].x * v[j].y - v[j].x * v[i].y;
            signed_area += cross_term;
            cx += (v[i].x + v[j].x) * cross_term;
            cy += (v[i].y + v[j].y) * cross_term;
        }
        signed_area /= 2.0;
        if almost_zero(signed_area) {
            return Coord::new(0.0, self.hc);
        }
        Coord::new(cx / (6.0 * signed_area), cy / (6.0 * signed_area))
    }

    /// Volume of the solid formed by revolving the crown about its
    /// vertical centreline: a cone from `hc` to `he`, a cylinder from
    /// `he` to `ht`, and a cone from `ht` to `hp`, each of radius
    /// `w / 2`.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let r = self.w / 2.0;
        let lower_cone = (self.he - self.hc).abs();
        let cylinder = self.ht - self.he;
        let upper_cone = (self.hp - self.ht).abs();
        std::f64::consts::PI * r * r * (lower_cone / 3.0 + cylinder + upper_cone / 3.0)
    }

    /// The point on the lower hull (the two base segments) at horizontal
    /// offset `x`, clamped to the crown's horizontal extent.
    #[must_use]
    pub fn point_in_base(&self, x: f64) -> Coord {
        let r = self.w / 2.0;
        let clamped = x.clamp(-r, r);
        if almost_zero(r) {
            return Coord::new(0.0, self.hc);
        }
        let t = clamped.abs() / r;
        Coord::new(clamped, self.hc + (self.he - self.hc) * t)
    }

    /// Distance from `from` to the nearest boundary crossing along
    /// `angle` — the forward exit distance for a point already inside
    /// (or on) the crown. Unlike [`Self::intersection`], this accepts a
    /// single forward hit, which is the common case for a ray cast from
    /// an interior ignition point (spec.md §4.1 "crown-intersection
    /// length").
    #[must_use]
    pub fn distance_to_boundary(&self, from: Coord, angle: Radians) -> Option<f64> {
        let ray = Ray::new(from, angle);
        let v = self.vertices();
        let mut best: Option<f64> = None;
        for i in 0..v.len() {
            let j = (i + 1) % v.len();
            if let Some((t, _)) = ray.intersect_segment(Segment::new(v[i], v[j])) {
                if t > 1e-9 && best.map_or(true, |b| t < b) {
                    best = Some(t);
                }
            }
        }
        best
    }

    /// Intersects a ray with this crown polygon, returning the entry and
    /// exit points as a segment, or `None` if the ray misses the crown.
    #[must_use]
    pub fn intersection(&self, ray: Ray) -> Option<Segment> {
        let v = self.vertices();
        let mut hits: Vec<(f64, Coord)> = Vec::new();
        for i in 0..v.len() {
            let j = (i + 1) % v.len();
            if let Some(hit) = ray.intersect_segment(Segment::new(v[i], v[j])) {
                hits.push(hit);
            }
        }
        hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        hits.dedup_by(|a, b| almost_zero(a.0 - b.0));
        match hits.len() {
            0 | 1 => None,
            _ => {
                let first = hits[0].1;
                let last = hits[hits.len() - 1].1;
                Some(Segment::new(first, last))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn crown_rejects_non_positive_width() {
        assert!(CrownPoly::new(1.0, 1.5, 2.5, 3.0, 0.0).is_err());
    }

    #[test]
    fn crown_rejects_peak_not_above_base() {
        assert!(CrownPoly::new(2.0, 1.5, 2.5, 2.0, 2.0).is_err());
    }

    #[test]
    fn crown_rejects_top_below_edge_base() {
        assert!(CrownPoly::new(1.0, 2.5, 2.0, 3.0, 2.0).is_err());
    }

    #[test]
    fn crown_shape_matches_worked_example() {
        let crown = CrownPoly::new(1.0, 1.5, 2.5, 3.0, 2.0).unwrap();
        assert_relative_eq!(crown.width(), 2.0);
        assert_relative_eq!(crown.height(), 2.0);
        assert_relative_eq!(crown.bottom(), 1.0);
        assert_relative_eq!(crown.top(), 3.0);
        assert_relative_eq!(crown.area(), 3.0, epsilon = 1e-9);
        let centroid = crown.centroid();
        assert_relative_eq!(centroid.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(centroid.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(crown.volume(), 4.0 * std::f64::consts::PI / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn cylindrical_crown_volume() {
        let crown = CrownPoly::new(1.0, 1.0, 3.0, 3.0, 4.0).unwrap();
        assert_relative_eq!(crown.volume(), 8.0 * std::f64::consts::PI, epsilon = 1e-9);
    }

    #[test]
    fn origin_on_line_fails_when_parallel() {
        let line = Line::horizontal_through(Coord::new(0.0, 0.0));
        let err = line.origin_on_line(Coord::new(5.0, 0.0), Radians(0.0));
        assert!(err.is_err());
    }

    #[test]
    fn origin_on_line_finds_point_for_perpendicular_ray() {
        let line = Line::horizontal_through(Coord::new(0.0, 0.0));
        let target = Coord::new(3.0, 4.0);
        let origin = line
            .origin_on_line(target, Radians(std::f64::consts::FRAC_PI_2))
            .unwrap();
        assert_relative_eq!(origin.x, 3.0, epsilon = 1e-9);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn line_intersection_finds_crossing_point() {
        let a = Line::horizontal_through(Coord::new(0.0, 0.0));
        let b = Line::new(Coord::new(2.0, -2.0), Radians(std::f64::consts::FRAC_PI_4));
        let p = a.intersect(&b).unwrap();
        assert_relative_eq!(p.x, 4.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let a = Line::horizontal_through(Coord::new(0.0, 0.0));
        let b = Line::horizontal_through(Coord::new(0.0, 5.0));
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn ray_misses_crown_entirely() {
        let crown = CrownPoly::new(1.0, 1.5, 2.5, 3.0, 2.0).unwrap();
        let ray = Ray::new(Coord::new(-10.0, 10.0), Radians(0.0));
        assert!(crown.intersection(ray).is_none());
    }

    #[test]
    fn distance_to_boundary_from_interior_point_finds_forward_exit() {
        let crown = CrownPoly::new(1.0, 1.5, 2.5, 3.0, 2.0).unwrap();
        let from = Coord::new(0.0, 2.0);
        let d = crown
            .distance_to_boundary(from, Radians(0.0))
            .expect("ray from the centre must exit through the right edge");
        assert_relative_eq!(d, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn ray_through_crown_centre_hits_base_and_top() {
        let crown = CrownPoly::new(1.0, 1.5, 2.5, 3.0, 2.0).unwrap();
        let ray = Ray::new(Coord::new(0.0, 0.0), Radians(std::f64::consts::FRAC_PI_2));
        let seg = crown.intersection(ray).unwrap();
        let ys = [seg.start.y, seg.end.y];
        assert!(ys.contains(&1.0) || (ys[0] - 1.0).abs() < 1e-6 || (ys[1] - 1.0).abs() < 1e-6);
    }
}
