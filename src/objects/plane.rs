use serde::{Deserialize, Serialize};

use super::within;
use crate::error::Result;
use crate::utils::{align_zero, is_zero_vector, normalize, SerdeVector};
use crate::{Point, Ray, UnitVec3, Vec3};

/// Infinite plane through `q0` with a unit normal
#[derive(Debug, Clone)]
pub struct Plane {
    q0: Point,
    normal: UnitVec3,
}
impl Plane {
    pub fn new(q0: Point, normal: Vec3) -> Result<Self> {
        Ok(Self::from_unit(q0, normalize(normal)?))
    }

    pub fn from_unit(q0: Point, normal: UnitVec3) -> Self {
        Self { q0, normal }
    }

    /// Plane through three points, fails if they are on the same line
    pub fn from_points(a: Point, b: Point, c: Point) -> Result<Self> {
        let normal = normalize((b - a).cross(&(c - a)))?;
        Ok(Self { q0: a, normal })
    }

    pub fn from_config(config: PlaneConfig) -> Result<Self> {
        Self::new(config.point.into(), config.normal.into())
    }

    pub fn q0(&self) -> &Point {
        &self.q0
    }

    pub fn normal(&self) -> UnitVec3 {
        self.normal
    }

    /// Ray parameter of the hit, if any lies in (0, max_distance]
    ///
    /// Rays parallel to the plane (including rays lying in it) and rays that start on the
    /// reference point never intersect.
    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Option<f64> {
        let u = self.q0 - ray.orig;
        if is_zero_vector(&u) {
            return None;
        }

        let nv = align_zero(self.normal.dot(&*ray.dir));
        if nv == 0.0 {
            return None;
        }

        let t = align_zero(self.normal.dot(&u) / nv);
        within(t, max_distance).then_some(t)
    }
}

/// Plane config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaneConfig {
    pub point: SerdeVector,
    pub normal: SerdeVector,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane() -> Plane {
        Plane::from_points(
            Point::new(-0.5, -0.5, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        )
        .unwrap()
    }

    fn ray(orig: (f64, f64, f64), dir: (f64, f64, f64)) -> Ray {
        Ray::new(
            Point::new(orig.0, orig.1, orig.2),
            Vec3::new(dir.0, dir.1, dir.2),
        )
        .unwrap()
    }

    #[test]
    fn test_plane_from_points_rejects_degenerate() {
        let p0 = Point::new(1.0, 2.0, 3.0);
        assert!(Plane::from_points(p0, p0, Point::new(4.0, 5.0, 6.0)).is_err());
        assert!(
            Plane::from_points(p0, Point::new(2.0, 4.0, 6.0), Point::new(4.0, 8.0, 12.0)).is_err()
        );
    }

    #[test]
    fn test_plane_normal_is_unit_and_orthogonal() {
        let pts = [
            Point::new(0.0, 0.0, 1.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        let plane = Plane::from_points(pts[0], pts[1], pts[2]).unwrap();
        let n = plane.normal();
        assert!((n.norm() - 1.0).abs() < 1e-10);
        for i in 0..3 {
            let edge = pts[(i + 1) % 3] - pts[i];
            assert!(n.dot(&edge).abs() < 1e-10);
        }
    }

    #[test]
    fn test_plane_intersections() {
        let plane = plane();

        // crossing the plane
        let t = plane
            .intersect(&ray((1.0, 1.0, 1.0), (-1.0, 0.0, -1.0)), f64::INFINITY)
            .unwrap();
        let p = ray((1.0, 1.0, 1.0), (-1.0, 0.0, -1.0)).get(t);
        assert!((p - Point::new(0.0, 1.0, 0.0)).norm() < 1e-10);

        // pointing away
        assert!(plane
            .intersect(&ray((1.0, 1.0, 1.0), (1.0, 1.0, 2.0)), f64::INFINITY)
            .is_none());
    }

    #[test]
    fn test_plane_boundary_cases() {
        let plane = plane();
        let inf = f64::INFINITY;

        // parallel, inside and outside the plane
        assert!(plane.intersect(&ray((0.0, 1.0, 0.0), (1.0, 0.0, 0.0)), inf).is_none());
        assert!(plane.intersect(&ray((0.0, 1.0, 1.0), (1.0, 0.0, 0.0)), inf).is_none());

        // orthogonal, before / on / after
        assert_eq!(
            plane.intersect(&ray((0.0, 1.0, 1.0), (0.0, 0.0, -1.0)), inf),
            Some(1.0)
        );
        assert!(plane.intersect(&ray((0.0, 2.0, 0.0), (0.0, 0.0, -1.0)), inf).is_none());
        assert!(plane.intersect(&ray((0.0, 2.0, -1.0), (0.0, 0.0, -1.0)), inf).is_none());

        // starting at the reference point
        let from_q0 = Ray::new(*plane.q0(), Vec3::new(1.0, 1.0, 0.0)).unwrap();
        assert!(plane.intersect(&from_q0, inf).is_none());

        // starting in the plane, neither parallel nor orthogonal
        assert!(plane.intersect(&ray((0.0, 1.0, 0.0), (1.0, 1.0, -1.0)), inf).is_none());
    }

    #[test]
    fn test_plane_respects_max_distance() {
        let plane = plane();
        let r = ray((0.0, 1.0, 5.0), (0.0, 0.0, -1.0));
        assert!(plane.intersect(&r, 4.0).is_none());
        assert_eq!(plane.intersect(&r, 5.0), Some(5.0));
    }
}
