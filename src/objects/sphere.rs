use serde::{Deserialize, Serialize};

use super::within;
use crate::bvh::Aabb;
use crate::utils::{align_zero, is_zero_vector, SerdeVector};
use crate::{Point, Ray, UnitVec3, Vec3};
use nalgebra::Unit;

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Point,
    pub radius: f64,
}
impl Sphere {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn from_config(config: SphereConfig) -> Self {
        Self::new(config.center.into(), config.radius)
    }

    /// Outward unit normal at a point on the surface
    pub fn normal(&self, p: &Point) -> UnitVec3 {
        let outward = p - self.center;
        if is_zero_vector(&outward) {
            return Vec3::z_axis();
        }
        Unit::new_normalize(outward)
    }

    /// Ray parameters of the hits in (0, max_distance]
    ///
    /// Geometric method: `tm` is the projection of origin->center onto the ray, `d` the
    /// distance of the center from the ray line. Tangent rays do not intersect.
    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Vec<f64> {
        let u = self.center - ray.orig;
        if is_zero_vector(&u) {
            // Starting at the center there is exactly one forward hit
            return if within(self.radius, max_distance) {
                vec![self.radius]
            } else {
                Vec::new()
            };
        }

        let tm = align_zero(ray.dir.dot(&u));
        let d_sqr = align_zero(u.norm_squared() - tm * tm);
        let th_sqr = align_zero(self.radius * self.radius - d_sqr);
        if th_sqr <= 0.0 {
            return Vec::new();
        }

        let th = align_zero(th_sqr.sqrt());
        let t2 = align_zero(tm + th);
        if t2 <= 0.0 {
            return Vec::new();
        }
        let t1 = align_zero(tm - th);

        [t1, t2]
            .into_iter()
            .filter(|t| within(*t, max_distance))
            .collect()
    }

    pub fn bounding_box(&self) -> Aabb {
        let v = Vec3::repeat(self.radius);
        Aabb::new(self.center - v, self.center + v)
    }
}

/// Sphere config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereConfig {
    pub center: SerdeVector,
    pub radius: f64,
}
