use nalgebra::Unit;
use serde::{Deserialize, Serialize};

use super::{within, Plane};
use crate::bvh::Aabb;
use crate::error::Result;
use crate::utils::{align_zero, is_zero, SerdeVector};
use crate::{Point, Ray, UnitVec3, Vec3};

/// Infinite cylinder around an axis ray
#[derive(Debug, Clone)]
pub struct Tube {
    pub radius: f64,
    pub axis: Ray,
}
impl Tube {
    pub fn new(radius: f64, axis: Ray) -> Self {
        Self { radius, axis }
    }

    pub fn from_config(config: TubeConfig) -> Result<Self> {
        Ok(Self::new(
            config.radius,
            Ray::new(config.origin.into(), config.direction.into())?,
        ))
    }

    /// Rejection of the point from the axis
    ///
    /// A point on the axis itself has no radial direction; any unit vector orthogonal to the
    /// axis is returned instead.
    pub fn normal(&self, p: &Point) -> UnitVec3 {
        let t = self.axis.dir.dot(&(p - self.axis.orig));
        let o = self.axis.get(t);
        Unit::try_new(p - o, 0.0).unwrap_or_else(|| self.orthogonal_to_axis())
    }

    fn orthogonal_to_axis(&self) -> UnitVec3 {
        let d = self.axis.dir;
        let helper = if d[0].abs() <= d[1].abs() && d[0].abs() <= d[2].abs() {
            Vec3::x()
        } else if d[1].abs() <= d[2].abs() {
            Vec3::y()
        } else {
            Vec3::z()
        };
        Unit::new_normalize(d.cross(&helper))
    }

    /// Both roots of the radial quadratic, unfiltered
    ///
    /// Rays parallel to the axis and tangent rays have none.
    fn radial_roots(&self, ray: &Ray) -> Vec<f64> {
        let va = self.axis.dir.into_inner();
        let v = ray.dir.into_inner();
        let dp = ray.orig - self.axis.orig;

        let v_perp = v - va * v.dot(&va);
        let dp_perp = dp - va * dp.dot(&va);

        let a = v_perp.norm_squared();
        if is_zero(a) {
            return Vec::new();
        }
        let b = 2.0 * v_perp.dot(&dp_perp);
        let c = dp_perp.norm_squared() - self.radius * self.radius;

        let discriminant = align_zero(b * b - 4.0 * a * c);
        if discriminant <= 0.0 {
            return Vec::new();
        }
        let sqrtd = discriminant.sqrt();
        vec![(-b - sqrtd) / (2.0 * a), (-b + sqrtd) / (2.0 * a)]
    }

    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Vec<f64> {
        self.radial_roots(ray)
            .into_iter()
            .map(align_zero)
            .filter(|t| within(*t, max_distance))
            .collect()
    }
}

/// Tube config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TubeConfig {
    pub origin: SerdeVector,
    pub direction: SerdeVector,
    pub radius: f64,
}

/// Closed finite cylinder
///
/// The axis origin is the center; the body spans `height / 2` to either side along the axis
/// and is closed by two cap disks.
#[derive(Debug, Clone)]
pub struct Cylinder {
    pub tube: Tube,
    pub height: f64,
}
impl Cylinder {
    pub fn new(radius: f64, axis: Ray, height: f64) -> Self {
        Self {
            tube: Tube::new(radius, axis),
            height,
        }
    }

    pub fn from_config(config: CylinderConfig) -> Result<Self> {
        Ok(Self::new(
            config.radius,
            Ray::new(config.origin.into(), config.direction.into())?,
            config.height,
        ))
    }

    fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    /// Signed distance of a point's projection along the axis from the center
    fn axial(&self, p: &Point) -> f64 {
        align_zero(self.tube.axis.dir.dot(&(p - self.tube.axis.orig)))
    }

    fn caps(&self) -> [Plane; 2] {
        let axis = &self.tube.axis;
        let half = self.half_height();
        [
            Plane::from_unit(axis.get(half), axis.dir),
            Plane::from_unit(axis.get(-half), Unit::new_unchecked(-axis.dir.into_inner())),
        ]
    }

    /// Side normal between the caps, axis direction on the top cap, its opposite on the bottom
    pub fn normal(&self, p: &Point) -> UnitVec3 {
        let d = self.axial(p);
        let half = self.half_height();
        if align_zero(d - half) >= 0.0 {
            self.tube.axis.dir
        } else if align_zero(d + half) <= 0.0 {
            Unit::new_unchecked(-self.tube.axis.dir.into_inner())
        } else {
            self.tube.normal(p)
        }
    }

    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Vec<f64> {
        let half = self.half_height();
        let mut hits: Vec<f64> = self
            .tube
            .intersect(ray, max_distance)
            .into_iter()
            .filter(|t| align_zero(self.axial(&ray.get(*t)).abs() - half) < 0.0)
            .collect();

        let r2 = self.tube.radius * self.tube.radius;
        for cap in self.caps() {
            if let Some(t) = cap.intersect(ray, max_distance) {
                if align_zero((ray.get(t) - cap.q0()).norm_squared() - r2) < 0.0 {
                    hits.push(t);
                }
            }
        }
        hits
    }

    pub fn bounding_box(&self) -> Aabb {
        let axis = &self.tube.axis;
        let half = self.half_height();
        let top = axis.get(half);
        let bottom = axis.get(-half);
        let r = self.tube.radius;
        let extent = axis.dir.map(|a| r * (1.0 - a * a).max(0.0).sqrt());
        Aabb::new(top.inf(&bottom) - extent, top.sup(&bottom) + extent)
    }
}

/// Cylinder config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CylinderConfig {
    pub origin: SerdeVector,
    pub direction: SerdeVector,
    pub radius: f64,
    pub height: f64,
}
