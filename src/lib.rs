//! Recursive Phong Ray Tracing Library
//!
//! Intersects rays with a scene of primitives (optionally organized in a bounding volume
//! hierarchy) and shades the nearest hit with local Phong lighting plus recursive reflection
//! and refraction.

use nalgebra::{Unit, Vector3};

pub mod bvh;
pub mod cameras;
pub mod error;
pub mod geometries;
pub mod lights;
pub mod materials;
pub mod objects;
pub mod output;
pub mod scene;
pub mod tracer;
pub mod utils;

use objects::GeoPoint;
use utils::normalize;

pub type Vec3 = Vector3<f64>;
pub type UnitVec3 = Unit<Vec3>;
pub type Point = Vec3;
pub type Color = Vec3;

/// Prelude
pub mod prelude {
    pub use crate::cameras::Camera;
    pub use crate::error::{Result, TracerError};
    pub use crate::geometries::{Geometries, GeometriesBuilder, Intersectable};
    pub use crate::lights::{AmbientLight, LightSource};
    pub use crate::materials::Material;
    pub use crate::objects::{Cylinder, GeoPoint, Geometry, Plane, Polygon, Shape, Sphere, Tube};
    pub use crate::output::{ImageWriter, PixelSink};
    pub use crate::scene::{Scene, SceneBuilder};
    pub use crate::tracer::{RayTracer, TraceRay};
    pub use crate::{Color, Point, Ray, UnitVec3, Vec3};
}

/// The ray in ray tracing
///
/// The direction is always unit length, so the ray parameter is also the distance from the
/// origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub orig: Point,
    pub dir: UnitVec3,
}
impl Ray {
    /// Distance secondary rays are pushed off the surface they start on
    pub const DELTA: f64 = 0.1;

    /// Build a ray, normalizing the direction
    pub fn new(orig: Point, dir: Vec3) -> error::Result<Self> {
        Ok(Self {
            orig,
            dir: normalize(dir)?,
        })
    }

    pub fn from_unit(orig: Point, dir: UnitVec3) -> Self {
        Self { orig, dir }
    }

    /// Ray starting slightly off a surface
    ///
    /// The origin is moved `DELTA` along `normal`, towards the side the ray travels to, so that
    /// shadow, reflected and refracted rays do not hit the surface they leave.
    pub fn offset(point: Point, dir: UnitVec3, normal: &UnitVec3) -> Self {
        let nv = normal.dot(&*dir);
        let delta = if nv > 0.0 { Self::DELTA } else { -Self::DELTA };
        Self {
            orig: point + normal.into_inner() * delta,
            dir,
        }
    }

    pub fn get(&self, t: f64) -> Point {
        self.orig + t * self.dir.into_inner()
    }

    /// The intersection nearest to the ray origin
    pub fn closest_geo_point<'a>(&self, points: Vec<GeoPoint<'a>>) -> Option<GeoPoint<'a>> {
        points.into_iter().min_by(|a, b| {
            let da = (a.point - self.orig).norm_squared();
            let db = (b.point - self.orig).norm_squared();
            da.total_cmp(&db)
        })
    }
}
