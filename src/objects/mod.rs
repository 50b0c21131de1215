//! Objects
//!
//! Primitive shapes, the geometry wrapper carrying material and emission, and the intersection
//! record handed to the shader.

mod plane;
mod polygon;
mod sphere;
mod tube;

pub use plane::{Plane, PlaneConfig};
pub use polygon::{Polygon, PolygonConfig};
pub use sphere::{Sphere, SphereConfig};
pub use tube::{Cylinder, CylinderConfig, Tube, TubeConfig};

use serde::{Deserialize, Serialize};

use crate::bvh::Aabb;
use crate::error::{Result, TracerError};
use crate::materials::{Material, MaterialConfig};
use crate::utils::{align_zero, SerdeVector};
use crate::{Color, Point, Ray, UnitVec3};

/// Whether a ray parameter is an accepted hit: strictly ahead and no farther than max_distance
pub(crate) fn within(t: f64, max_distance: f64) -> bool {
    align_zero(t) > 0.0 && align_zero(t - max_distance) <= 0.0
}

/// The closed set of primitive shapes
#[derive(Debug, Clone)]
pub enum Shape {
    Plane(Plane),
    Sphere(Sphere),
    Polygon(Polygon),
    Tube(Tube),
    Cylinder(Cylinder),
}
impl Shape {
    /// Ray parameters (distances, the direction being unit) of the hits in (0, max_distance]
    ///
    /// Not sorted.
    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Vec<f64> {
        match self {
            Shape::Plane(s) => s.intersect(ray, max_distance).into_iter().collect(),
            Shape::Sphere(s) => s.intersect(ray, max_distance),
            Shape::Polygon(s) => s.intersect(ray, max_distance).into_iter().collect(),
            Shape::Tube(s) => s.intersect(ray, max_distance),
            Shape::Cylinder(s) => s.intersect(ray, max_distance),
        }
    }

    pub fn normal(&self, p: &Point) -> UnitVec3 {
        match self {
            Shape::Plane(s) => s.normal(),
            Shape::Sphere(s) => s.normal(p),
            Shape::Polygon(s) => s.normal(),
            Shape::Tube(s) => s.normal(p),
            Shape::Cylinder(s) => s.normal(p),
        }
    }

    /// Box around the shape; infinite planes and tubes have none
    pub fn bounding_box(&self) -> Option<Aabb> {
        match self {
            Shape::Plane(_) | Shape::Tube(_) => None,
            Shape::Sphere(s) => Some(s.bounding_box()),
            Shape::Polygon(s) => Some(s.bounding_box()),
            Shape::Cylinder(s) => Some(s.bounding_box()),
        }
    }
}
impl From<Plane> for Shape {
    fn from(s: Plane) -> Self {
        Shape::Plane(s)
    }
}
impl From<Sphere> for Shape {
    fn from(s: Sphere) -> Self {
        Shape::Sphere(s)
    }
}
impl From<Polygon> for Shape {
    fn from(s: Polygon) -> Self {
        Shape::Polygon(s)
    }
}
impl From<Tube> for Shape {
    fn from(s: Tube) -> Self {
        Shape::Tube(s)
    }
}
impl From<Cylinder> for Shape {
    fn from(s: Cylinder) -> Self {
        Shape::Cylinder(s)
    }
}

/// A shape in the scene, with the material and emission the shader reads
#[derive(Debug, Clone)]
pub struct Geometry {
    pub shape: Shape,
    pub material: Material,
    pub emission: Color,
}
impl Geometry {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            material: Material::default(),
            emission: Color::zeros(),
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    pub fn from_config(config: GeometryConfig) -> Result<Self> {
        let shape: Shape = match config.shape {
            ShapeConfig::Plane(c) => Plane::from_config(c)?.into(),
            ShapeConfig::Sphere(c) => Sphere::from_config(c).into(),
            ShapeConfig::Triangle(c) => {
                if c.vertices.len() != 3 {
                    return Err(TracerError::InvalidConfig(format!(
                        "a triangle needs 3 vertices, got {}",
                        c.vertices.len()
                    )));
                }
                Polygon::from_config(c)?.into()
            }
            ShapeConfig::Polygon(c) => Polygon::from_config(c)?.into(),
            ShapeConfig::Tube(c) => Tube::from_config(c)?.into(),
            ShapeConfig::Cylinder(c) => Cylinder::from_config(c)?.into(),
        };
        Ok(Self::new(shape)
            .with_material(Material::from_config(config.material))
            .with_emission(config.emission.map(Into::into).unwrap_or_else(Color::zeros)))
    }

    pub fn normal(&self, p: &Point) -> UnitVec3 {
        self.shape.normal(p)
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        self.shape.bounding_box()
    }

    pub fn find_geo_intersections(&self, ray: &Ray, max_distance: f64) -> Vec<GeoPoint<'_>> {
        self.shape
            .intersect(ray, max_distance)
            .into_iter()
            .map(|t| GeoPoint::new(self, ray.get(t)))
            .collect()
    }
}

/// A point on the surface of a geometry
#[derive(Debug, Clone, Copy)]
pub struct GeoPoint<'a> {
    pub geometry: &'a Geometry,
    pub point: Point,
}
impl<'a> GeoPoint<'a> {
    pub fn new(geometry: &'a Geometry, point: Point) -> Self {
        Self { geometry, point }
    }

    pub fn normal(&self) -> UnitVec3 {
        self.geometry.normal(&self.point)
    }
}

/// Shape part of a geometry config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeConfig {
    Plane(PlaneConfig),
    Sphere(SphereConfig),
    Triangle(PolygonConfig),
    Polygon(PolygonConfig),
    Tube(TubeConfig),
    Cylinder(CylinderConfig),
}

/// Geometry config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    #[serde(flatten)]
    pub shape: ShapeConfig,
    #[serde(default)]
    pub material: MaterialConfig,
    #[serde(default)]
    pub emission: Option<SerdeVector>,
}
