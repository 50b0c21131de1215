use serde::{Deserialize, Serialize};

use super::Plane;
use crate::bvh::Aabb;
use crate::error::{Result, TracerError};
use crate::utils::{align_zero, is_zero, normalize, SerdeVector};
use crate::{Point, Ray, UnitVec3, Vec3};

/// Convex planar polygon; a triangle is the three-vertex case
///
/// Vertices are ordered along the edge path. The supporting plane is taken from the first
/// three vertices.
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: Vec<Point>,
    plane: Plane,
}
impl Polygon {
    /// Half thickness added to the bounding box of a flat polygon
    const BOX_PAD: f64 = 1e-4;

    /// Build and validate a polygon
    ///
    /// Fails for fewer than 3 vertices, consecutive repeated vertices, three consecutive
    /// collinear vertices, vertices off the plane of the first three, or a non-convex order.
    pub fn new(vertices: Vec<Point>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(degenerate("a polygon can't have less than 3 vertices"));
        }

        let plane = Plane::from_points(vertices[0], vertices[1], vertices[2])
            .map_err(|_| degenerate("the first three vertices are on the same line"))?;
        if vertices.len() == 3 {
            return Ok(Self { vertices, plane });
        }

        let n = plane.normal();
        let size = vertices.len();
        let mut edge1 = edge(&vertices[size - 2], &vertices[size - 1])?;
        let mut edge2 = edge(&vertices[size - 1], &vertices[0])?;

        // The turn between the last and first edges fixes the orientation; every other turn
        // must agree with it for the polygon to be convex.
        let positive = turn(&edge1, &edge2, &n)? > 0.0;
        for i in 1..size {
            if !is_zero((vertices[i] - vertices[0]).dot(&*n)) {
                return Err(degenerate(
                    "all vertices of a polygon must lay in the same plane",
                ));
            }
            edge1 = edge2;
            edge2 = edge(&vertices[i - 1], &vertices[i])?;
            if positive != (turn(&edge1, &edge2, &n)? > 0.0) {
                return Err(degenerate(
                    "all vertices must be ordered and the polygon must be convex",
                ));
            }
        }

        Ok(Self { vertices, plane })
    }

    pub fn triangle(a: Point, b: Point, c: Point) -> Result<Self> {
        Self::new(vec![a, b, c])
    }

    pub fn from_config(config: PolygonConfig) -> Result<Self> {
        Self::new(config.vertices.into_iter().map(Into::into).collect())
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn normal(&self) -> UnitVec3 {
        self.plane.normal()
    }

    /// Ray parameter of the hit, if the ray crosses the polygon interior within max_distance
    ///
    /// Each edge and the ray origin span a side plane; the hit is inside when the ray
    /// direction lies on the same side of all of them. Hits on an edge, a vertex or an
    /// edge's continuation count as outside.
    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Option<f64> {
        let t = self.plane.intersect(ray, max_distance)?;

        let size = self.vertices.len();
        let mut sign = 0.0;
        for i in 0..size {
            let vi = self.vertices[i] - ray.orig;
            let vj = self.vertices[(i + 1) % size] - ray.orig;
            let side = normalize(vi.cross(&vj)).ok()?;
            let s = align_zero(ray.dir.dot(&*side));
            if s == 0.0 {
                return None;
            }
            if sign == 0.0 {
                sign = s.signum();
            } else if s.signum() != sign {
                return None;
            }
        }
        Some(t)
    }

    pub fn bounding_box(&self) -> Aabb {
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for v in &self.vertices[1..] {
            min = min.inf(v);
            max = max.sup(v);
        }
        let pad = Vec3::repeat(Self::BOX_PAD);
        Aabb::new(min - pad, max + pad)
    }
}

fn degenerate(reason: &str) -> TracerError {
    TracerError::DegeneratePolygon(reason.to_owned())
}

fn edge(from: &Point, to: &Point) -> Result<Vec3> {
    let e = to - from;
    if e.iter().all(|c| *c == 0.0) {
        return Err(degenerate("consequent vertices are in the same point"));
    }
    Ok(e)
}

fn turn(edge1: &Vec3, edge2: &Vec3, n: &UnitVec3) -> Result<f64> {
    let cross = edge1.cross(edge2);
    if cross.iter().all(|c| is_zero(*c)) {
        return Err(degenerate("three consequent vertices lay on the same line"));
    }
    Ok(cross.dot(&**n))
}

/// Polygon config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonConfig {
    pub vertices: Vec<SerdeVector>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point {
        Point::new(x, y, z)
    }

    fn ray(orig: Point, dir: (f64, f64, f64)) -> Ray {
        Ray::new(orig, Vec3::new(dir.0, dir.1, dir.2)).unwrap()
    }

    #[test]
    fn test_polygon_constructor() {
        // a correct convex quadrangular with vertices in correct order
        assert!(Polygon::new(vec![
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(-1.0, 1.0, 1.0)
        ])
        .is_ok());

        // wrong vertices order
        assert!(Polygon::new(vec![
            p(0.0, 0.0, 1.0),
            p(0.0, 1.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(-1.0, 1.0, 1.0)
        ])
        .is_err());

        // vertices not in the same plane
        assert!(Polygon::new(vec![
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 2.0, 2.0)
        ])
        .is_err());

        // concave quadrangular
        assert!(Polygon::new(vec![
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.5, 0.25, 0.5)
        ])
        .is_err());

        // vertex on a side
        assert!(Polygon::new(vec![
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.5, 0.5)
        ])
        .is_err());

        // repeated last vertex
        assert!(Polygon::new(vec![
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0)
        ])
        .is_err());

        // too few vertices, collinear triangle
        assert!(Polygon::new(vec![p(0.0, 0.0, 1.0), p(1.0, 0.0, 0.0)]).is_err());
        assert!(Polygon::triangle(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(2.0, 2.0, 2.0)).is_err());
    }

    #[test]
    fn test_polygon_normal() {
        let pts = vec![
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(-1.0, 1.0, 1.0),
        ];
        let poly = Polygon::new(pts.clone()).unwrap();
        let n = poly.normal();
        assert!((n.norm() - 1.0).abs() < 1e-8);
        for i in 0..4 {
            let prev = if i == 0 { 3 } else { i - 1 };
            assert!(n.dot(&(pts[i] - pts[prev])).abs() < 1e-10);
        }
    }

    #[test]
    fn test_triangle_normal() {
        let tri = Polygon::triangle(p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(tri.normal().into_inner(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_triangle_intersections() {
        let tri = Polygon::triangle(p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 0.0)).unwrap();
        let inf = f64::INFINITY;

        // through the inside
        let r = ray(p(-0.79, -0.62, 0.76), (1.02, 0.86, -0.76));
        let t = tri.intersect(&r, inf).unwrap();
        assert!((r.get(t) - p(0.23, 0.24, 0.0)).norm() < 1e-9);

        // outside against an edge, outside against a vertex
        assert!(tri.intersect(&ray(p(0.5, -1.0, 1.0), (0.0, 0.0, -1.0)), inf).is_none());
        assert!(tri.intersect(&ray(p(2.0, 0.0, 1.0), (0.0, 1.0, -1.0)), inf).is_none());

        // in the plane of the triangle
        assert!(tri.intersect(&ray(p(0.5, -1.0, 0.0), (0.0, 1.0, 0.0)), inf).is_none());
        assert!(tri.intersect(&ray(p(2.0, 0.0, 0.0), (-1.0, 0.0, 0.0)), inf).is_none());
    }

    #[test]
    fn test_triangle_boundary() {
        let tri = Polygon::triangle(p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 0.0)).unwrap();
        let inf = f64::INFINITY;

        // starting on an edge / a vertex, pointing outward
        assert!(tri.intersect(&ray(p(0.5, 0.0, 0.0), (0.0, 0.0, 1.0)), inf).is_none());
        assert!(tri.intersect(&ray(p(0.0, 1.0, 0.0), (0.0, 0.0, 1.0)), inf).is_none());

        // hitting exactly on an edge, a vertex, an edge's continuation
        assert!(tri.intersect(&ray(p(0.5, 0.0, 1.0), (0.0, 0.0, -1.0)), inf).is_none());
        assert!(tri.intersect(&ray(p(1.0, 0.0, 1.0), (0.0, 0.0, -1.0)), inf).is_none());
        assert!(tri.intersect(&ray(p(2.0, 0.0, 1.0), (0.0, 0.0, -1.0)), inf).is_none());
    }

    #[test]
    fn test_quad_intersection() {
        let quad = Polygon::new(vec![
            p(-1.0, -1.0, 0.0),
            p(1.0, -1.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(-1.0, 1.0, 0.0),
        ])
        .unwrap();
        let hit = quad.intersect(&ray(p(0.9, 0.9, 2.0), (0.0, 0.0, -1.0)), f64::INFINITY);
        assert_eq!(hit, Some(2.0));
        assert!(quad
            .intersect(&ray(p(1.1, 0.0, 2.0), (0.0, 0.0, -1.0)), f64::INFINITY)
            .is_none());
        assert!(quad
            .intersect(&ray(p(0.0, 0.0, 2.0), (0.0, 0.0, -1.0)), 1.5)
            .is_none());
    }

    #[test]
    fn test_polygon_bounding_box_encloses_vertices() {
        let tri = Polygon::triangle(p(1.0, 0.0, 0.0), p(0.0, 2.0, 0.0), p(-1.0, 0.0, 0.0)).unwrap();
        let bbox = tri.bounding_box();
        for v in tri.vertices() {
            assert!(bbox.contains_point(v));
        }
        assert!(bbox.max[2] > bbox.min[2]);
    }
}
