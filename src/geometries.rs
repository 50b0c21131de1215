//! Composite geometry container
//!
//! A `Geometries` is the acceleration root handed to the shader. It owns primitives and nested
//! containers; with the hierarchy enabled, bounded members are organized in a [`BvhNode`] and
//! unbounded ones are tested on every query.

use log::debug;

use crate::bvh::{Aabb, BvhNode};
use crate::objects::{GeoPoint, Geometry};
use crate::Ray;

/// Something rays can be intersected with: a single geometry or a nested container
#[derive(Debug, Clone)]
pub enum Intersectable {
    Geometry(Geometry),
    Group(Geometries),
}
impl Intersectable {
    pub fn bounding_box(&self) -> Option<Aabb> {
        match self {
            Intersectable::Geometry(g) => g.bounding_box(),
            Intersectable::Group(g) => g.bounding_box().cloned(),
        }
    }

    pub fn find_geo_intersections(&self, ray: &Ray, max_distance: f64) -> Vec<GeoPoint<'_>> {
        match self {
            Intersectable::Geometry(g) => g.find_geo_intersections(ray, max_distance),
            Intersectable::Group(g) => g.find_geo_intersections(ray, max_distance),
        }
    }

    /// Number of primitives below this item
    pub fn len(&self) -> usize {
        match self {
            Intersectable::Geometry(_) => 1,
            Intersectable::Group(g) => g.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl From<Geometry> for Intersectable {
    fn from(g: Geometry) -> Self {
        Intersectable::Geometry(g)
    }
}
impl From<Geometries> for Intersectable {
    fn from(g: Geometries) -> Self {
        Intersectable::Group(g)
    }
}

/// Immutable container of intersectables, built once by [`GeometriesBuilder`]
#[derive(Debug, Clone)]
pub struct Geometries {
    /// Tested on every query: unbounded members, or every member without the hierarchy
    flat: Vec<Intersectable>,
    tree: Option<BvhNode>,
    /// Absent when empty or when any member is unbounded
    bbox: Option<Aabb>,
    len: usize,
}
impl Geometries {
    pub fn builder() -> GeometriesBuilder {
        GeometriesBuilder::default()
    }

    /// Every intersection within max_distance, unsorted
    pub fn find_geo_intersections(&self, ray: &Ray, max_distance: f64) -> Vec<GeoPoint<'_>> {
        let mut out = Vec::new();
        for item in &self.flat {
            out.extend(item.find_geo_intersections(ray, max_distance));
        }
        if let Some(tree) = &self.tree {
            tree.find_geo_intersections(ray, max_distance, &mut out);
        }
        out
    }

    /// The intersection nearest to the ray origin within max_distance
    pub fn find_closest(&self, ray: &Ray, max_distance: f64) -> Option<GeoPoint<'_>> {
        ray.closest_geo_point(self.find_geo_intersections(ray, max_distance))
    }

    pub fn bounding_box(&self) -> Option<&Aabb> {
        self.bbox.as_ref()
    }

    /// Number of primitives, nested containers included
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
impl Default for Geometries {
    fn default() -> Self {
        GeometriesBuilder::default().build()
    }
}

/// Collects members, then finalizes them into [`Geometries`] in one pass
#[derive(Debug, Default)]
pub struct GeometriesBuilder {
    items: Vec<Intersectable>,
    bvh: bool,
}
impl GeometriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Organize bounded members in a bounding volume hierarchy
    pub fn bvh(mut self, enabled: bool) -> Self {
        self.bvh = enabled;
        self
    }

    pub fn add(mut self, item: impl Into<Intersectable>) -> Self {
        self.items.push(item.into());
        self
    }

    pub fn push(&mut self, item: impl Into<Intersectable>) {
        self.items.push(item.into());
    }

    pub fn build(self) -> Geometries {
        let len = self.items.iter().map(Intersectable::len).sum();

        let mut bounded = Vec::new();
        let mut unbounded = Vec::new();
        for item in self.items {
            match item.bounding_box() {
                Some(b) => bounded.push((b, item)),
                None => unbounded.push(item),
            }
        }

        let bbox = if unbounded.is_empty() {
            Aabb::enclosing(bounded.iter().map(|(b, _)| b))
        } else {
            None
        };

        let (flat, tree) = if self.bvh {
            (unbounded, BvhNode::new(bounded))
        } else {
            let mut flat: Vec<Intersectable> = bounded.into_iter().map(|(_, item)| item).collect();
            flat.extend(unbounded);
            (flat, None)
        };
        debug!(
            "Geometries with {} primitives, {} tested on every query",
            len,
            flat.len()
        );

        Geometries {
            flat,
            tree,
            bbox,
            len,
        }
    }
}
