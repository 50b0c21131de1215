//! Axis-Aligned Bounding Boxes and Bounding Volume Hierarchies
//!
//! For optimizing computations

use log::debug;

use crate::geometries::Intersectable;
use crate::objects::GeoPoint;
use crate::{Point, Ray};

/// Axis-Aligned Bounding Box
///
/// A data structure to bound many objects to speed up computations
#[derive(Debug, Clone, PartialEq)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}
impl Aabb {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Whether the box is hit by a ray between the parameter range
    ///
    /// Slab test. Components of the direction that are zero divide to infinities, which keeps
    /// the slab of a parallel ray either empty or unbounded.
    pub fn hit(&self, r: &Ray, mut t_min: f64, mut t_max: f64) -> bool {
        for a in 0..3 {
            let inv_d = 1.0 / r.dir[a];
            let mut t0 = (self.min[a] - r.orig[a]) * inv_d;
            let mut t1 = (self.max[a] - r.orig[a]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = if t0 > t_min { t0 } else { t_min };
            t_max = if t1 < t_max { t1 } else { t_max };
            if t_max < t_min {
                return false;
            }
        }
        true
    }

    /// Compute the surrounding AABB between this and another
    pub fn surrounding_box(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Surrounding box of every box in the iterator, `None` when it is empty
    pub fn enclosing<'a>(boxes: impl IntoIterator<Item = &'a Aabb>) -> Option<Aabb> {
        boxes.into_iter().fold(None, |acc, b| match acc {
            None => Some(b.clone()),
            Some(acc) => Some(acc.surrounding_box(b)),
        })
    }

    /// Index of the axis with the largest extent
    pub fn longest_axis(&self) -> usize {
        (self.max - self.min).imax()
    }

    pub fn contains(&self, other: &Aabb) -> bool {
        (0..3).all(|a| self.min[a] <= other.min[a] && other.max[a] <= self.max[a])
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        (0..3).all(|a| self.min[a] <= p[a] && p[a] <= self.max[a])
    }
}

/// Bounding Volume Hierarchy
///
/// Tree structure over bounded primitives. Every node carries the box of everything below it.
/// Internal nodes split their primitives at the midpoint of the longest axis into a left, a
/// right and a straddling middle partition; only left and right are split further.
#[derive(Debug, Clone)]
pub enum BvhNode {
    Leaf {
        bbox: Aabb,
        items: Vec<Intersectable>,
    },
    Internal {
        bbox: Aabb,
        left: Option<Box<BvhNode>>,
        middle: Option<Box<BvhNode>>,
        right: Option<Box<BvhNode>>,
    },
}
impl BvhNode {
    /// Partitions of this size or smaller stay flat
    pub const LEAF_SIZE: usize = 2;

    /// Build the hierarchy over bounded items, `None` when there are no items
    pub fn new(items: Vec<(Aabb, Intersectable)>) -> Option<Self> {
        let count = items.len();
        let root = Self::split_tree(items)?;
        debug!(
            "BVH over {} items: {} nodes, depth {}",
            count,
            root.node_count(),
            root.depth()
        );
        Some(root)
    }

    /// Split the tree
    ///
    /// Take the longest axis of the enclosing box, bucket each item by which side of the
    /// axis midpoint its box lies on, recurse into the sides
    fn split_tree(items: Vec<(Aabb, Intersectable)>) -> Option<Self> {
        let bbox = Aabb::enclosing(items.iter().map(|(b, _)| b))?;
        let count = items.len();
        if count <= Self::LEAF_SIZE {
            return Some(Self::leaf(bbox, items));
        }

        let axis = bbox.longest_axis();
        let mid = (bbox.min[axis] + bbox.max[axis]) / 2.0;

        let mut left = Vec::new();
        let mut middle = Vec::new();
        let mut right = Vec::new();
        for (b, item) in items {
            if b.max[axis] <= mid {
                left.push((b, item));
            } else if b.min[axis] >= mid {
                right.push((b, item));
            } else {
                middle.push((b, item));
            }
        }

        // Nothing was separated, splitting again would not terminate
        if left.len() == count || right.len() == count || middle.len() == count {
            let items = left.into_iter().chain(middle).chain(right).collect();
            return Some(Self::leaf(bbox, items));
        }

        let middle = Aabb::enclosing(middle.iter().map(|(b, _)| b))
            .map(|middle_box| Box::new(Self::leaf(middle_box, middle)));
        Some(BvhNode::Internal {
            bbox,
            left: Self::split_tree(left).map(Box::new),
            middle,
            right: Self::split_tree(right).map(Box::new),
        })
    }

    fn leaf(bbox: Aabb, items: Vec<(Aabb, Intersectable)>) -> Self {
        BvhNode::Leaf {
            bbox,
            items: items.into_iter().map(|(_, item)| item).collect(),
        }
    }

    pub fn bounding_box(&self) -> &Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Internal { bbox, .. } => bbox,
        }
    }

    /// Collect the intersections of every item whose box the ray reaches within max_distance
    pub fn find_geo_intersections<'a>(
        &'a self,
        ray: &Ray,
        max_distance: f64,
        out: &mut Vec<GeoPoint<'a>>,
    ) {
        if !self.bounding_box().hit(ray, 0.0, max_distance) {
            return;
        }
        match self {
            BvhNode::Leaf { items, .. } => {
                for item in items {
                    out.extend(item.find_geo_intersections(ray, max_distance));
                }
            }
            BvhNode::Internal {
                left,
                middle,
                right,
                ..
            } => {
                for child in [left, middle, right].into_iter().flatten() {
                    child.find_geo_intersections(ray, max_distance, out);
                }
            }
        }
    }

    /// Number of items stored in the leaves
    pub fn len(&self) -> usize {
        match self {
            BvhNode::Leaf { items, .. } => items.len(),
            BvhNode::Internal { .. } => self.children().map(BvhNode::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn children(&self) -> impl Iterator<Item = &BvhNode> {
        let children = match self {
            BvhNode::Leaf { .. } => [None, None, None],
            BvhNode::Internal {
                left,
                middle,
                right,
                ..
            } => [left.as_deref(), middle.as_deref(), right.as_deref()],
        };
        children.into_iter().flatten()
    }

    fn node_count(&self) -> usize {
        1 + self.children().map(BvhNode::node_count).sum::<usize>()
    }

    fn depth(&self) -> usize {
        1 + self.children().map(BvhNode::depth).max().unwrap_or(0)
    }
}
