//! # Quadtree Implementation
//!
//! This is an implementation of a quadtree, as described in [the wikipedia
//! article](https://en.wikipedia.org/wiki/Quadtree). It is used to answer
//! "which points lie near this position" queries over large static point
//! sets, such as the map's road-line geometry.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use scene_if::geom::Vector2;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Number of points stored per node before it subdivides
pub const CAPACITY: usize = 4;

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// Represents a quad with a centre and half-width.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quad {
    centre: Vector2,
    half_width: f64,
}

/// An implementation of a QuadTree
#[derive(Clone, Debug)]
pub struct QuadTree {
    /// The bounds of this node
    boundary: Quad,

    /// Points stored in this node
    points: Vec<Vector2>,

    /// Children of this node, in NW/NE/SW/SE order. Either all present or
    /// all absent.
    children: Option<Box<[QuadTree; 4]>>,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum QuadTreeError {
    #[error("The given point {0:?} was not in the bounds of the quadtree {1:?}")]
    PointNotInBounds(Vector2, Quad),
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Quad {
    /// Creates a new quad with the given `centre` and `half_width`.
    pub fn new(centre: Vector2, half_width: f64) -> Self {
        Self { centre, half_width }
    }

    /// Returns `true` if `point` is inside this [`Quad`].
    ///
    /// The interval is half-open (lower edge included, upper edge excluded)
    /// so that a point on an internal subdivision boundary belongs to
    /// exactly one child.
    pub fn contains(&self, point: &Vector2) -> bool {
        (self.centre.x - self.half_width) <= point.x
            && (self.centre.x + self.half_width) > point.x
            && (self.centre.y - self.half_width) <= point.y
            && (self.centre.y + self.half_width) > point.y
    }

    /// Returns `true` if `other` intersects with this [`Quad`].
    pub fn intersects(&self, other: &Quad) -> bool {
        (self.centre.x - other.centre.x).abs() < self.half_width + other.half_width
            && (self.centre.y - other.centre.y).abs() < self.half_width + other.half_width
    }
}

impl QuadTree {
    pub fn new(boundary: Quad) -> Self {
        Self {
            boundary,
            points: Vec::new(),
            children: None,
        }
    }

    /// Build a tree bounding all of `points` and insert them.
    ///
    /// The boundary is the bounding square of the points plus a margin, so
    /// every point is strictly inside it. An empty point list produces an
    /// empty unit tree about the origin.
    pub fn from_points(points: &[Vector2]) -> Self {
        const BOUNDS_MARGIN: f64 = 1.0;

        if points.is_empty() {
            return Self::new(Quad::new(Vector2::new(0.0, 0.0), BOUNDS_MARGIN));
        }

        let mut min = points[0];
        let mut max = points[0];
        for point in points.iter() {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }

        let centre = (min + max) / 2.0;
        let half_width = ((max.x - min.x).max(max.y - min.y)) / 2.0 + BOUNDS_MARGIN;

        let mut tree = Self::new(Quad::new(centre, half_width));
        for point in points.iter() {
            // Cannot fail, every point is inside the boundary by construction
            tree.insert(*point).ok();
        }

        tree
    }

    /// Insert a point into the QuadTree.
    pub fn insert(&mut self, point: Vector2) -> Result<(), QuadTreeError> {
        // Check if it's in the tree
        if !self.boundary.contains(&point) {
            return Err(QuadTreeError::PointNotInBounds(point, self.boundary));
        }

        // If there's a space in the node and it's not been divided add it to
        // the points list
        if self.points.len() < CAPACITY && self.children.is_none() {
            self.points.push(point);
            return Ok(());
        }

        // Otherwise subdivide if needed
        if self.children.is_none() {
            self.subdivide();
        }

        // And add the point to the first child it will fit into
        for child in self.children.as_mut().unwrap().iter_mut() {
            if child.insert(point).is_ok() {
                return Ok(());
            }
        }

        // A point inside the boundary always fits one of the children
        unreachable!("The point couldn't be added to the quad tree")
    }

    /// Return a list of all points within the given quad.
    pub fn query_in_quad(&self, quad: Quad) -> Vec<Vector2> {
        // Create points list
        let mut points = Vec::new();

        // Check that quad is in the tree, if not return an empty list
        if !self.boundary.intersects(&quad) {
            return points;
        }

        // Check self for the points
        for point in self.points.iter() {
            if quad.contains(point) {
                points.push(*point)
            }
        }

        // Otherwise search the children
        if let Some(ref children) = self.children {
            for child in children.iter() {
                points.extend(child.query_in_quad(quad));
            }
        }

        points
    }

    /// Return a list of all points within `radius` of `centre`.
    pub fn query_in_radius(&self, centre: Vector2, radius: f64) -> Vec<Vector2> {
        self.query_in_quad(Quad::new(centre, radius))
            .into_iter()
            .filter(|point| (point.x - centre.x).hypot(point.y - centre.y) <= radius)
            .collect()
    }

    fn subdivide(&mut self) {
        let hw = self.boundary.half_width / 2.0;
        let centre = self.boundary.centre;

        self.children = Some(Box::new([
            QuadTree::new(Quad::new(centre + Vector2::new(-hw, hw), hw)),
            QuadTree::new(Quad::new(centre + Vector2::new(hw, hw), hw)),
            QuadTree::new(Quad::new(centre + Vector2::new(-hw, -hw), hw)),
            QuadTree::new(Quad::new(centre + Vector2::new(hw, -hw), hw)),
        ]));
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
