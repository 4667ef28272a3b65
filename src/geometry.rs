//! Plain integer geometry used throughout the core.
//!
//! Positions are signed (outputs may sit left of or above the origin),
//! sizes unsigned. All types are small `Copy` values passed freely between
//! the engine, policies and backends.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// A point in global compositor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A signed displacement between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Displacement {
    pub dx: i32,
    pub dy: i32,
}

impl Displacement {
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

impl Add<Displacement> for Point {
    type Output = Point;

    fn add(self, d: Displacement) -> Point {
        Point::new(self.x + d.dx, self.y + d.dy)
    }
}

impl AddAssign<Displacement> for Point {
    fn add_assign(&mut self, d: Displacement) {
        self.x += d.dx;
        self.y += d.dy;
    }
}

impl Sub for Point {
    type Output = Displacement;

    fn sub(self, other: Point) -> Displacement {
        Displacement::new(self.x - other.x, self.y - other.y)
    }
}

/// An axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub top_left: Point,
    pub size: Size,
}

impl Rectangle {
    pub fn new(top_left: Point, size: Size) -> Self {
        Self { top_left, size }
    }

    pub fn from_loc_and_size((x, y): (i32, i32), (width, height): (u32, u32)) -> Self {
        Self {
            top_left: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Exclusive bottom-right corner.
    pub fn bottom_right(&self) -> Point {
        Point::new(
            self.top_left.x + self.size.width as i32,
            self.top_left.y + self.size.height as i32,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.size.width == 0 || self.size.height == 0
    }

    pub fn contains(&self, p: Point) -> bool {
        let br = self.bottom_right();
        p.x >= self.top_left.x && p.y >= self.top_left.y && p.x < br.x && p.y < br.y
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        let br = self.bottom_right();
        let obr = other.bottom_right();
        other.top_left.x >= self.top_left.x
            && other.top_left.y >= self.top_left.y
            && obr.x <= br.x
            && obr.y <= br.y
    }

    /// The overlapping region, or an empty rectangle when disjoint.
    pub fn intersection(&self, other: &Rectangle) -> Rectangle {
        let x0 = self.top_left.x.max(other.top_left.x);
        let y0 = self.top_left.y.max(other.top_left.y);
        let x1 = self.bottom_right().x.min(other.bottom_right().x);
        let y1 = self.bottom_right().y.min(other.bottom_right().y);

        if x1 <= x0 || y1 <= y0 {
            return Rectangle::default();
        }
        Rectangle::from_loc_and_size((x0, y0), ((x1 - x0) as u32, (y1 - y0) as u32))
    }

    pub fn overlap_area(&self, other: &Rectangle) -> u64 {
        self.intersection(other).size.area()
    }

    /// Smallest rectangle covering both, treating empty rectangles as absent.
    pub fn bounding_with(&self, other: &Rectangle) -> Rectangle {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x0 = self.top_left.x.min(other.top_left.x);
        let y0 = self.top_left.y.min(other.top_left.y);
        let x1 = self.bottom_right().x.max(other.bottom_right().x);
        let y1 = self.bottom_right().y.max(other.bottom_right().y);
        Rectangle::from_loc_and_size((x0, y0), ((x1 - x0) as u32, (y1 - y0) as u32))
    }
}

/// Bounding rectangle of a set of display rectangles.
pub fn bounding_rectangle(rects: &[Rectangle]) -> Rectangle {
    rects
        .iter()
        .fold(Rectangle::default(), |acc, r| acc.bounding_with(r))
}
