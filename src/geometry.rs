//! # Geometry
//!
//! Small float geometry types shared by measurement, layout and drawing.
//! Everything is in the font's native pixel unit; scaling is applied as a
//! final pass by the caller that owns the scale.

use serde::Serialize;
use std::ops::{Add, AddAssign, Mul, Sub};

/// A 2D vector or point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise multiplication.
    pub fn scaled(self, scale: Vec2) -> Self {
        Self::new(self.x * scale.x, self.y * scale.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn offset(self, by: Vec2) -> Self {
        Self::new(self.x + by.x, self.y + by.y, self.width, self.height)
    }

    /// Multiply position and extent by `scale`.
    pub fn scaled(self, scale: Vec2) -> Self {
        Self::new(
            self.x * scale.x,
            self.y * scale.y,
            self.width * scale.x,
            self.height * scale.y,
        )
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// Min/max extents accumulated while walking glyphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Bounds {
    /// A zero-extent bounds pinned at `point`.
    pub fn at(point: Vec2) -> Self {
        Self {
            x: point.x,
            y: point.y,
            x2: point.x,
            y2: point.y,
        }
    }

    pub fn apply_scale(&mut self, scale: Vec2) {
        self.x *= scale.x;
        self.y *= scale.y;
        self.x2 *= scale.x;
        self.y2 *= scale.y;
    }
}

/// A 2D affine transform laid out like a 3x2 row-vector matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Transform {
    /// Build the sprite-style transform: scale, then rotate about `origin`,
    /// then translate so that `origin` lands on `position`.
    pub fn sprite(position: Vec2, scale: Vec2, rotation: f32, origin: Vec2) -> Self {
        if rotation == 0.0 {
            return Self {
                m11: scale.x,
                m12: 0.0,
                m21: 0.0,
                m22: scale.y,
                dx: position.x - origin.x * scale.x,
                dy: position.y - origin.y * scale.y,
            };
        }

        let (sin, cos) = rotation.sin_cos();
        let m11 = scale.x * cos;
        let m12 = scale.x * sin;
        let m21 = scale.y * -sin;
        let m22 = scale.y * cos;
        Self {
            m11,
            m12,
            m21,
            m22,
            dx: position.x - origin.x * m11 - origin.y * m21,
            dy: position.y - origin.x * m12 - origin.y * m22,
        }
    }

    pub fn apply(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            v.x * self.m11 + v.y * self.m21 + self.dx,
            v.x * self.m12 + v.y * self.m22 + self.dy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_transform_without_rotation() {
        let t = Transform::sprite(Vec2::new(10.0, 20.0), Vec2::new(2.0, 3.0), 0.0, Vec2::ZERO);
        assert_eq!(t.apply(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 23.0));
    }

    #[test]
    fn test_transform_origin_maps_to_position() {
        let origin = Vec2::new(5.0, 7.0);
        let position = Vec2::new(100.0, 50.0);
        let t = Transform::sprite(position, Vec2::new(1.5, 0.5), 0.7, origin);
        assert!(approx(t.apply(origin), position));
    }

    #[test]
    fn test_transform_quarter_turn() {
        let t = Transform::sprite(Vec2::ZERO, Vec2::ONE, std::f32::consts::FRAC_PI_2, Vec2::ZERO);
        assert!(approx(t.apply(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(!r.contains(Vec2::new(10.0, 5.0)));
    }
}
