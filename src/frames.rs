//! Frame-tagged coordinate types.
//!
//! Landmarks live in three frames: world (physical RAS), index (pixel
//! coordinates of the original slice) and canvas (the fixed-size predictor
//! input). Points carry their frame as a zero-sized marker so that
//! arithmetic between frames does not type-check; the only way across is
//! through [`crate::processing::affine`] or [`crate::processing::letterbox`].

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Mul, Neg, Sub};

pub trait Frame: Copy + fmt::Debug + PartialEq + Default + Send + Sync + 'static {
    const NAME: &'static str;
}

/// Physical coordinates reached from index space through the volume affine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct World;

/// Pixel/voxel coordinates of the original, un-resized slice.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Index;

/// Coordinates on the letterboxed predictor canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Canvas;

impl Frame for World {
    const NAME: &'static str = "world";
}

impl Frame for Index {
    const NAME: &'static str = "index";
}

impl Frame for Canvas {
    const NAME: &'static str = "canvas";
}

#[derive(Clone, Copy, PartialEq, Default)]
pub struct Point2D<F: Frame> {
    pub x: f64,
    pub y: f64,
    frame: PhantomData<F>,
}

#[derive(Clone, Copy, PartialEq, Default)]
pub struct Vector2D<F: Frame> {
    pub x: f64,
    pub y: f64,
    frame: PhantomData<F>,
}

#[derive(Clone, Copy, PartialEq, Default)]
pub struct Point3D<F: Frame> {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    frame: PhantomData<F>,
}

pub type WorldPoint = Point2D<World>;
pub type IndexPoint = Point2D<Index>;
pub type CanvasPoint = Point2D<Canvas>;

impl<F: Frame> Point2D<F> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            frame: PhantomData,
        }
    }

    /// Lifts the point onto the `z` plane of the same frame.
    pub fn with_z(self, z: f64) -> Point3D<F> {
        Point3D::new(self.x, self.y, z)
    }

    pub fn to_tuple(self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl<F: Frame> Vector2D<F> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            frame: PhantomData,
        }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn to_tuple(self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl<F: Frame> Point3D<F> {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            frame: PhantomData,
        }
    }

    /// Drops the third axis.
    pub fn xy(self) -> Point2D<F> {
        Point2D::new(self.x, self.y)
    }
}

impl<F: Frame> From<(f64, f64)> for Point2D<F> {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl<F: Frame> Sub for Point2D<F> {
    type Output = Vector2D<F>;

    fn sub(self, rhs: Self) -> Vector2D<F> {
        Vector2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<F: Frame> Add<Vector2D<F>> for Point2D<F> {
    type Output = Point2D<F>;

    fn add(self, rhs: Vector2D<F>) -> Point2D<F> {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<F: Frame> Neg for Vector2D<F> {
    type Output = Vector2D<F>;

    fn neg(self) -> Vector2D<F> {
        Vector2D::new(-self.x, -self.y)
    }
}

impl<F: Frame> Mul<f64> for Vector2D<F> {
    type Output = Vector2D<F>;

    fn mul(self, rhs: f64) -> Vector2D<F> {
        Vector2D::new(self.x * rhs, self.y * rhs)
    }
}

impl<F: Frame> fmt::Debug for Point2D<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Point({}, {})", F::NAME, self.x, self.y)
    }
}

impl<F: Frame> fmt::Debug for Vector2D<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Vector({}, {})", F::NAME, self.x, self.y)
    }
}

impl<F: Frame> fmt::Debug for Point3D<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Point({}, {}, {})", F::NAME, self.x, self.y, self.z)
    }
}
