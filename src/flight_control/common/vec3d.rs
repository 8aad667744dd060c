use num::traits::{Float, Num};
use std::fmt::{Display, Formatter};

/// A 3D vector generic over any numeric type.
///
/// Local frames use north/east/down ordering, global frames latitude/longitude/altitude.
/// The vector itself is frame-agnostic; the horizontal helpers always act on the
/// first two components.
///
/// # Type Parameters
/// * `T` - The functionality for the vector depends on traits implemented by `T`.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct Vec3D<T> {
    /// The first component (north, or latitude).
    x: T,
    /// The second component (east, or longitude).
    y: T,
    /// The third component (down, altitude or target altitude depending on the frame).
    z: T,
}

impl<T: Copy> Vec3D<T> {
    /// Creates a new vector with the given components.
    pub const fn new(x: T, y: T, z: T) -> Self { Self { x, y, z } }

    /// Returns the first (north) component.
    pub const fn x(&self) -> T { self.x }

    /// Returns the second (east) component.
    pub const fn y(&self) -> T { self.y }

    /// Returns the third component.
    pub const fn z(&self) -> T { self.z }

    /// Returns a copy with the third component replaced.
    pub const fn with_z(self, z: T) -> Self { Self { x: self.x, y: self.y, z } }
}

impl<T: Num + Copy> Vec3D<T> {
    /// Creates a zero vector.
    pub fn zero() -> Self { Self::new(T::zero(), T::zero(), T::zero()) }
}

impl<T> Vec3D<T>
where
    T: Float,
{
    /// Computes the magnitude of the horizontal (north/east) projection.
    ///
    /// For a velocity vector this is the horizontal ground speed.
    pub fn horizontal_abs(&self) -> T { (self.x.powi(2) + self.y.powi(2)).sqrt() }

    /// Computes the Euclidean distance between the horizontal projections of
    /// the current vector and `other`. The third component is ignored.
    ///
    /// # Arguments
    /// * `other` - The other vector to compute the distance to.
    ///
    /// # Returns
    /// The horizontal distance as a scalar of type `T`.
    pub fn horizontal_distance(&self, other: &Self) -> T {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Checks whether the horizontal projection of `other` lies strictly inside
    /// `radius` around the current vector.
    pub fn horizontally_within(&self, other: &Self, radius: T) -> bool {
        self.horizontal_distance(other) < radius
    }
}

impl<T> From<(T, T, T)> for Vec3D<T> {
    /// Creates a `Vec3D` from a tuple of (x, y, z) values.
    fn from(tuple: (T, T, T)) -> Self { Vec3D { x: tuple.0, y: tuple.1, z: tuple.2 } }
}

impl<T: Display> Display for Vec3D<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}
