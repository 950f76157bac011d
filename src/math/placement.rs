use super::{Point3, UnitQuaternion, Vector3, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Position, rotation and non-uniform scale of a boundary in world space.
///
/// World = position + rotation * (scale ⊙ local).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    position: Vector3,
    rotation: UnitQuaternion,
    scale: Vector3,
}

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

impl Placement {
    /// Creates a placement.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ZeroScale` if any scale component is zero,
    /// since such a placement cannot be inverted.
    pub fn new(position: Vector3, rotation: UnitQuaternion, scale: Vector3) -> Result<Self> {
        if scale.iter().any(|s| s.abs() < TOLERANCE) {
            return Err(GeometryError::ZeroScale {
                x: scale.x,
                y: scale.y,
                z: scale.z,
            }
            .into());
        }
        Ok(Self {
            position,
            rotation,
            scale,
        })
    }

    /// The identity placement.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// A pure translation.
    #[must_use]
    pub fn from_position(position: Vector3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    #[must_use]
    pub fn position(&self) -> Vector3 {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> UnitQuaternion {
        self.rotation
    }

    #[must_use]
    pub fn scale(&self) -> Vector3 {
        self.scale
    }

    /// Maps a local-space point into world space.
    #[must_use]
    pub fn to_world(&self, local: &Point3) -> Point3 {
        let scaled = local.coords.component_mul(&self.scale);
        Point3::from(self.rotation * scaled + self.position)
    }

    /// Maps a world-space point into local space.
    #[must_use]
    pub fn to_local(&self, world: &Point3) -> Point3 {
        let unrotated = self.rotation.inverse() * (world.coords - self.position);
        Point3::from(unrotated.component_div(&self.scale))
    }
}
