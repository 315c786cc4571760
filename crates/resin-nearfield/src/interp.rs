//! Angular interpolation between grid rows.

use crate::error::{NearFieldError, NearFieldResult};
use crate::geometry::HeadModel;
use crate::shelf::{GRID_STEP_DEGREES, MAX_ANGLE_DEGREES, ShelfParams};

impl HeadModel {
    /// Shelf parameters at an arbitrary angle from the ear axis.
    ///
    /// Brackets `theta` between the two neighbouring grid angles and blends
    /// each parameter linearly. Angles exactly on the grid return the grid
    /// row unchanged.
    ///
    /// # Arguments
    /// * `theta` - Angle from the ear axis in degrees, in [0, 180]
    /// * `rho` - Source distance divided by the head radius, at least 1.0
    pub fn interpolate_shelf_params(&self, theta: f32, rho: f32) -> NearFieldResult<ShelfParams> {
        if !(0.0..=MAX_ANGLE_DEGREES).contains(&theta) {
            return Err(NearFieldError::AngleOutOfRange(theta));
        }

        let position = theta / GRID_STEP_DEGREES;
        let lo = position.floor();
        let index = lo as usize;
        let lower = self.shelf_params(index, rho)?;

        let t = position - lo;
        if t == 0.0 {
            return Ok(lower);
        }
        let upper = self.shelf_params(index + 1, rho)?;
        Ok(lower.lerp(upper, t))
    }
}

/// Shelf parameters at an arbitrary angle for the default head.
///
/// See [`HeadModel::interpolate_shelf_params`].
pub fn interpolate_shelf_params(theta: f32, rho: f32) -> NearFieldResult<ShelfParams> {
    HeadModel::DEFAULT.interpolate_shelf_params(theta, rho)
}
