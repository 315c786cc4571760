//! Head geometry and source direction helpers.
//!
//! The near-field model is expressed relative to one ear: the angle between
//! the ear axis and the source direction, and the source distance divided by
//! the head radius. [`HeadModel`] carries the head dimensions and the distance
//! range in which near-field filtering applies.
//!
//! # Example
//!
//! ```
//! use rhizome_resin_nearfield::{HeadModel, ear_angles};
//!
//! let head = HeadModel::default();
//! let [left, right] = ear_angles(30.0, 0.0).unwrap();
//! let rho = head.normalized_distance(0.5).unwrap();
//! assert!(left < right);
//! assert!(rho > 1.0);
//! ```

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{NearFieldError, NearFieldResult};
use crate::shelf::MAX_ANGLE_DEGREES;

/// Head radius the regression table was fitted on, in meters.
pub const REFERENCE_HEAD_RADIUS: f32 = 0.0875;

/// Default rendering head radius in meters.
///
/// Linear combination of head width, height and depth from Algazi, Avendano
/// and Duda, "Estimation of a spherical-head model from anthropometry" (2001).
pub const DEFAULT_HEAD_RADIUS: f32 = 0.09096;

/// Far-field threshold as a multiple of the head radius.
///
/// At this distance the largest filter deviation is about 0.5 dB.
pub const FAR_FIELD_RHO: f32 = 34.0;

/// Head dimensions and near-field distance range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeadModel {
    /// Head radius in meters.
    pub radius: f32,
    /// Speed of sound in meters per second.
    pub speed_of_sound: f32,
    /// Closest allowed source distance from the head center, in meters.
    pub near_field_limit: f32,
    /// Distance from the head center beyond which no filtering is applied.
    pub far_field_threshold: f32,
}

impl Default for HeadModel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl HeadModel {
    /// Default head: 9.1 cm radius, near-field from 15 cm to 34 radii.
    pub const DEFAULT: Self = Self {
        radius: DEFAULT_HEAD_RADIUS,
        speed_of_sound: 343.0,
        near_field_limit: 0.15,
        far_field_threshold: DEFAULT_HEAD_RADIUS * FAR_FIELD_RHO,
    };

    /// Sets the head radius, keeping the far-field threshold at 34 radii.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self.far_field_threshold = radius * FAR_FIELD_RHO;
        self
    }

    /// Sets the speed of sound.
    pub fn with_speed_of_sound(mut self, speed_of_sound: f32) -> Self {
        self.speed_of_sound = speed_of_sound;
        self
    }

    /// Sets the closest allowed source distance.
    pub fn with_near_field_limit(mut self, limit: f32) -> Self {
        self.near_field_limit = limit;
        self
    }

    /// Sets the distance beyond which sources are treated as far field.
    pub fn with_far_field_threshold(mut self, threshold: f32) -> Self {
        self.far_field_threshold = threshold;
        self
    }

    /// Checks that the configuration describes a usable head.
    pub fn validate(&self) -> NearFieldResult<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(NearFieldError::InvalidHeadModel("radius must be positive"));
        }
        if !(self.speed_of_sound.is_finite() && self.speed_of_sound > 0.0) {
            return Err(NearFieldError::InvalidHeadModel(
                "speed of sound must be positive",
            ));
        }
        if !(self.near_field_limit.is_finite() && self.near_field_limit >= self.radius) {
            return Err(NearFieldError::InvalidHeadModel(
                "near-field limit must not be inside the head",
            ));
        }
        if self.far_field_threshold.is_nan() || self.far_field_threshold <= self.near_field_limit {
            return Err(NearFieldError::InvalidHeadModel(
                "far-field threshold must exceed the near-field limit",
            ));
        }
        Ok(())
    }

    /// Factor that turns the normalized regression output into Hz: `c / (2 pi a)`.
    pub fn fc_scale(&self) -> f32 {
        self.speed_of_sound / (std::f32::consts::TAU * self.radius)
    }

    /// Corner frequency scaling for the difference between this head and the
    /// reference head.
    pub fn warp(&self) -> f32 {
        REFERENCE_HEAD_RADIUS / self.radius
    }

    /// Converts a distance from the head center to `rho`.
    ///
    /// Distances closer than [`near_field_limit`](Self::near_field_limit) are
    /// rejected.
    pub fn normalized_distance(&self, distance: f32) -> NearFieldResult<f32> {
        if !distance.is_finite() || distance < self.near_field_limit {
            return Err(NearFieldError::DistanceOutOfRange(distance));
        }
        Ok(distance / self.radius)
    }

    /// Returns true if a source at `distance` needs no near-field filtering.
    pub fn is_far_field(&self, distance: f32) -> bool {
        distance >= self.far_field_threshold
    }
}

/// Angles between a source direction and the left and right ear axes.
///
/// # Arguments
/// * `azimuth` - Degrees, counter-clockwise from the front (90 = left)
/// * `elevation` - Degrees above the horizontal plane
///
/// # Returns
/// `[left, right]` in degrees, each in [0, 180]; 0 means the source faces
/// that ear.
pub fn ear_angles(azimuth: f32, elevation: f32) -> NearFieldResult<[f32; 2]> {
    if !azimuth.is_finite() {
        return Err(NearFieldError::AngleOutOfRange(azimuth));
    }
    if !elevation.is_finite() {
        return Err(NearFieldError::AngleOutOfRange(elevation));
    }

    let lateral = elevation.to_radians().cos() * azimuth.to_radians().sin();
    Ok(from_lateral(lateral))
}

/// Angles between a listener-space direction and the left and right ear axes.
///
/// Listener space is +X right, +Y up, -Z forward. The direction does not need
/// to be normalized, but must be non-zero.
pub fn ear_angles_from_direction(direction: Vec3) -> NearFieldResult<[f32; 2]> {
    let unit = direction
        .try_normalize()
        .ok_or(NearFieldError::DistanceOutOfRange(direction.length()))?;
    Ok(from_lateral(-unit.x))
}

/// `lateral` is the cosine of the angle to the left ear axis.
fn from_lateral(lateral: f32) -> [f32; 2] {
    let left = lateral.clamp(-1.0, 1.0).acos().to_degrees();
    [left, MAX_ANGLE_DEGREES - left]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_default_is_valid() {
        assert!(HeadModel::default().validate().is_ok());
        assert_eq!(HeadModel::default(), HeadModel::DEFAULT);
    }

    #[test]
    fn test_invalid_configurations() {
        let head = HeadModel::default();
        assert!(head.with_radius(0.0).validate().is_err());
        assert!(head.with_speed_of_sound(-1.0).validate().is_err());
        assert!(head.with_near_field_limit(0.05).validate().is_err());
        assert!(head.with_far_field_threshold(0.1).validate().is_err());
    }

    #[test]
    fn test_with_radius_moves_far_field() {
        let head = HeadModel::default().with_radius(0.1);
        assert!(close(head.far_field_threshold, 3.4));
    }

    #[test]
    fn test_scales() {
        let head = HeadModel::default();
        assert!((head.fc_scale() - 600.155).abs() < 0.01);
        assert!(close(head.warp(), 0.0875 / 0.09096));
        assert!(close(head.with_radius(REFERENCE_HEAD_RADIUS).warp(), 1.0));
    }

    #[test]
    fn test_normalized_distance() {
        let head = HeadModel::default();
        let rho = head.normalized_distance(head.radius * 2.0).unwrap();
        assert!(close(rho, 2.0));

        assert_eq!(
            head.normalized_distance(0.1),
            Err(NearFieldError::DistanceOutOfRange(0.1))
        );
        assert!(head.normalized_distance(f32::NAN).is_err());
    }

    #[test]
    fn test_far_field() {
        let head = HeadModel::default();
        assert!(!head.is_far_field(1.0));
        assert!(head.is_far_field(3.1));
        assert!(head.is_far_field(f32::INFINITY));
    }

    #[test]
    fn test_ear_angles_front() {
        let [left, right] = ear_angles(0.0, 0.0).unwrap();
        assert!(close(left, 90.0));
        assert!(close(right, 90.0));
    }

    #[test]
    fn test_ear_angles_sides() {
        let [left, right] = ear_angles(90.0, 0.0).unwrap();
        assert!(close(left, 0.0), "left ear should face the source: {left}");
        assert!(close(right, 180.0));

        let [left, right] = ear_angles(-90.0, 0.0).unwrap();
        assert!(close(left, 180.0));
        assert!(close(right, 0.0));
    }

    #[test]
    fn test_ear_angles_overhead() {
        let [left, right] = ear_angles(45.0, 90.0).unwrap();
        assert!(close(left, 90.0));
        assert!(close(right, 90.0));
    }

    #[test]
    fn test_ear_angles_reject_nan() {
        assert!(ear_angles(f32::NAN, 0.0).is_err());
        assert!(ear_angles(0.0, f32::INFINITY).is_err());
    }

    #[test]
    fn test_direction_matches_spherical() {
        let azimuth: f32 = 30.0;
        let elevation: f32 = 20.0;
        let (az, el) = (azimuth.to_radians(), elevation.to_radians());
        let direction = Vec3::new(-el.cos() * az.sin(), el.sin(), -el.cos() * az.cos()) * 3.0;

        let a = ear_angles(azimuth, elevation).unwrap();
        let b = ear_angles_from_direction(direction).unwrap();
        assert!(close(a[0], b[0]) && close(a[1], b[1]), "{a:?} vs {b:?}");
    }

    #[test]
    fn test_direction_zero_vector() {
        assert!(ear_angles_from_direction(Vec3::ZERO).is_err());
    }
}
