//! Per-source coefficient cache.
//!
//! Renderers update source positions at control rate, usually once per block,
//! and most blocks do not move the source at all. [`NearFieldSource`] keeps
//! the last computed [`EarCoeffs`] and only re-evaluates the model when the
//! direction, the distance, the head or the sample rate changed.

use log::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coeffs::EarCoeffs;
use crate::error::{NearFieldError, NearFieldResult};
use crate::geometry::HeadModel;

/// Key the cached coefficients were computed for.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CacheKey {
    head: HeadModel,
    sample_rate: f32,
}

/// A sound source with cached near-field coefficients.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NearFieldSource {
    azimuth: f32,
    elevation: f32,
    distance: f32,
    #[cfg_attr(feature = "serde", serde(skip))]
    coeffs: EarCoeffs,
    #[cfg_attr(feature = "serde", serde(skip))]
    key: Option<CacheKey>,
}

impl Default for NearFieldSource {
    /// A source straight ahead, one meter away.
    fn default() -> Self {
        Self {
            azimuth: 0.0,
            elevation: 0.0,
            distance: 1.0,
            coeffs: EarCoeffs::IDENTITY,
            key: None,
        }
    }
}

fn check_direction(azimuth: f32, elevation: f32) -> NearFieldResult<()> {
    for angle in [azimuth, elevation] {
        if !angle.is_finite() {
            warn!("rejecting source direction ({azimuth}, {elevation})");
            return Err(NearFieldError::AngleOutOfRange(angle));
        }
    }
    Ok(())
}

fn check_distance(distance: f32) -> NearFieldResult<()> {
    // Infinity is a valid far-field distance.
    if distance.is_nan() || distance <= 0.0 {
        warn!("rejecting source distance {distance}");
        return Err(NearFieldError::DistanceOutOfRange(distance));
    }
    Ok(())
}

impl NearFieldSource {
    /// Creates a source at the given position.
    ///
    /// # Arguments
    /// * `azimuth` - Degrees, counter-clockwise from the front (90 = left)
    /// * `elevation` - Degrees above the horizontal plane
    /// * `distance` - Distance from the head center in meters
    pub fn new(azimuth: f32, elevation: f32, distance: f32) -> NearFieldResult<Self> {
        check_direction(azimuth, elevation)?;
        check_distance(distance)?;
        Ok(Self {
            azimuth,
            elevation,
            distance,
            ..Self::default()
        })
    }

    /// Returns `(azimuth, elevation)` in degrees.
    pub fn direction(&self) -> (f32, f32) {
        (self.azimuth, self.elevation)
    }

    /// Returns the distance from the head center in meters.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Returns true if the next [`coeffs`](Self::coeffs) call will recompute.
    pub fn is_dirty(&self) -> bool {
        self.key.is_none()
    }

    /// Forces the next [`coeffs`](Self::coeffs) call to recompute.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    /// Moves the source to a new direction.
    pub fn set_direction(&mut self, azimuth: f32, elevation: f32) -> NearFieldResult<()> {
        check_direction(azimuth, elevation)?;
        if azimuth != self.azimuth || elevation != self.elevation {
            self.azimuth = azimuth;
            self.elevation = elevation;
            self.invalidate();
        }
        Ok(())
    }

    /// Moves the source to a new distance.
    ///
    /// Rejects NaN and non-positive distances. Whether the distance is inside
    /// the head's near-field range is checked by [`coeffs`](Self::coeffs).
    pub fn set_distance(&mut self, distance: f32) -> NearFieldResult<()> {
        check_distance(distance)?;
        if distance != self.distance {
            self.distance = distance;
            self.invalidate();
        }
        Ok(())
    }

    /// Returns the coefficients for both ears, recomputing them if needed.
    pub fn coeffs(&mut self, head: &HeadModel, sample_rate: f32) -> NearFieldResult<EarCoeffs> {
        let key = CacheKey {
            head: *head,
            sample_rate,
        };
        if self.key == Some(key) {
            return Ok(self.coeffs);
        }

        if head.is_far_field(self.distance) {
            trace!(
                "source at {} m is in the far field, bypassing",
                self.distance
            );
        }
        let coeffs = head
            .ear_coeffs(self.azimuth, self.elevation, self.distance, sample_rate)
            .inspect_err(|e| warn!("near-field update failed: {e}"))?;

        debug!(
            "recomputed near-field coefficients: azimuth {}, elevation {}, distance {} m, {} Hz",
            self.azimuth, self.elevation, self.distance, sample_rate
        );
        self.coeffs = coeffs;
        self.key = Some(key);
        Ok(coeffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    #[test]
    fn test_first_call_computes() {
        let head = HeadModel::default();
        let mut source = NearFieldSource::new(45.0, 10.0, 0.4).unwrap();
        assert!(source.is_dirty());

        let c = source.coeffs(&head, SAMPLE_RATE).unwrap();
        assert!(!source.is_dirty());
        assert_eq!(c, head.ear_coeffs(45.0, 10.0, 0.4, SAMPLE_RATE).unwrap());
    }

    #[test]
    fn test_unchanged_values_keep_cache() {
        let head = HeadModel::default();
        let mut source = NearFieldSource::new(45.0, 10.0, 0.4).unwrap();
        source.coeffs(&head, SAMPLE_RATE).unwrap();

        source.set_direction(45.0, 10.0).unwrap();
        source.set_distance(0.4).unwrap();
        assert!(!source.is_dirty());
    }

    #[test]
    fn test_changes_mark_dirty() {
        let head = HeadModel::default();
        let mut source = NearFieldSource::new(45.0, 10.0, 0.4).unwrap();
        let before = source.coeffs(&head, SAMPLE_RATE).unwrap();

        source.set_distance(0.25).unwrap();
        assert!(source.is_dirty());
        let after = source.coeffs(&head, SAMPLE_RATE).unwrap();
        assert_ne!(before, after);

        source.set_direction(-45.0, 10.0).unwrap();
        assert!(source.is_dirty());
        let mirrored = source.coeffs(&head, SAMPLE_RATE).unwrap();
        assert!((mirrored.left.b0 - after.right.b0).abs() < 1e-4);
    }

    #[test]
    fn test_sample_rate_change_recomputes() {
        let head = HeadModel::default();
        let mut source = NearFieldSource::new(90.0, 0.0, 0.3).unwrap();
        let a = source.coeffs(&head, 44100.0).unwrap();
        let b = source.coeffs(&head, 96000.0).unwrap();
        assert_ne!(a, b);
        assert_eq!(b, head.ear_coeffs(90.0, 0.0, 0.3, 96000.0).unwrap());
    }

    #[test]
    fn test_head_change_recomputes() {
        let mut source = NearFieldSource::new(90.0, 0.0, 0.3).unwrap();
        let a = source.coeffs(&HeadModel::default(), SAMPLE_RATE).unwrap();
        let larger = HeadModel::default().with_radius(0.1);
        let b = source.coeffs(&larger, SAMPLE_RATE).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_far_field_is_identity() {
        let head = HeadModel::default();
        let mut source = NearFieldSource::new(30.0, 0.0, f32::INFINITY).unwrap();
        assert_eq!(source.coeffs(&head, SAMPLE_RATE).unwrap(), EarCoeffs::IDENTITY);
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(NearFieldSource::new(f32::NAN, 0.0, 1.0).is_err());

        let mut source = NearFieldSource::default();
        assert_eq!(
            source.set_distance(-1.0),
            Err(NearFieldError::DistanceOutOfRange(-1.0))
        );
        assert!(source.set_distance(f32::NAN).is_err());
        assert!(source.set_direction(0.0, f32::INFINITY).is_err());
        assert_eq!(source.distance(), 1.0);
        assert_eq!(source.direction(), (0.0, 0.0));
    }

    #[test]
    fn test_inside_near_field_limit_fails_on_update() {
        let head = HeadModel::default();
        let mut source = NearFieldSource::new(0.0, 0.0, 0.1).unwrap();
        assert_eq!(
            source.coeffs(&head, SAMPLE_RATE),
            Err(NearFieldError::DistanceOutOfRange(0.1))
        );
        assert!(source.is_dirty());
    }
}
