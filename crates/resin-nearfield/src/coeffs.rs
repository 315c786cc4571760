//! Digital shelf coefficients.
//!
//! Discretizes the first-order high shelf with a tangent-prewarped bilinear
//! transform:
//!
//! ```text
//! H(z) = (b0 + b1 z^-1) / (1 + a1 z^-1)
//! ```
//!
//! The DC gain of the result is `g0` and the Nyquist gain is `g0 + g_inf`.

use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{NearFieldError, NearFieldResult};
use crate::geometry::{HeadModel, ear_angles};

/// Coefficients of a first-order IIR section.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShelfCoeffs {
    /// Feedforward coefficient for the current input.
    pub b0: f32,
    /// Feedforward coefficient for the previous input.
    pub b1: f32,
    /// Feedback coefficient for the previous output.
    pub a1: f32,
}

impl Default for ShelfCoeffs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ShelfCoeffs {
    /// Pass-through filter.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        a1: 0.0,
    };

    /// Evaluates the transfer function on the unit circle.
    ///
    /// # Arguments
    /// * `freq` - Frequency in Hz
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    /// `(magnitude, phase)` with phase in radians
    pub fn response(&self, freq: f32, sample_rate: f32) -> (f32, f32) {
        let w = 2.0 * PI * freq / sample_rate;
        let (sin, cos) = w.sin_cos();

        let num_re = self.b0 + self.b1 * cos;
        let num_im = -self.b1 * sin;
        let den_re = 1.0 + self.a1 * cos;
        let den_im = -self.a1 * sin;

        let magnitude = num_re.hypot(num_im) / den_re.hypot(den_im);
        let phase = num_im.atan2(num_re) - den_im.atan2(den_re);
        (magnitude, phase)
    }

    /// Magnitude response in dB.
    pub fn magnitude_db(&self, freq: f32, sample_rate: f32) -> f32 {
        gain_to_db(self.response(freq, sample_rate).0)
    }

    /// Linear gain at DC.
    #[inline]
    pub fn dc_gain(&self) -> f32 {
        ((self.b0 + self.b1) / (1.0 + self.a1)).abs()
    }

    /// Linear gain at Nyquist.
    #[inline]
    pub fn nyquist_gain(&self) -> f32 {
        ((self.b0 - self.b1) / (1.0 - self.a1)).abs()
    }

    /// Returns true if the pole lies inside the unit circle.
    #[inline]
    pub fn is_stable(&self) -> bool {
        self.a1.abs() < 1.0
    }
}

/// Shelf coefficients for both ears.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EarCoeffs {
    /// Left ear filter.
    pub left: ShelfCoeffs,
    /// Right ear filter.
    pub right: ShelfCoeffs,
}

impl EarCoeffs {
    /// Pass-through on both ears.
    pub const IDENTITY: Self = Self {
        left: ShelfCoeffs::IDENTITY,
        right: ShelfCoeffs::IDENTITY,
    };
}

#[inline]
fn db_to_gain(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

#[inline]
fn gain_to_db(gain: f32) -> f32 {
    20.0 * gain.log10()
}

fn check_sample_rate(sample_rate: f32) -> NearFieldResult<()> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(NearFieldError::InvalidSampleRate(sample_rate))
    }
}

impl HeadModel {
    /// Synthesizes shelf coefficients for this head.
    ///
    /// The corner frequency is scaled by [`warp`](Self::warp) before
    /// prewarping, so parameters fitted on the reference head land where this
    /// head expects them.
    ///
    /// # Arguments
    /// * `g0` - DC gain in dB
    /// * `g_inf` - High-frequency gain in dB, relative to `g0`
    /// * `fc` - Corner frequency in Hz
    /// * `sample_rate` - Sample rate in Hz
    pub fn shelf_coeffs(
        &self,
        g0: f32,
        g_inf: f32,
        fc: f32,
        sample_rate: f32,
    ) -> NearFieldResult<ShelfCoeffs> {
        check_sample_rate(sample_rate)?;
        if !(g0.is_finite() && g_inf.is_finite()) {
            return Err(NearFieldError::NonFiniteGain { g0, g_inf });
        }
        let nyquist = sample_rate / 2.0;
        let warped = self.warp() * fc;
        if !(fc > 0.0 && fc < nyquist && warped < nyquist) {
            return Err(NearFieldError::CornerFrequencyOutOfRange { fc, nyquist });
        }

        let v_inf = db_to_gain(g_inf);
        let gain = db_to_gain(g0);
        let t = (PI * warped / sample_rate).tan();
        let a = (v_inf * t - 1.0) / (v_inf * t + 1.0);

        let b0 = (1.0 + (1.0 - a) / 2.0 * (v_inf - 1.0)) * gain;
        let b1 = (a + (a - 1.0) / 2.0 * (v_inf - 1.0)) * gain;
        debug_assert!(a.abs() < 1.0, "unstable shelf pole: {a}");

        Ok(ShelfCoeffs { b0, b1, a1: a })
    }

    /// Near-field filter coefficients for one ear.
    ///
    /// # Arguments
    /// * `theta` - Angle from the ear axis in degrees, in [0, 180]
    /// * `rho` - Source distance divided by the head radius, at least 1.0
    /// * `sample_rate` - Sample rate in Hz
    pub fn dvf_coeffs(
        &self,
        theta: f32,
        rho: f32,
        sample_rate: f32,
    ) -> NearFieldResult<ShelfCoeffs> {
        let p = self.interpolate_shelf_params(theta, rho)?;
        self.shelf_coeffs(p.g0, p.g_inf, p.fc, sample_rate)
    }

    /// Near-field filter coefficients for both ears.
    ///
    /// Sources at or beyond the far-field threshold get
    /// [`EarCoeffs::IDENTITY`].
    ///
    /// # Arguments
    /// * `azimuth` - Degrees, counter-clockwise from the front (90 = left)
    /// * `elevation` - Degrees above the horizontal plane
    /// * `distance` - Distance from the head center in meters
    /// * `sample_rate` - Sample rate in Hz
    pub fn ear_coeffs(
        &self,
        azimuth: f32,
        elevation: f32,
        distance: f32,
        sample_rate: f32,
    ) -> NearFieldResult<EarCoeffs> {
        check_sample_rate(sample_rate)?;
        let [left, right] = ear_angles(azimuth, elevation)?;
        if self.is_far_field(distance) {
            return Ok(EarCoeffs::IDENTITY);
        }
        let rho = self.normalized_distance(distance)?;

        Ok(EarCoeffs {
            left: self.dvf_coeffs(left, rho, sample_rate)?,
            right: self.dvf_coeffs(right, rho, sample_rate)?,
        })
    }
}

/// Synthesizes shelf coefficients for the default head.
///
/// See [`HeadModel::shelf_coeffs`].
pub fn shelf_coeffs(
    g0: f32,
    g_inf: f32,
    fc: f32,
    sample_rate: f32,
) -> NearFieldResult<ShelfCoeffs> {
    HeadModel::DEFAULT.shelf_coeffs(g0, g_inf, fc, sample_rate)
}

/// Near-field filter coefficients for one ear of the default head.
///
/// See [`HeadModel::dvf_coeffs`].
pub fn dvf_coeffs(theta: f32, rho: f32, sample_rate: f32) -> NearFieldResult<ShelfCoeffs> {
    HeadModel::DEFAULT.dvf_coeffs(theta, rho, sample_rate)
}
