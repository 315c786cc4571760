//! Shelf parameter model.
//!
//! Evaluates the near-field high-shelf regression of Spagnol, Tavazzi and
//! Avanzini ("Distance rendering and perception of nearby virtual sound
//! sources with a near-field filter model", Applied Acoustics 115, 2017,
//! Table 1) at one of the 19 grid angles.
//!
//! Each parameter is a low-order rational function of the normalized
//! distance `rho`:
//!
//! ```text
//! g0    = (p11 rho + p21) / (rho^2 + q11 rho + q21)
//! g_inf = (p12 rho + p22) / (rho^2 + q12 rho + q22)
//! fc    = S (p13 rho^2 + p23 rho + p33) / (rho^2 + q13 rho + q23)
//! ```
//!
//! where `S = c / (2 pi a)` denormalizes the corner frequency for a head of
//! radius `a`. The coefficients are fitted constants from the paper and must
//! be kept exactly as published; several rows are ill-conditioned and do not
//! survive "simplification". For the same reason the rational functions are
//! evaluated in `f64` and only the results are narrowed to `f32`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{NearFieldError, NearFieldResult};
use crate::geometry::HeadModel;

/// Number of grid angles in the regression table (0, 10, ..., 180 degrees).
pub const GRID_LEN: usize = 19;

/// Spacing between grid angles in degrees.
pub const GRID_STEP_DEGREES: f32 = 10.0;

/// Largest angle covered by the grid, in degrees.
pub const MAX_ANGLE_DEGREES: f32 = 180.0;

/// Parameters of a first-order high-shelving filter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShelfParams {
    /// Gain at DC in dB.
    pub g0: f32,
    /// High-frequency shelf gain in dB, relative to `g0`.
    pub g_inf: f32,
    /// Corner frequency in Hz.
    pub fc: f32,
}

impl ShelfParams {
    /// Linear interpolation between two parameter sets, `t` in [0, 1].
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            g0: self.g0 + (other.g0 - self.g0) * t,
            g_inf: self.g_inf + (other.g_inf - self.g_inf) * t,
            fc: self.fc + (other.fc - self.fc) * t,
        }
    }

    /// Returns true if every parameter is finite.
    pub fn is_finite(&self) -> bool {
        self.g0.is_finite() && self.g_inf.is_finite() && self.fc.is_finite()
    }
}

/// Regression coefficients for one grid angle.
#[derive(Debug, Clone, Copy)]
struct ShelfRow {
    /// `[p11, p21, q11, q21]`
    g0: [f64; 4],
    /// `[p12, p22, q12, q22]`
    g_inf: [f64; 4],
    /// `[p13, p23, p33, q13, q23]`
    fc: [f64; 5],
}

const fn row(g0: [f64; 4], g_inf: [f64; 4], fc: [f64; 5]) -> ShelfRow {
    ShelfRow { g0, g_inf, fc }
}

#[rustfmt::skip]
const SHELF_TABLE: [ShelfRow; GRID_LEN] = [
    /*   0 */ row([ 12.97,  -9.69, -1.14,  0.219], [ -4.39,   2.123, -0.55,  -0.06 ], [  0.457,    -0.67,     0.174,   -1.75,     0.699]),
    /*  10 */ row([ 13.19, 234.2,  18.48, -8.5  ], [ -4.31,  -2.78,   0.59,  -0.17 ], [  0.455,     0.142,   -0.11,    -0.01,    -0.35 ]),
    /*  20 */ row([ 12.13, -11.2,  -1.25,  0.346], [ -4.18,   4.224, -1.01,  -0.02 ], [ -0.87,   3404.0,  -1699.0,   7354.0,  -5350.0  ]),
    /*  30 */ row([ 11.19,  -9.03, -1.02,  0.336], [ -4.01,   3.039, -0.56,  -0.32 ], [  0.465,    -0.91,     0.437,   -2.18,     1.188]),
    /*  40 */ row([  9.91,  -7.87, -0.83,  0.379], [ -3.87,  -0.57,   0.665, -1.13 ], [  0.494,    -0.67,     0.658,   -1.2,      0.256]),
    /*  50 */ row([  8.328, -7.42, -0.67,  0.421], [ -4.1,  -34.7,   11.39,  -8.3  ], [  0.549,    -1.21,     2.02,    -1.59,     0.816]),
    /*  60 */ row([  6.493, -7.31, -0.5,   0.423], [ -3.87,   3.271, -1.57,   0.637], [  0.663,    -1.76,     6.815,   -1.23,     1.166]),
    /*  70 */ row([  4.455, -7.28, -0.32,  0.382], [ -5.02,   0.023, -0.87,   0.325], [  0.691,     4.655,    0.614,   -0.89,     0.76 ]),
    /*  80 */ row([  2.274, -7.29, -0.11,  0.314], [ -6.72,  -8.96,   0.37,  -0.08 ], [  3.507,    55.09,   589.3,     29.23,    59.51 ]),
    /*  90 */ row([  0.018, -7.48, -0.13,  0.24 ], [ -8.69, -58.4,    5.446, -1.19 ], [-27.4,  10336.0,  16818.0,   1945.0,   1707.0  ]),
    /* 100 */ row([ -2.24,  -8.04,  0.395, 0.177], [-11.2,   11.47,  -1.13,   0.103], [  6.371,     1.735,   -9.39,    -0.06,    -1.12 ]),
    /* 110 */ row([ -4.43,  -9.23,  0.699, 0.132], [-12.1,    8.716, -0.63,  -0.12 ], [  7.032,    40.88,   -44.1,      5.635,   -6.18 ]),
    /* 120 */ row([ -6.49, -11.6,   1.084, 0.113], [-11.1,   21.8,   -2.01,   0.098], [  7.092,    23.86,   -23.6,      3.308,   -3.39 ]),
    /* 130 */ row([ -8.34, -17.4,   1.757, 0.142], [-11.1,    1.91,   0.15,  -0.4  ], [  7.463,   102.8,    -92.3,     13.88,   -12.7  ]),
    /* 140 */ row([ -9.93, -48.4,   4.764, 0.462], [ -9.72,  -0.04,   0.243, -0.41 ], [  7.453,    -6.14,    -1.81,    -0.88,    -0.19 ]),
    /* 150 */ row([-11.3,    9.149,-0.64, -0.14 ], [ -8.42,  -0.66,   0.147, -0.34 ], [  8.101,   -18.1,     10.54,    -2.23,     1.295]),
    /* 160 */ row([-12.2,    1.905, 0.109,-0.08 ], [ -7.44,   0.395, -0.18,  -0.18 ], [  8.702,    -9.05,     0.532,   -0.96,    -0.02 ]),
    /* 170 */ row([-12.8,   -0.75,  0.386,-0.06 ], [ -6.78,   2.662, -0.67,   0.05 ], [  8.925,    -9.03,     0.285,   -0.9,     -0.08 ]),
    /* 180 */ row([-13.0,   -1.32,  0.45, -0.05 ], [ -6.58,   3.387, -0.84,   0.131], [  9.317,    -6.89,    -2.08,    -0.57,    -0.4  ]),
];

#[inline]
fn first_order(c: &[f64; 4], rho: f64) -> f64 {
    (c[0] * rho + c[1]) / (rho * rho + c[2] * rho + c[3])
}

#[inline]
fn second_order(c: &[f64; 5], rho: f64) -> f64 {
    (c[0] * rho * rho + c[1] * rho + c[2]) / (rho * rho + c[3] * rho + c[4])
}

/// Checks that `rho` is a finite distance on or outside the head surface.
pub(crate) fn check_rho(rho: f32) -> NearFieldResult<()> {
    if rho.is_finite() && rho >= 1.0 {
        Ok(())
    } else {
        Err(NearFieldError::DistanceOutOfRange(rho))
    }
}

impl HeadModel {
    /// Evaluates the shelf regression at grid row `index` for this head.
    ///
    /// # Arguments
    /// * `index` - Grid row, the angle from the ear axis is `10 * index` degrees
    /// * `rho` - Source distance divided by the head radius, at least 1.0
    pub fn shelf_params(&self, index: usize, rho: f32) -> NearFieldResult<ShelfParams> {
        let row = SHELF_TABLE
            .get(index)
            .ok_or(NearFieldError::GridIndexOutOfRange(index))?;
        check_rho(rho)?;

        let rho = f64::from(rho);
        let fc_scale =
            f64::from(self.speed_of_sound) / (std::f64::consts::TAU * f64::from(self.radius));
        Ok(ShelfParams {
            g0: first_order(&row.g0, rho) as f32,
            g_inf: first_order(&row.g_inf, rho) as f32,
            fc: (fc_scale * second_order(&row.fc, rho)) as f32,
        })
    }
}

/// Evaluates the shelf regression at grid row `index` for the default head.
///
/// See [`HeadModel::shelf_params`].
pub fn shelf_params(index: usize, rho: f32) -> NearFieldResult<ShelfParams> {
    HeadModel::DEFAULT.shelf_params(index, rho)
}

/// Returns the grid angle in degrees of row `index`.
#[inline]
pub fn grid_angle(index: usize) -> f32 {
    index as f32 * GRID_STEP_DEGREES
}
