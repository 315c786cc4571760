//! Near-field distance filtering for binaural rendering.
//!
//! Sources closer than about a meter change the spectrum reaching each ear:
//! low frequencies are boosted on the near side and shadowed on the far side.
//! This crate models that change as a first-order high shelf per ear, using
//! the regression of Spagnol, Tavazzi and Avanzini (2017):
//!
//! 1. [`shelf_params`] evaluates the shelf gains and corner frequency at one
//!    of 19 grid angles for a normalized distance.
//! 2. [`interpolate_shelf_params`] extends that to any angle in [0, 180].
//! 3. [`shelf_coeffs`] turns the parameters into IIR coefficients.
//!
//! [`HeadModel`] configures the head, and [`NearFieldSource`] caches the
//! per-ear coefficients of a moving source.
//!
//! # Example
//!
//! ```
//! use rhizome_resin_nearfield::{HeadModel, dvf_coeffs};
//!
//! let head = HeadModel::default();
//! let rho = head.normalized_distance(0.3).unwrap();
//! let c = dvf_coeffs(45.0, rho, 48000.0).unwrap();
//! assert!(c.a1.abs() < 1.0);
//! ```

pub mod coeffs;
pub mod error;
pub mod geometry;
pub mod interp;
pub mod shelf;
pub mod source;

pub use coeffs::{EarCoeffs, ShelfCoeffs, dvf_coeffs, shelf_coeffs};
pub use error::{NearFieldError, NearFieldResult};
pub use geometry::{
    DEFAULT_HEAD_RADIUS, FAR_FIELD_RHO, HeadModel, REFERENCE_HEAD_RADIUS, ear_angles,
    ear_angles_from_direction,
};
pub use interp::interpolate_shelf_params;
pub use shelf::{
    GRID_LEN, GRID_STEP_DEGREES, MAX_ANGLE_DEGREES, ShelfParams, grid_angle, shelf_params,
};
pub use source::NearFieldSource;
