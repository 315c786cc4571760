//! Error types for near-field filter evaluation.

use thiserror::Error;

/// Errors returned when an input lies outside the model's domain.
///
/// Every component rejects out-of-range input with one of these; nothing is
/// clamped silently.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NearFieldError {
    /// Angle from the ear axis outside [0, 180] degrees (or not finite).
    #[error("angle out of range: {0} degrees (expected 0..=180)")]
    AngleOutOfRange(f32),

    /// Grid row index past the end of the regression table.
    #[error("grid index out of range: {0} (expected 0..=18)")]
    GridIndexOutOfRange(usize),

    /// Distance below the head surface or the near-field limit (or not finite).
    #[error("distance out of range: {0}")]
    DistanceOutOfRange(f32),

    /// Sample rate that is not a positive finite number.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    /// Shelf gain that is NaN or infinite.
    #[error("non-finite shelf gain: g0 = {g0} dB, g_inf = {g_inf} dB")]
    NonFiniteGain {
        /// DC gain in dB.
        g0: f32,
        /// High-frequency gain in dB.
        g_inf: f32,
    },

    /// Corner frequency not strictly between 0 Hz and Nyquist.
    #[error("corner frequency {fc} Hz out of range (Nyquist is {nyquist} Hz)")]
    CornerFrequencyOutOfRange {
        /// Requested corner frequency in Hz.
        fc: f32,
        /// Nyquist frequency of the target sample rate in Hz.
        nyquist: f32,
    },

    /// Head model configuration that cannot produce a valid filter.
    #[error("invalid head model: {0}")]
    InvalidHeadModel(&'static str),
}

/// Result alias for near-field operations.
pub type NearFieldResult<T> = Result<T, NearFieldError>;
