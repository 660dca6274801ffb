//! Numeric constants for filter design
//!
//! These constants pin down the driver's parameter dispatch rule and the
//! windowed-sinc design choices shared by the designer and its tests.

/// Raw parameter values below this threshold are interpreted as a tap count;
/// values at or above it are a transition bandwidth in Hz.
pub const TRANSITION_WIDTH_PARAM_MIN: u32 = 1000;

/// Hamming-window FIR length estimate: tap_count ~= 3.3 * fs / transition_width.
/// The Hamming window gives ~53 dB stopband attenuation, comfortably above
/// the 40 dB floor required of the anti-aliasing filter.
pub const HAMMING_LENGTH_FACTOR: f64 = 3.3;

/// Upper bound on the designed tap count. A derived count above this signals
/// an infeasible transition-width request rather than silently truncating.
pub const MAX_TAP_COUNT: usize = 1023;
