use std::f64::consts::PI;

use crate::constants::{HAMMING_LENGTH_FACTOR, MAX_TAP_COUNT, TRANSITION_WIDTH_PARAM_MIN};
use crate::error::{DecimError, Result};

/// Anti-aliasing filter specification produced by [`design`]
///
/// Immutable after design. Coefficients are a symmetric (linear-phase)
/// windowed-sinc low-pass with unity DC gain, cut off at the post-decimation
/// Nyquist frequency. An empty coefficient vector is the explicit "no filter"
/// mode: the decimator then drops samples without any smoothing.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    decimation_factor: usize,
    coefficients: Vec<f64>,
}

impl FilterSpec {
    /// Decimation factor (output rate = input rate / factor)
    pub fn decimation_factor(&self) -> usize {
        self.decimation_factor
    }

    /// Number of filter taps (0 in no-filter mode)
    pub fn tap_count(&self) -> usize {
        self.coefficients.len()
    }

    /// Tap coefficients, newest-first convolution order
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

/// How the anti-aliasing filter length is chosen
///
/// Models the driver's single integer parameter as a tagged value:
/// `0` means no filter, small values are a tap count, large values are a
/// transition bandwidth in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DesignParam {
    /// Bare downsampling, no anti-aliasing. Aliasing is the caller's choice.
    NoFilter,
    /// Explicit filter length
    ByTapCount(usize),
    /// Transition bandwidth target in Hz; the tap count is derived from it
    ByTransitionWidth(f64),
}

impl DesignParam {
    /// Interpret the driver's raw integer parameter
    ///
    /// `0` selects no filter, `1..=999` is a tap count, `1000` and above is
    /// a transition bandwidth in Hz.
    pub fn from_raw(param: u32) -> Self {
        if param == 0 {
            Self::NoFilter
        } else if param < TRANSITION_WIDTH_PARAM_MIN {
            Self::ByTapCount(param as usize)
        } else {
            Self::ByTransitionWidth(param as f64)
        }
    }
}

/// Design an anti-aliasing low-pass filter for integer decimation
///
/// The cutoff is placed at `sample_rate / (2 * decimation_factor)`, the
/// Nyquist frequency of the decimated stream. The design is a Hamming-window
/// sinc with the DC gain normalized to 1.0, so in-band amplitudes survive
/// decimation unchanged.
///
/// # Errors
/// * `InvalidParameter` — `sample_rate == 0`, `decimation_factor < 1`, or an
///   explicit tap count of zero (use `DesignParam::NoFilter` for that).
/// * `Design` — the cutoff would sit at or above the input Nyquist
///   (`decimation_factor < 2` with a filter requested), or the derived tap
///   count exceeds [`MAX_TAP_COUNT`].
pub fn design(
    sample_rate: u32,
    decimation_factor: usize,
    param: DesignParam,
) -> Result<FilterSpec> {
    if sample_rate == 0 {
        return Err(DecimError::InvalidParameter(
            "sample rate must be positive".to_string(),
        ));
    }
    if decimation_factor == 0 {
        return Err(DecimError::InvalidParameter(
            "decimation factor must be at least 1".to_string(),
        ));
    }

    let tap_count = match param {
        DesignParam::NoFilter => {
            return Ok(FilterSpec {
                decimation_factor,
                coefficients: Vec::new(),
            });
        }
        DesignParam::ByTapCount(0) => {
            return Err(DecimError::InvalidParameter(
                "explicit tap count must be positive".to_string(),
            ));
        }
        DesignParam::ByTapCount(n) => n,
        DesignParam::ByTransitionWidth(hz) => {
            if hz <= 0.0 {
                return Err(DecimError::InvalidParameter(format!(
                    "transition width must be positive, got {} Hz",
                    hz
                )));
            }
            estimate_tap_count(sample_rate, hz)
        }
    };

    // Cutoff in cycles/sample; a filtered design needs it strictly below the
    // input Nyquist (0.5), which rules out factor 1.
    let cutoff = 0.5 / decimation_factor as f64;
    if cutoff >= 0.5 {
        return Err(DecimError::Design(format!(
            "cutoff at or above input Nyquist (decimation factor {}); \
             use DesignParam::NoFilter for factor-1 passthrough",
            decimation_factor
        )));
    }
    if tap_count > MAX_TAP_COUNT {
        return Err(DecimError::Design(format!(
            "derived tap count {} exceeds maximum {}",
            tap_count, MAX_TAP_COUNT
        )));
    }

    let coefficients = windowed_sinc_lowpass(tap_count, cutoff);

    log::debug!(
        "designed decimation filter: factor={}, taps={}, cutoff={:.1} Hz",
        decimation_factor,
        tap_count,
        cutoff * sample_rate as f64
    );

    Ok(FilterSpec {
        decimation_factor,
        coefficients,
    })
}

/// Hamming-window FIR length estimate, rounded up to the nearest odd count
/// for a Type I linear-phase design.
fn estimate_tap_count(sample_rate: u32, transition_width_hz: f64) -> usize {
    let n = (HAMMING_LENGTH_FACTOR * sample_rate as f64 / transition_width_hz).ceil() as usize;
    let n = n.max(3);
    if n.is_multiple_of(2) { n + 1 } else { n }
}

/// Hamming-windowed sinc low-pass with unity DC gain
///
/// The second half is mirrored from the first so the symmetry invariant
/// `coeff[i] == coeff[n-1-i]` holds bit-exactly.
fn windowed_sinc_lowpass(tap_count: usize, cutoff: f64) -> Vec<f64> {
    let center = (tap_count - 1) as f64 / 2.0;
    let omega_c = 2.0 * PI * cutoff;

    let mut taps = vec![0.0f64; tap_count];
    for n in 0..tap_count.div_ceil(2) {
        let x = n as f64 - center;
        let sinc = if x == 0.0 {
            2.0 * cutoff
        } else {
            (omega_c * x).sin() / (PI * x)
        };
        let tap = sinc * hamming(n, tap_count);
        taps[n] = tap;
        taps[tap_count - 1 - n] = tap;
    }

    // Normalize to unity DC gain; scaling both mirrored halves by the same
    // value preserves exact symmetry.
    let dc_gain: f64 = taps.iter().sum();
    for tap in taps.iter_mut() {
        *tap /= dc_gain;
    }

    taps
}

fn hamming(n: usize, tap_count: usize) -> f64 {
    if tap_count == 1 {
        return 1.0;
    }
    0.54 - 0.46 * (2.0 * PI * n as f64 / (tap_count - 1) as f64).cos()
}
