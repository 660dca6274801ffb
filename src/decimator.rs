use crate::error::{DecimError, Result};
use crate::firdes::FilterSpec;

/// Streaming FIR decimator
///
/// Consumes fixed-size blocks of samples, convolves them with the designed
/// anti-aliasing filter, and keeps one sample in every `decimation_factor`.
/// Filter history and decimation phase carry across calls, so feeding a
/// stream block by block produces output bit-identical to one giant call
/// with the whole stream.
///
/// One instance serves exactly one stream. `execute` takes `&mut self`, so
/// concurrent mutation from two threads is unrepresentable without external
/// synchronization; parallel streams get one instance each (the
/// [`FilterSpec`] may be cloned or shared read-only between them).
pub struct Decimator {
    spec: FilterSpec,
    /// Last `tap_count - 1` input samples of the previous block
    history: Vec<f32>,
    /// Scratch buffer for `history ++ input`, pre-sized for `block_size`
    work: Vec<f32>,
    block_size: usize,
    /// Position within the decimation cycle, `0..factor`
    phase: usize,
    closed: bool,
}

impl Decimator {
    /// Create a decimator for one stream
    ///
    /// `block_size` is the largest input block `execute` will accept;
    /// shorter (e.g. trailing) blocks are fine. History starts zero-filled,
    /// so the first outputs include the filter's cold-start transient.
    pub fn new(spec: FilterSpec, block_size: usize) -> Self {
        let history_len = spec.tap_count().saturating_sub(1);
        Self {
            history: vec![0.0; history_len],
            work: Vec::with_capacity(block_size + history_len),
            spec,
            block_size,
            phase: 0,
            closed: false,
        }
    }

    /// Number of filter taps (0 in no-filter mode)
    pub fn tap_count(&self) -> usize {
        self.spec.tap_count()
    }

    /// Decimation factor
    pub fn decimation_factor(&self) -> usize {
        self.spec.decimation_factor()
    }

    /// Decimate one block of samples
    ///
    /// Writes the produced samples to the front of `output` and returns how
    /// many there are. The count varies by at most one around
    /// `input.len() / factor` depending on the current phase, so callers
    /// must use the returned count rather than assume an exact share.
    ///
    /// # Errors
    /// * `UseAfterClose` — the instance was closed.
    /// * `InvalidParameter` — `input` is longer than the `block_size` this
    ///   instance was sized for.
    /// * `BufferTooSmall` — `output` cannot hold the samples this block
    ///   produces. History and phase are left untouched, so the call can be
    ///   retried with a larger buffer.
    pub fn execute(&mut self, input: &[f32], output: &mut [f32]) -> Result<usize> {
        if self.closed {
            return Err(DecimError::UseAfterClose);
        }
        if input.len() > self.block_size {
            return Err(DecimError::InvalidParameter(format!(
                "input block of {} samples exceeds block size {}",
                input.len(),
                self.block_size
            )));
        }

        let factor = self.spec.decimation_factor();
        let n = input.len();

        // First input position on the decimation cycle, given the phase
        // carried over from the previous block.
        let first = (factor - self.phase % factor) % factor;
        let produced = if first >= n {
            0
        } else {
            (n - first).div_ceil(factor)
        };

        // Capacity check precedes all state mutation.
        if output.len() < produced {
            return Err(DecimError::BufferTooSmall {
                needed: produced,
                capacity: output.len(),
            });
        }

        let taps = self.spec.coefficients();
        let tap_count = taps.len();

        if tap_count == 0 {
            // No-filter mode: strided copy, no history.
            let mut m = 0;
            let mut p = first;
            while p < n {
                output[m] = input[p];
                m += 1;
                p += factor;
            }
        } else {
            self.work.clear();
            self.work.extend_from_slice(&self.history);
            self.work.extend_from_slice(input);

            let mut m = 0;
            let mut p = first;
            while p < n {
                // Inner product over the tap_count working samples whose
                // newest element is input[p].
                let newest = p + tap_count - 1;
                let mut acc = 0.0f64;
                for (k, &tap) in taps.iter().enumerate() {
                    acc += tap * self.work[newest - k] as f64;
                }
                output[m] = acc as f32;
                m += 1;
                p += factor;
            }
            debug_assert_eq!(m, produced);

            let tail_start = self.work.len() - self.history.len();
            self.history.copy_from_slice(&self.work[tail_start..]);
        }

        self.phase = (self.phase + n) % factor;
        Ok(produced)
    }

    /// Release owned buffers and retire the instance
    ///
    /// Any later `execute` call fails with `UseAfterClose`.
    pub fn close(&mut self) {
        self.history = Vec::new();
        self.work = Vec::new();
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firdes::{DesignParam, design};

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32).collect()
    }

    #[test]
    fn test_no_filter_passthrough() {
        let spec = design(48000, 3, DesignParam::NoFilter).unwrap();
        let mut dec = Decimator::new(spec, 16);

        let input = ramp(12);
        let mut output = vec![0.0; 16];
        let count = dec.execute(&input, &mut output).unwrap();

        assert_eq!(count, 4);
        assert_eq!(&output[..count], &[0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn test_no_filter_phase_continuity() {
        let spec = design(48000, 3, DesignParam::NoFilter).unwrap();
        let mut dec = Decimator::new(spec, 16);
        let mut output = vec![0.0; 16];

        // Blocks of 4 against factor 3: the cycle straddles every boundary.
        let count = dec.execute(&[0.0, 1.0, 2.0, 3.0], &mut output).unwrap();
        assert_eq!(&output[..count], &[0.0, 3.0]);

        let count = dec.execute(&[4.0, 5.0, 6.0, 7.0], &mut output).unwrap();
        assert_eq!(&output[..count], &[6.0]);

        let count = dec.execute(&[8.0, 9.0, 10.0, 11.0], &mut output).unwrap();
        assert_eq!(&output[..count], &[9.0]);
    }

    #[test]
    fn test_short_block_produces_nothing_off_phase() {
        let spec = design(48000, 4, DesignParam::NoFilter).unwrap();
        let mut dec = Decimator::new(spec, 8);
        let mut output = vec![0.0; 8];

        // First call consumes the cycle position 0.
        let count = dec.execute(&[1.0], &mut output).unwrap();
        assert_eq!(count, 1);

        // Next three single-sample calls fall between cycle positions.
        for v in [2.0, 3.0, 4.0] {
            let count = dec.execute(&[v], &mut output).unwrap();
            assert_eq!(count, 0);
        }

        let count = dec.execute(&[5.0], &mut output).unwrap();
        assert_eq!(count, 1);
        assert_eq!(output[0], 5.0);
    }

    #[test]
    fn test_buffer_too_small_leaves_state_untouched() {
        let spec = design(48000, 3, DesignParam::ByTapCount(15)).unwrap();
        let mut reference = Decimator::new(spec.clone(), 32);
        let mut dec = Decimator::new(spec, 32);

        let input: Vec<f32> = (0..30).map(|i| (i as f32 * 0.7).sin()).collect();

        let mut small = vec![0.0; 3];
        let err = dec.execute(&input, &mut small).unwrap_err();
        assert!(matches!(
            err,
            DecimError::BufferTooSmall {
                needed: 10,
                capacity: 3
            }
        ));

        // Retry with adequate capacity must match a fresh single-shot run.
        let mut out_retry = vec![0.0; 32];
        let mut out_fresh = vec![0.0; 32];
        let count_retry = dec.execute(&input, &mut out_retry).unwrap();
        let count_fresh = reference.execute(&input, &mut out_fresh).unwrap();

        assert_eq!(count_retry, count_fresh);
        assert_eq!(&out_retry[..count_retry], &out_fresh[..count_fresh]);
    }

    #[test]
    fn test_oversized_input_rejected() {
        let spec = design(48000, 2, DesignParam::ByTapCount(7)).unwrap();
        let mut dec = Decimator::new(spec, 8);

        let input = ramp(9);
        let mut output = vec![0.0; 8];
        assert!(matches!(
            dec.execute(&input, &mut output),
            Err(DecimError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_use_after_close() {
        let spec = design(48000, 2, DesignParam::ByTapCount(7)).unwrap();
        let mut dec = Decimator::new(spec, 8);
        dec.close();

        let mut output = vec![0.0; 8];
        assert!(matches!(
            dec.execute(&[1.0, 2.0], &mut output),
            Err(DecimError::UseAfterClose)
        ));
    }

    #[test]
    fn test_tap_count_accessor() {
        let spec = design(48000, 3, DesignParam::ByTapCount(31)).unwrap();
        let dec = Decimator::new(spec, 256);
        assert_eq!(dec.tap_count(), 31);
        assert_eq!(dec.decimation_factor(), 3);
    }

    #[test]
    fn test_empty_input_is_a_no_op() {
        let spec = design(48000, 3, DesignParam::ByTapCount(15)).unwrap();
        let mut dec = Decimator::new(spec, 16);

        let mut output = vec![0.0; 16];
        assert_eq!(dec.execute(&[], &mut output).unwrap(), 0);

        // State unchanged: the next real block behaves like the first.
        let input = ramp(9);
        let count = dec.execute(&input, &mut output).unwrap();
        assert_eq!(count, 3);
    }
}
