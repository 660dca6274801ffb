use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Read a WAV file into interleaved f32 samples, normalizing integer formats
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<(WavSpec, Vec<f32>), hound::Error> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = 2_i32.pow(spec.bits_per_sample as u32 - 1) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok((spec, samples))
}

/// Write interleaved f32 samples to a WAV file
///
/// Integer specs are rescaled and clamped back to the integer range, so a
/// file loaded with [`load_wav`] round-trips through the same spec.
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    spec: WavSpec,
) -> Result<(), hound::Error> {
    let mut writer = WavWriter::create(path, spec)?;

    match spec.sample_format {
        SampleFormat::Float => {
            for &sample in samples {
                writer.write_sample(sample)?;
            }
        }
        SampleFormat::Int => {
            let max_val = 2_i32.pow(spec.bits_per_sample as u32 - 1) as f32;
            for &sample in samples {
                let scaled = (sample * max_val).clamp(-max_val, max_val - 1.0);
                writer.write_sample(scaled as i32)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
