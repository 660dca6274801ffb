use std::path::PathBuf;

use clap::Parser;

use firdecim::{Decimator, DesignParam, design, load_wav, save_wav};

#[derive(Parser, Debug)]
#[command(name = "firdecim")]
#[command(about = "Decimate a WAV file with a streaming anti-aliasing FIR filter", long_about = None)]
struct Args {
    /// Input WAV file
    input: PathBuf,

    /// Decimation factor (output rate = input rate / factor)
    decimation_factor: usize,

    /// Filter parameter: 0 = no filter, <1000 = tap count,
    /// >=1000 = transition bandwidth in Hz
    param: u32,

    /// Output WAV file
    output: PathBuf,

    /// Samples per processing block (per channel)
    #[arg(long, default_value = "256")]
    block_size: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let (spec, samples) = load_wav(&args.input)?;
    let channels = spec.channels as usize;
    let samples_per_channel = samples.len() / channels;

    let filter = design(
        spec.sample_rate,
        args.decimation_factor,
        DesignParam::from_raw(args.param),
    )?;

    println!("Decimation Factor = {}", args.decimation_factor);
    println!("Filter Block size = {}", args.block_size);
    println!("Filter tap number = {}", filter.tap_count());
    println!("Sampling rate = {}(Hz)", spec.sample_rate);
    println!("Sampling length = {}\n", samples_per_channel);

    let out_rate = spec.sample_rate / args.decimation_factor as u32;
    println!("Output Sampling rate = {}", out_rate);
    println!(
        "Output Sampling length = {}",
        samples_per_channel / args.decimation_factor
    );
    println!("Saving filename : {}", args.output.display());

    // Each channel is an independent stream with its own filter state.
    let mut decimators: Vec<Decimator> = (0..channels)
        .map(|_| Decimator::new(filter.clone(), args.block_size))
        .collect();

    let mut channel_outputs: Vec<Vec<f32>> = vec![Vec::new(); channels];
    let mut block = vec![0.0f32; args.block_size];
    let mut out_block = vec![0.0f32; args.block_size];

    for (ch, (decimator, produced)) in decimators
        .iter_mut()
        .zip(channel_outputs.iter_mut())
        .enumerate()
    {
        let mut position = 0;
        while position < samples_per_channel {
            let len = args.block_size.min(samples_per_channel - position);
            for (i, sample) in block[..len].iter_mut().enumerate() {
                *sample = samples[(position + i) * channels + ch];
            }

            let count = decimator.execute(&block[..len], &mut out_block)?;
            produced.extend_from_slice(&out_block[..count]);

            position += len;
        }
        decimator.close();
    }

    let out_len = channel_outputs[0].len();
    let mut interleaved = Vec::with_capacity(out_len * channels);
    for i in 0..out_len {
        for channel in &channel_outputs {
            interleaved.push(channel[i]);
        }
    }

    let out_spec = hound::WavSpec {
        sample_rate: out_rate,
        ..spec
    };
    save_wav(&args.output, &interleaved, out_spec)?;

    println!("Actual decimated data length = {}", out_len);
    println!("Done");

    Ok(())
}
