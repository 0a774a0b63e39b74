mod wav;

use castape_core::{
    CasTapeError, DecodeConfig, Decoder, FskDemodulator, FskModulator, PulseEncoder, SampleSource,
    LOW_SPEED_BAUD,
};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "castape")]
#[command(about = "Convert CAS cassette images to and from tape audio")]
struct Cli {
    /// Trace every decoded byte
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Dump every inspected sample window
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Demodulate a WAV recording into a CAS image
    Demodulate {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Output CAS file (default: input with a .cas extension)
        #[arg(value_name = "OUTPUT.CAS")]
        output: Option<PathBuf>,

        /// Only require the downward pulse swing to clear the amplitude threshold
        #[arg(short, long)]
        low_mode: bool,

        /// Low-speed cell rate
        #[arg(long, default_value_t = LOW_SPEED_BAUD)]
        baud: u32,

        /// Recording uses the high-speed FSK scheme
        #[arg(long)]
        high_speed: bool,
    },

    /// Modulate a CAS image into a WAV recording
    Modulate {
        /// Input CAS file
        #[arg(value_name = "INPUT.CAS")]
        input: PathBuf,

        /// Output WAV file (default: input with a .wav extension)
        #[arg(value_name = "OUTPUT.WAV")]
        output: Option<PathBuf>,

        /// Use the low-speed pulse-position scheme instead of FSK
        #[arg(long)]
        low_speed: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    match cli.command {
        Commands::Demodulate {
            input,
            output,
            low_mode,
            baud,
            high_speed,
        } => {
            let output = output.unwrap_or_else(|| default_output(&input, "cas"));
            demodulate_command(&input, &output, low_mode, baud, high_speed)?
        }
        Commands::Modulate {
            input,
            output,
            low_speed,
        } => {
            let output = output.unwrap_or_else(|| default_output(&input, "wav"));
            modulate_command(&input, &output, low_speed)?
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, debug: bool) {
    let level = if debug {
        LevelFilter::Trace
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Swap the extension, never landing on the input path itself
fn default_output(input: &Path, extension: &str) -> PathBuf {
    let output = input.with_extension(extension);
    if output == input {
        PathBuf::from(format!("{}.{}", input.display(), extension))
    } else {
        output
    }
}

fn demodulate_command(
    input_path: &Path,
    output_path: &Path,
    low_mode: bool,
    baud: u32,
    high_speed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut source = wav::read_wav(input_path)?;
    let format = *source.format();
    println!(
        "Read WAV: {} Hz, {} bits, {} samples",
        format.sample_rate,
        format.bits_per_sample,
        source.len()
    );

    let data = if high_speed {
        FskDemodulator::new(format).demodulate_source(&mut source)?
    } else {
        let config = DecodeConfig::with_baud_rate(&format, baud, low_mode);
        log::debug!("decode config: {:?}", config);

        match Decoder::new(config).decode_report(&mut source) {
            Ok((data, report)) => {
                println!("Sync pulse found at sample {}", report.sync_index);
                if report.free_run_cells > 0 {
                    log::info!("{} cells decoded without a sync strobe", report.free_run_cells);
                }
                data
            }
            Err(CasTapeError::SyncNotFound) => {
                println!("No sync pulse found in {}", input_path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        }
    };

    println!("Decoded {} bytes", data.len());
    std::fs::write(output_path, &data)?;
    println!("Wrote {} bytes to {}", data.len(), output_path.display());

    Ok(())
}

fn modulate_command(
    input_path: &Path,
    output_path: &Path,
    low_speed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input_path)?;
    println!("Read {} bytes from {}", data.len(), input_path.display());

    let (format, samples) = if low_speed {
        let encoder = PulseEncoder::new();
        (*encoder.format(), encoder.encode(&data))
    } else {
        let modulator = FskModulator::new();
        (*modulator.format(), modulator.modulate(&data))
    };
    println!("Encoded to {} audio samples", samples.len());

    wav::write_wav(output_path, &format, &samples)?;
    println!("Wrote {}", output_path.display());

    Ok(())
}
