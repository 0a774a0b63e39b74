//! Cassette audio codec for CAS tape images
//!
//! Converts raw CAS bytes to and from PCM audio. The low-speed scheme is
//! pulse-position modulated (a sync strobe per bit, plus a data strobe for a
//! `1`) and is demodulated by tracking strobes directly in the sampled
//! waveform. The high-speed scheme is one square wave per bit at one of two
//! frequencies.

pub mod bits;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod fsk;
pub mod source;
pub mod strobe;
pub mod sync;

pub use config::DecodeConfig;
pub use decoder::{BitstreamAssembler, DecodeReport, Decoder};
pub use encoder::PulseEncoder;
pub use error::{CasTapeError, PulseRejection, Result};
pub use format::SampleFormat;
pub use fsk::{FskDemodulator, FskModulator};
pub use source::{SampleBuffer, SampleSource};
pub use strobe::{align, Alignment};
pub use sync::find_first_sync;

/// Output sample rate for generated audio
pub const SAMPLE_RATE: u32 = 44100;

/// Cell rate of the low-speed pulse-position scheme
pub const LOW_SPEED_BAUD: u32 = 1000;

// High-speed FSK tones
pub const FSK_ONE_HZ: f64 = 2680.0;
pub const FSK_ZERO_HZ: f64 = 1320.0;
