use crate::bits::{bits_msb_first, ByteAccumulator};
use crate::error::Result;
use crate::format::SampleFormat;
use crate::source::SampleSource;
use crate::{FSK_ONE_HZ, FSK_ZERO_HZ, SAMPLE_RATE};

// High-speed cassette encoding
//
// Every bit is one full square wave: high for the first half of the bit
// period, low for the second half. A `1` is a 2680 Hz cycle (~373us), a `0`
// a 1320 Hz cycle (~746us). The stream opens with one zero-bit-long preamble
// that holds neutral and then dips to half amplitude, so the first data bit
// always starts with a clean upward crossing.

/// Square-wave modulator for the high-speed scheme
pub struct FskModulator {
    format: SampleFormat,
}

impl FskModulator {
    /// 8-bit unsigned output at 44100 Hz
    pub fn new() -> Self {
        Self::with_format(SampleFormat::unsigned_8bit(SAMPLE_RATE))
    }

    pub fn with_format(format: SampleFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &SampleFormat {
        &self.format
    }

    fn bit_samples(&self, bit: bool) -> f64 {
        let freq = if bit { FSK_ONE_HZ } else { FSK_ZERO_HZ };
        self.format.sample_rate as f64 / freq
    }

    /// Encode CAS bytes into amplitude samples
    ///
    /// Bit boundaries follow an exact fractional clock rounded to the nearest
    /// sample, so the average frequency does not drift over long images.
    pub fn modulate(&self, data: &[u8]) -> Vec<i32> {
        let format = &self.format;
        let high = format.max_level;
        let low = format.min_level;
        let dip = format.neutral_level - format.headroom() / 2;

        let estimate = (data.len() * 8 + 1) as f64 * self.bit_samples(false);
        let mut samples = Vec::with_capacity(estimate.ceil() as usize + 1);
        let mut clock = 0.0f64;

        let preamble = self.bit_samples(false);
        square_cycle(&mut samples, &mut clock, preamble, format.neutral_level, dip);

        for bit in bits_msb_first(data) {
            square_cycle(&mut samples, &mut clock, self.bit_samples(bit), high, low);
        }

        samples
    }
}

impl Default for FskModulator {
    fn default() -> Self {
        Self::new()
    }
}

fn square_cycle(samples: &mut Vec<i32>, clock: &mut f64, duration: f64, first: i32, second: i32) {
    let middle = (*clock + duration / 2.0).round() as usize;
    *clock += duration;
    let end = clock.round() as usize;
    samples.resize(middle, first);
    samples.resize(end, second);
}

/// Half-wave timing demodulator for the high-speed scheme
///
/// A Schmitt trigger around neutral finds every high half-wave. Half-waves
/// shorter than the midpoint between the nominal `1` and `0` half periods are
/// `1` bits, longer ones are `0` bits.
pub struct FskDemodulator {
    format: SampleFormat,
    hysteresis: i32,
    threshold: f64,
}

impl FskDemodulator {
    pub fn new(format: SampleFormat) -> Self {
        let rate = format.sample_rate as f64;
        let one_half = rate / FSK_ONE_HZ / 2.0;
        let zero_half = rate / FSK_ZERO_HZ / 2.0;

        Self {
            hysteresis: (format.headroom() / 8).max(1),
            threshold: (one_half + zero_half) / 2.0,
            format,
        }
    }

    /// Half-wave length (in samples) separating `1` from `0`
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn demodulate(&self, samples: &[i32]) -> Vec<u8> {
        let upper = self.format.neutral_level as i64 + self.hysteresis as i64;
        let lower = self.format.neutral_level as i64 - self.hysteresis as i64;

        let mut output = Vec::with_capacity(samples.len() / (self.threshold.max(1.0) as usize * 16) + 1);
        let mut accumulator = ByteAccumulator::new();
        let mut is_high = false;
        let mut high_start = None;

        for (index, &sample) in samples.iter().enumerate() {
            let level = sample as i64;
            if !is_high && level > upper {
                is_high = true;
                high_start = Some(index);
            } else if is_high && level < lower {
                is_high = false;
                if let Some(start) = high_start.take() {
                    let width = (index - start) as f64;
                    if let Some(byte) = accumulator.push(width < self.threshold) {
                        log::debug!("byte {:5}: 0x{:02X} @{}", output.len(), byte, start);
                        output.push(byte);
                    }
                }
            }
        }

        if accumulator.pending_bits() > 0 {
            log::debug!("discarding {} trailing bits", accumulator.pending_bits());
        }

        output
    }

    pub fn demodulate_source<S: SampleSource + ?Sized>(&self, source: &mut S) -> Result<Vec<u8>> {
        let len = source.len();
        let samples = source.window(0, len)?;
        Ok(self.demodulate(samples))
    }
}
