use crate::bits::bits_msb_first;
use crate::config::DecodeConfig;
use crate::format::SampleFormat;
use crate::{LOW_SPEED_BAUD, SAMPLE_RATE};

/// Silent cell pairs ahead of the first sync pulse
const LEADER_CELLS: usize = 4;

/// Silent cell pairs after the last bit, enough for the decoder to classify it
const TRAILER_CELLS: usize = 2;

/// Low-speed pulse-position modulator
///
/// Every bit is a cell pair. A sync pulse opens the pair and a `1` adds a data
/// pulse one period later. A pulse is `half_strobe` samples at +3/4 of the
/// range followed by `half_strobe` samples at -3/4; everything else rests at
/// neutral.
pub struct PulseEncoder {
    format: SampleFormat,
    config: DecodeConfig,
}

impl PulseEncoder {
    /// 8-bit unsigned output at 44100 Hz, 1000 baud
    pub fn new() -> Self {
        Self::with_format(SampleFormat::unsigned_8bit(SAMPLE_RATE))
    }

    pub fn with_format(format: SampleFormat) -> Self {
        Self::with_baud_rate(format, LOW_SPEED_BAUD)
    }

    pub fn with_baud_rate(format: SampleFormat, baud_hz: u32) -> Self {
        Self {
            config: DecodeConfig::with_baud_rate(&format, baud_hz, false),
            format,
        }
    }

    pub fn format(&self) -> &SampleFormat {
        &self.format
    }

    /// Sample index of the first sync pulse in encoded output
    pub fn data_start(&self) -> usize {
        LEADER_CELLS * self.config.cell_pair()
    }

    pub fn encode(&self, data: &[u8]) -> Vec<i32> {
        let cell_pair = self.config.cell_pair();
        let cells = LEADER_CELLS + data.len() * 8 + TRAILER_CELLS;
        let mut samples = vec![self.format.neutral_level; cells * cell_pair];

        for (i, bit) in bits_msb_first(data).enumerate() {
            let sync_at = self.data_start() + i * cell_pair;
            self.put_pulse(&mut samples, sync_at);
            if bit {
                self.put_pulse(&mut samples, sync_at + self.config.period);
            }
        }

        samples
    }

    fn put_pulse(&self, samples: &mut [i32], at: usize) {
        let width = self.config.half_strobe;
        let swing = self.format.headroom() as i64 * 3 / 4;
        let neutral = self.format.neutral_level as i64;

        samples[at..at + width].fill(self.format.clamp(neutral + swing));
        samples[at + width..at + 2 * width].fill(self.format.clamp(neutral - swing));
    }
}

impl Default for PulseEncoder {
    fn default() -> Self {
        Self::new()
    }
}
