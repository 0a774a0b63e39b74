use crate::format::SampleFormat;
use crate::LOW_SPEED_BAUD;

/// Timing and amplitude thresholds for low-speed demodulation
///
/// Built once from the sample format and never mutated. All sample counts are
/// at least 1 so that degenerate sample rates still produce a usable (if
/// useless) detector instead of zero-width windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeConfig {
    pub baud_hz: u32,
    /// Samples per cell
    pub period: usize,
    /// Pulse detection width
    pub half_strobe: usize,
    pub max_peak_spacing: usize,
    /// Samples inspected per alignment attempt, just long enough for a
    /// pair of peaks one sample past `max_peak_spacing` to be seen
    pub window: usize,
    pub amplitude_delta: i32,
    pub neutral_level: i32,
    pub max_level: i32,
    /// Coarse "possible pulse" level used while hunting for sync
    pub pulse_threshold: i32,
    /// Only the downward excursion must clear `amplitude_delta`
    pub low_mode: bool,
}

impl DecodeConfig {
    pub fn new(format: &SampleFormat, low_mode: bool) -> Self {
        Self::with_baud_rate(format, LOW_SPEED_BAUD, low_mode)
    }

    pub fn with_baud_rate(format: &SampleFormat, baud_hz: u32, low_mode: bool) -> Self {
        let baud_hz = baud_hz.max(1);
        let period = ((format.sample_rate / baud_hz) as usize).max(1);
        let half_strobe = (period / 8).max(1);
        let max_peak_spacing = half_strobe * 3;
        let headroom = format.headroom();

        Self {
            baud_hz,
            period,
            half_strobe,
            max_peak_spacing,
            window: max_peak_spacing + 2,
            amplitude_delta: (headroom / 8).max(1),
            neutral_level: format.neutral_level,
            max_level: format.max_level,
            pulse_threshold: format.neutral_level + headroom / 4,
            low_mode,
        }
    }

    /// Length of one encoded bit: sync cell plus data cell
    pub fn cell_pair(&self) -> usize {
        self.period * 2
    }
}
