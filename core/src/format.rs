/// Amplitude layout of a PCM sample stream
///
/// 8-bit audio is unsigned (0..=255, neutral 127). 16 and 32-bit audio is
/// signed with neutral 0. Any other depth is read with the signed 32-bit level
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleFormat {
    pub bits_per_sample: u16,
    pub sample_rate: u32,
    pub neutral_level: i32,
    pub min_level: i32,
    pub max_level: i32,
}

impl SampleFormat {
    pub fn new(bits_per_sample: u16, sample_rate: u32) -> Self {
        let (min_level, max_level) = match bits_per_sample {
            8 => (u8::MIN as i32, u8::MAX as i32),
            16 => (i16::MIN as i32, i16::MAX as i32),
            32 => (i32::MIN, i32::MAX),
            other => {
                log::warn!("{}-bit samples read as signed 32-bit levels", other);
                (i32::MIN, i32::MAX)
            }
        };

        // Midpoint, computed wide so the 32-bit range cannot overflow
        let neutral_level = ((min_level as i64 + max_level as i64) / 2) as i32;

        Self {
            bits_per_sample,
            sample_rate,
            neutral_level,
            min_level,
            max_level,
        }
    }

    /// 8-bit unsigned at the given rate
    pub fn unsigned_8bit(sample_rate: u32) -> Self {
        Self::new(8, sample_rate)
    }

    /// Distance from neutral to the top of the range
    pub fn headroom(&self) -> i32 {
        self.max_level - self.neutral_level
    }

    /// Clamp a level computed in a wider type back into this format's range
    pub fn clamp(&self, level: i64) -> i32 {
        level.clamp(self.min_level as i64, self.max_level as i64) as i32
    }
}
