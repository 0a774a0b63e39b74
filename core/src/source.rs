use crate::error::{CasTapeError, Result};
use crate::format::SampleFormat;

/// Random-access view of a decoded mono sample stream
///
/// Demodulation seeks to arbitrary absolute offsets, so implementations must
/// support cheap reads anywhere in the stream. A read that would run past the
/// last sample fails with [`CasTapeError::EndOfStream`].
pub trait SampleSource {
    fn format(&self) -> &SampleFormat;

    /// Total number of frames
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow `len` samples starting at absolute index `start`
    fn window(&mut self, start: usize, len: usize) -> Result<&[i32]>;
}

/// Whole stream held in memory
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    format: SampleFormat,
    samples: Vec<i32>,
}

impl SampleBuffer {
    pub fn new(format: SampleFormat, samples: Vec<i32>) -> Self {
        Self { format, samples }
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }
}

impl SampleSource for SampleBuffer {
    fn format(&self) -> &SampleFormat {
        &self.format
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn window(&mut self, start: usize, len: usize) -> Result<&[i32]> {
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.samples.len())
            .ok_or(CasTapeError::EndOfStream {
                index: start,
                len: self.samples.len(),
            })?;
        Ok(&self.samples[start..end])
    }
}
