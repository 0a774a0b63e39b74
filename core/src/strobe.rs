//! Strobe alignment
//!
//! A strobe is a short pulse that swings above and then below the neutral
//! level. Given an approximate sample index, [`align`] inspects a small window
//! and either reports the absolute index of the pulse maximum (the rising edge
//! used as the timing reference for the next cell) or explains why the window
//! does not hold a usable pulse.

use crate::config::DecodeConfig;
use crate::error::{PulseRejection, Result};
use crate::source::SampleSource;

/// Outcome of one alignment attempt that did not run out of samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Absolute sample index of the detected maximum
    Edge(usize),
    Rejected(PulseRejection),
}

impl Alignment {
    /// Demand an edge, turning a rejection into an error
    pub fn edge(self) -> Result<usize> {
        match self {
            Alignment::Edge(index) => Ok(index),
            Alignment::Rejected(rejection) => Err(rejection.into()),
        }
    }
}

/// Extremes of one sample window, first occurrence of each
#[derive(Debug, Clone, Copy)]
struct Peaks {
    max: i32,
    max_offset: usize,
    min: i32,
    min_offset: usize,
}

impl Peaks {
    fn scan(window: &[i32]) -> Self {
        let mut peaks = Peaks {
            max: i32::MIN,
            max_offset: 0,
            min: i32::MAX,
            min_offset: 0,
        };
        for (offset, &sample) in window.iter().enumerate() {
            if sample > peaks.max {
                peaks.max = sample;
                peaks.max_offset = offset;
            }
            if sample < peaks.min {
                peaks.min = sample;
                peaks.min_offset = offset;
            }
        }
        peaks
    }

    fn check(&self, config: &DecodeConfig) -> Option<PulseRejection> {
        let spacing = self.min_offset as isize - self.max_offset as isize;
        if spacing > config.max_peak_spacing as isize {
            return Some(PulseRejection::Geometry {
                spacing,
                limit: config.max_peak_spacing,
            });
        }

        let neutral = config.neutral_level as i64;
        let (min, max) = (self.min as i64, self.max as i64);
        let delta = config.amplitude_delta as i64;

        if min >= neutral || max <= neutral {
            return Some(PulseRejection::NoCrossing {
                min: self.min,
                max: self.max,
            });
        }

        // The downward swing is mandatory; low mode forgives a weak upward one
        let weak_low = min >= neutral - delta;
        let weak_high = !config.low_mode && max <= neutral + delta;
        if weak_low || weak_high {
            return Some(PulseRejection::Amplitude {
                min: self.min,
                max: self.max,
            });
        }

        None
    }
}

/// Test whether `index` sits on (or just before) a valid strobe
///
/// With `require_double_confirm`, a second strobe must also validate exactly
/// one cell pair later; a lone pulse is never trusted as sync.
///
/// Running out of samples is reported as `Err(EndOfStream)` and never folded
/// into a rejection.
pub fn align<S: SampleSource + ?Sized>(
    source: &mut S,
    config: &DecodeConfig,
    index: usize,
    require_double_confirm: bool,
) -> Result<Alignment> {
    let window = source.window(index, config.window)?;
    log::trace!("window @{}: {:?}", index, window);

    let peaks = Peaks::scan(window);
    if let Some(rejection) = peaks.check(config) {
        log::trace!("rejected @{}: {}", index, rejection);
        return Ok(Alignment::Rejected(rejection));
    }

    if require_double_confirm {
        let confirm_at = index + config.cell_pair();
        if let Alignment::Rejected(_) = align(source, config, confirm_at, false)? {
            return Ok(Alignment::Rejected(PulseRejection::Unconfirmed { at: confirm_at }));
        }
    }

    Ok(Alignment::Edge(index + peaks.max_offset))
}
