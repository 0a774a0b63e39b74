use crate::bits::ByteAccumulator;
use crate::config::DecodeConfig;
use crate::error::{CasTapeError, Result};
use crate::format::SampleFormat;
use crate::source::SampleSource;
use crate::strobe::{align, Alignment};
use crate::sync::find_first_sync;

/// Statistics from one low-speed decode run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Sample index of the confirmed sync pulse
    pub sync_index: usize,
    pub bits_decoded: usize,
    /// Bits left over when the stream ended (never emitted)
    pub dropped_bits: u8,
    /// Cells whose next sync strobe was not found and were stepped blindly
    pub free_run_cells: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellState {
    /// Reference strobe for the current cell
    Synced(usize),
    Terminated,
}

/// Per-cell decode loop for the low-speed pulse-position scheme
///
/// Each bit occupies a cell pair: a sync strobe at the cell reference and, for
/// a `1`, a second strobe one period later. After classifying a cell, the
/// reference is re-aligned on the next actual sync strobe so slow tape speed
/// drift is absorbed one cell at a time.
pub struct BitstreamAssembler<'a> {
    config: &'a DecodeConfig,
}

impl<'a> BitstreamAssembler<'a> {
    pub fn new(config: &'a DecodeConfig) -> Self {
        Self { config }
    }

    pub fn decode<S: SampleSource + ?Sized>(&self, source: &mut S, first_sync: usize) -> Result<Vec<u8>> {
        self.decode_with_report(source, first_sync).map(|(bytes, _)| bytes)
    }

    /// Decode from `first_sync` until the samples run out
    ///
    /// A cell that fails alignment for any reason other than end-of-stream
    /// counts as a `0` bit. Only end-of-stream stops the loop, and incomplete
    /// trailing bytes are discarded.
    pub fn decode_with_report<S: SampleSource + ?Sized>(
        &self,
        source: &mut S,
        first_sync: usize,
    ) -> Result<(Vec<u8>, DecodeReport)> {
        let byte_samples = self.config.cell_pair() * 8;
        let mut output = Vec::with_capacity(source.len() / byte_samples + 1);
        let mut accumulator = ByteAccumulator::new();
        let mut report = DecodeReport {
            sync_index: first_sync,
            ..DecodeReport::default()
        };

        let mut state = CellState::Synced(first_sync);
        while let CellState::Synced(cbi) = state {
            state = self.step(source, cbi, &mut accumulator, &mut output, &mut report)?;
        }

        report.dropped_bits = accumulator.pending_bits();
        if report.dropped_bits > 0 {
            log::debug!("discarding {} trailing bits", report.dropped_bits);
        }

        Ok((output, report))
    }

    fn step<S: SampleSource + ?Sized>(
        &self,
        source: &mut S,
        cbi: usize,
        accumulator: &mut ByteAccumulator,
        output: &mut Vec<u8>,
        report: &mut DecodeReport,
    ) -> Result<CellState> {
        let config = self.config;
        let lead_in = config.half_strobe / 2;

        let one_at = cbi + config.period - lead_in;
        let bit = match try_align(source, config, one_at)? {
            Some(Alignment::Edge(_)) => true,
            Some(Alignment::Rejected(rejection)) => {
                log::debug!("cell @{}: no data strobe at {} ({}), bit 0", cbi, one_at, rejection);
                false
            }
            None => return Ok(CellState::Terminated),
        };

        report.bits_decoded += 1;
        if let Some(byte) = accumulator.push(bit) {
            log::debug!("byte {:5}: 0x{:02X} @{}", output.len(), byte, cbi);
            output.push(byte);
        }

        let next_at = cbi + config.cell_pair() - lead_in;
        match try_align(source, config, next_at)? {
            Some(Alignment::Edge(edge)) => Ok(CellState::Synced(edge)),
            Some(Alignment::Rejected(rejection)) => {
                log::debug!("cell @{}: next sync strobe missing ({}), free-running", cbi, rejection);
                report.free_run_cells += 1;
                Ok(CellState::Synced(cbi + config.cell_pair()))
            }
            None => Ok(CellState::Terminated),
        }
    }
}

/// Align without confirmation, mapping end-of-stream to `None`
fn try_align<S: SampleSource + ?Sized>(
    source: &mut S,
    config: &DecodeConfig,
    index: usize,
) -> Result<Option<Alignment>> {
    match align(source, config, index, false) {
        Ok(alignment) => Ok(Some(alignment)),
        Err(e) if e.is_end_of_stream() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Low-speed demodulator: sync search followed by the cell decode loop
pub struct Decoder {
    config: DecodeConfig,
}

impl Decoder {
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    /// Decoder with the default 1000 baud timing for `format`
    pub fn for_format(format: &SampleFormat, low_mode: bool) -> Self {
        Self::new(DecodeConfig::new(format, low_mode))
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Demodulate a whole recording into raw CAS bytes
    ///
    /// Returns [`CasTapeError::SyncNotFound`] when no double-confirmed sync
    /// pulse exists anywhere in the stream.
    pub fn decode<S: SampleSource + ?Sized>(&self, source: &mut S) -> Result<Vec<u8>> {
        self.decode_report(source).map(|(bytes, _)| bytes)
    }

    pub fn decode_report<S: SampleSource + ?Sized>(&self, source: &mut S) -> Result<(Vec<u8>, DecodeReport)> {
        let sync = find_first_sync(source, &self.config)?.ok_or(CasTapeError::SyncNotFound)?;
        BitstreamAssembler::new(&self.config).decode_with_report(source, sync)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::bits_msb_first;
    use crate::source::SampleBuffer;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::Mutex;

    const NEUTRAL: i32 = 127;
    const LEADER: usize = 300;

    fn put_pulse(samples: &mut [i32], at: usize) {
        samples[at..at + 5].fill(230);
        samples[at + 5..at + 10].fill(20);
    }

    /// Sync pulse every `spacing` samples, data pulse 44 samples after a `1` sync
    fn synth(bits: &[bool], spacing: usize) -> (Vec<i32>, Vec<usize>) {
        let mut samples = vec![NEUTRAL; LEADER + bits.len() * spacing + 2 * 88];
        let mut syncs = Vec::new();
        for (i, &bit) in bits.iter().enumerate() {
            let at = LEADER + i * spacing;
            put_pulse(&mut samples, at);
            syncs.push(at);
            if bit {
                put_pulse(&mut samples, at + 44);
            }
        }
        (samples, syncs)
    }

    fn decoder() -> Decoder {
        Decoder::for_format(&SampleFormat::unsigned_8bit(44100), false)
    }

    fn buffer(samples: Vec<i32>) -> SampleBuffer {
        SampleBuffer::new(SampleFormat::unsigned_8bit(44100), samples)
    }

    #[test]
    fn test_decodes_a5_3c() {
        let bits: Vec<bool> = bits_msb_first(&[0xA5, 0x3C]).collect();
        let (samples, _) = synth(&bits, 88);
        let mut source = buffer(samples);

        let (bytes, report) = decoder().decode_report(&mut source).unwrap();
        assert_eq!(bytes, vec![0xA5, 0x3C]);
        assert_eq!(report.sync_index, LEADER);
        assert!(report.bits_decoded >= 16);
        assert!(report.dropped_bits < 8);
    }

    #[test]
    fn test_trailing_partial_byte_not_emitted() {
        let mut bits: Vec<bool> = bits_msb_first(&[0xA5]).collect();
        bits.extend([true, true, true]);
        let (samples, _) = synth(&bits, 88);
        let mut source = buffer(samples);

        let (bytes, report) = decoder().decode_report(&mut source).unwrap();
        assert_eq!(bytes, vec![0xA5]);
        assert!(report.dropped_bits >= 3);
    }

    #[test]
    fn test_tracks_slow_tape() {
        let data = [0x12, 0xEF, 0x80];
        let bits: Vec<bool> = bits_msb_first(&data).collect();
        let (samples, _) = synth(&bits, 90);
        let mut source = buffer(samples);

        let (bytes, report) = decoder().decode_report(&mut source).unwrap();
        assert_eq!(bytes, data);
        assert_eq!(report.free_run_cells, 2);
    }

    #[test]
    fn test_missing_sync_strobe_free_runs_one_cell() {
        let bits: Vec<bool> = bits_msb_first(&[0xA5, 0x3C]).collect();
        let (mut samples, syncs) = synth(&bits, 88);
        samples[syncs[5]..syncs[5] + 10].fill(NEUTRAL);
        let mut source = buffer(samples);

        let (bytes, report) = decoder().decode_report(&mut source).unwrap();
        assert_eq!(bytes, vec![0xA5, 0x3C]);
        // One gap in the data plus the two trailing silent cells
        assert_eq!(report.free_run_cells, 3);
    }

    #[test]
    fn test_assembler_from_known_sync() {
        let bits: Vec<bool> = bits_msb_first(&[0x5A]).collect();
        let (samples, syncs) = synth(&bits, 88);
        let mut source = buffer(samples);
        let config = DecodeConfig::new(&SampleFormat::unsigned_8bit(44100), false);

        let bytes = BitstreamAssembler::new(&config)
            .decode(&mut source, syncs[0])
            .unwrap();
        assert_eq!(bytes, vec![0x5A]);
    }

    #[test]
    fn test_stream_ending_after_last_data_window_keeps_last_byte() {
        let config = DecodeConfig::new(&SampleFormat::unsigned_8bit(44100), false);
        let bits: Vec<bool> = bits_msb_first(&[0xA5, 0x3C]).collect();
        let (mut samples, syncs) = synth(&bits, 88);
        let last = syncs[syncs.len() - 1];
        let data_end = last + config.period - config.half_strobe / 2 + config.window;
        samples.truncate(data_end);

        let (bytes, report) = Decoder::new(config.clone())
            .decode_report(&mut buffer(samples.clone()))
            .unwrap();
        assert_eq!(bytes, vec![0xA5, 0x3C]);
        assert_eq!(report.bits_decoded, 16);
        assert_eq!(report.dropped_bits, 0);

        // One sample short and the final cell is lost with its byte
        samples.truncate(data_end - 1);
        let (bytes, report) = Decoder::new(config)
            .decode_report(&mut buffer(samples))
            .unwrap();
        assert_eq!(bytes, vec![0xA5]);
        assert_eq!(report.dropped_bits, 7);
    }

    /// Keeps every record from this crate so level choices can be asserted
    struct CaptureLogger;

    static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

    impl Log for CaptureLogger {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            if record.target().starts_with("castape_core") {
                if let Ok(mut records) = RECORDS.lock() {
                    records.push((record.level(), record.args().to_string()));
                }
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger;

    #[test]
    fn test_missing_data_strobe_logged_at_debug() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);

        let bits: Vec<bool> = bits_msb_first(&[0x00]).collect();
        let (samples, syncs) = synth(&bits, 88);
        let mut source = buffer(samples);
        let config = DecodeConfig::new(&SampleFormat::unsigned_8bit(44100), false);
        BitstreamAssembler::new(&config)
            .decode(&mut source, syncs[0])
            .unwrap();

        let expected = format!("cell @{}: no data strobe at {}", syncs[3], syncs[3] + 42);
        let records = RECORDS.lock().unwrap();
        let matching: Vec<_> = records
            .iter()
            .filter(|(_, message)| message.starts_with(&expected))
            .collect();
        assert!(!matching.is_empty(), "no diagnostic for cell {}", syncs[3]);
        assert!(matching.iter().all(|(level, _)| *level == Level::Debug));
    }

    #[test]
    fn test_silence_is_sync_not_found() {
        let mut source = buffer(vec![NEUTRAL; 10_000]);
        let err = decoder().decode(&mut source).unwrap_err();
        assert!(matches!(err, CasTapeError::SyncNotFound));
    }
}
