use crate::config::DecodeConfig;
use crate::error::Result;
use crate::source::SampleSource;
use crate::strobe::{align, Alignment};

/// Locate the first trustworthy sync pulse with no prior timing reference
///
/// The stream is scanned one `period` at a time. Every sample above the
/// coarse quarter-range threshold is tried as a double-confirmed strobe, and
/// the first one that validates wins.
///
/// Returns `Ok(None)` when the scan reaches the end of the stream without a
/// confirmed pulse. Only source failures other than end-of-stream are errors.
pub fn find_first_sync<S: SampleSource + ?Sized>(
    source: &mut S,
    config: &DecodeConfig,
) -> Result<Option<usize>> {
    let total = source.len();
    let mut candidates = Vec::with_capacity(config.period);
    let mut chunk_start = 0;

    while chunk_start < total {
        let chunk_len = config.period.min(total - chunk_start);

        candidates.clear();
        match source.window(chunk_start, chunk_len) {
            Ok(chunk) => candidates.extend(
                chunk
                    .iter()
                    .enumerate()
                    .filter(|&(_, &sample)| sample > config.pulse_threshold)
                    .map(|(offset, _)| chunk_start + offset),
            ),
            Err(e) if e.is_end_of_stream() => return Ok(None),
            Err(e) => return Err(e),
        }

        for &index in &candidates {
            match align(source, config, index, true) {
                Ok(Alignment::Edge(edge)) => {
                    log::debug!("sync pulse at sample {} (candidate {})", edge, index);
                    return Ok(Some(edge));
                }
                Ok(Alignment::Rejected(rejection)) => {
                    log::trace!("sync candidate {} rejected: {}", index, rejection);
                }
                Err(e) if e.is_end_of_stream() => return Ok(None),
                Err(e) => return Err(e),
            }
        }

        chunk_start += chunk_len;
    }

    Ok(None)
}
