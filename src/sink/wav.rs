//! WAV file container sink.

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::sink::PcmSink;

/// Offset of the RIFF chunk size field.
const RIFF_SIZE_OFFSET: u64 = 4;

/// Offset of the data chunk size field.
const DATA_SIZE_OFFSET: u64 = 40;

/// Header bytes preceding the data chunk; the RIFF size field counts
/// everything after itself, so it reads this minus the first eight bytes.
const HEADER_BYTES: u32 = 44;

/// Sink that writes a self-contained mono 16-bit PCM WAV file.
///
/// The header goes out at construction describing an empty data chunk, so
/// the file is structurally valid from the first moment it exists. Samples
/// append behind it; `flush` seeks back and patches the two size fields,
/// then restores the append position, so writing may continue after a flush
/// and each later flush re-patches the sizes.
pub struct WavSink {
    file: BufWriter<File>,
    sample_rate: u32,
    data_bytes: u32,
}

impl WavSink {
    /// Create `path`, truncating anything already there, and write the
    /// placeholder header.
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self> {
        let file = File::create(path)?;
        let mut sink = WavSink {
            file: BufWriter::new(file),
            sample_rate,
            data_bytes: 0,
        };
        sink.write_header()?;
        sink.file.flush()?;
        debug!("writing WAV at {sample_rate} Hz to {}", path.display());
        Ok(sink)
    }

    fn write_header(&mut self) -> Result<()> {
        let w = &mut self.file;
        w.write_all(b"RIFF")?;
        w.write_all(&(HEADER_BYTES - 8 + self.data_bytes).to_le_bytes())?;
        w.write_all(b"WAVE")?;
        w.write_all(b"fmt ")?;
        w.write_all(&16u32.to_le_bytes())?; // fmt chunk length
        w.write_all(&1u16.to_le_bytes())?; // integer PCM
        w.write_all(&1u16.to_le_bytes())?; // mono
        w.write_all(&self.sample_rate.to_le_bytes())?;
        w.write_all(&(self.sample_rate * 2).to_le_bytes())?; // bytes per second
        w.write_all(&2u16.to_le_bytes())?; // block align
        w.write_all(&16u16.to_le_bytes())?; // bits per sample
        w.write_all(b"data")?;
        w.write_all(&self.data_bytes.to_le_bytes())?;
        Ok(())
    }
}

impl PcmSink for WavSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, samples: &[i16]) -> Result<()> {
        let added = u32::try_from(samples.len())
            .ok()
            .and_then(|n| n.checked_mul(2))
            .and_then(|b| self.data_bytes.checked_add(b))
            .ok_or_else(|| {
                Error::FileIo(io::Error::new(
                    io::ErrorKind::FileTooLarge,
                    "WAV data chunk cannot exceed 4 GiB",
                ))
            })?;
        for &sample in samples {
            self.file.write_all(&sample.to_le_bytes())?;
        }
        self.data_bytes = added;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Empty the write buffer first so the size fields can be patched in
        // place on the underlying file.
        self.file.flush()?;
        let file = self.file.get_mut();
        let append = file.stream_position()?;
        file.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))?;
        file.write_all(&(HEADER_BYTES - 8 + self.data_bytes).to_le_bytes())?;
        file.seek(SeekFrom::Start(DATA_SIZE_OFFSET))?;
        file.write_all(&self.data_bytes.to_le_bytes())?;
        file.seek(SeekFrom::Start(append))?;
        debug!("finalized {} data bytes", self.data_bytes);
        Ok(())
    }
}
