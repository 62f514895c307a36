use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::SessionError;

/// WAV layout of every recording: mono, 16-bit signed PCM.
pub fn pcm16_mono_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Persists one session's raw audio as a WAV file.
///
/// The header is written on `open` and finalized (sample counts patched) on `close`.
/// `close` may be called any number of times; only the first call touches the file.
/// Dropping an open sink finalizes it as well.
pub struct AudioSink {
    path: PathBuf,
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    bytes_written: u64,
}

impl AudioSink {
    /// Create the file at `path`, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>, sample_rate: u32) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SessionError::io(&path, e))?;
            }
        }

        let writer = hound::WavWriter::create(&path, pcm16_mono_spec(sample_rate))
            .map_err(|e| SessionError::io(&path, e))?;

        info!("Opened recording: {}", path.display());

        Ok(Self {
            path,
            writer: Some(writer),
            bytes_written: 0,
        })
    }

    /// Append little-endian 16-bit samples. `chunk` must be sample-aligned.
    pub fn write(&mut self, chunk: &[u8]) -> Result<(), SessionError> {
        let writer = match &mut self.writer {
            Some(writer) => writer,
            None => {
                return Err(SessionError::io(
                    &self.path,
                    io::Error::new(io::ErrorKind::Other, "write after close"),
                ))
            }
        };

        if chunk.len() % 2 != 0 {
            return Err(SessionError::io(
                &self.path,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("chunk of {} bytes is not sample-aligned", chunk.len()),
                ),
            ));
        }

        for pair in chunk.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([pair[0], pair[1]]))
                .map_err(|e| SessionError::io(&self.path, e))?;
        }

        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Finalize the header and release the file handle.
    pub fn close(&mut self) -> Result<(), SessionError> {
        match self.writer.take() {
            Some(writer) => {
                writer
                    .finalize()
                    .map_err(|e| SessionError::io(&self.path, e))?;
                info!(
                    "Closed recording: {} ({} bytes of audio)",
                    self.path.display(),
                    self.bytes_written
                );
            }
            None => debug!("Recording {} already closed", self.path.display()),
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl Drop for AudioSink {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize {} on drop: {}", self.path.display(), e);
            }
        }
    }
}
