pub mod file;
pub mod sink;

pub use file::AudioFile;
pub use sink::{pcm16_mono_spec, AudioSink};
