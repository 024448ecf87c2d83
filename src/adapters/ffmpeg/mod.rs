//! FFmpeg-backed media adapters.

pub mod cutter;
pub mod probe;

pub use cutter::FfmpegCutter;
#[cfg(feature = "libav")]
pub use probe::LibavProber;
pub use probe::FfprobeProber;
