//! Audio device plumbing: owns the cpal output stream and runs the
//! `VoiceEngine` inside its callback. Everything upstream talks to the
//! engine through the message ring only.

pub mod output;

pub use output::AudioOutput;

#[cfg(feature = "rtrb")]
pub use output::start_default;
