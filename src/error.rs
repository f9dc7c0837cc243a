//! Error taxonomy for the audio and rendering boundaries.
//!
//! The policy is graceful degradation: audio faults are caught at the edge
//! of each voice/one-shot operation and turn into silence, never into a
//! crashed input pipeline. Only renderer initialization is allowed to be
//! fatal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RipplepadError {
    /// No output device or audio host present. Fatal for this session's
    /// sound, but visuals must keep running. Reported once, swallowed after.
    #[error("no audio output device available")]
    DeviceUnavailable,

    /// The output stream exists but could not be configured or started.
    /// The caller drops to visuals-only rather than crashing the input
    /// pipeline.
    #[error("audio output stream suspended: {0}")]
    DeviceSuspended(String),
}
