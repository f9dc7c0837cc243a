//! Output stream setup and the real-time render callback.
//!
//! The callback renders fixed-size planar blocks from the `VoiceEngine`
//! and interleaves them into whatever channel count the device wants.
//! No allocation and no locking happen inside the callback; the only
//! shared state is the SPSC message ring the engine drains itself.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

use crate::error::RipplepadError;
use crate::synth::{MessageReceiver, VoiceEngine};
use crate::MAX_BLOCK_SIZE;

/// Message ring depth. Sixty-odd events per frame at 60 fps would still
/// fit several times over; overflow drops messages on the control side.
pub const RING_CAPACITY: usize = 256;

/// A live output stream. Dropping this stops audio.
pub struct AudioOutput {
    // Held only to keep the stream alive.
    _stream: cpal::Stream,
    sample_rate: f32,
}

impl AudioOutput {
    /// Open the default output device and start rendering from `rx`.
    ///
    /// A missing device is `DeviceUnavailable`; the caller is expected to
    /// keep running visuals-only. Config or stream failures surface as
    /// `DeviceSuspended` with the underlying message.
    pub fn start<R>(rx: R) -> Result<Self, RipplepadError>
    where
        R: MessageReceiver + Send + 'static,
    {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(RipplepadError::DeviceUnavailable)?;
        let config = device
            .default_output_config()
            .map_err(|e| RipplepadError::DeviceSuspended(e.to_string()))?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        info!(sample_rate, channels, "audio output starting");

        let mut engine = VoiceEngine::new(sample_rate, rx);
        let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;

                    while frames_written < total_frames {
                        let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        engine.render_block(&mut left[..frames], &mut right[..frames]);

                        let out_off = frames_written * channels;
                        for i in 0..frames {
                            let (l, r) = (left[i], right[i]);
                            let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                            match frame {
                                // Mono device: fold the stereo image down.
                                [only] => *only = 0.5 * (l + r),
                                [first, rest @ ..] => {
                                    *first = l;
                                    for ch in rest {
                                        *ch = r;
                                    }
                                }
                                [] => {}
                            }
                        }

                        frames_written += frames;
                    }
                },
                |err| error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| RipplepadError::DeviceSuspended(e.to_string()))?;

        stream
            .play()
            .map_err(|e| RipplepadError::DeviceSuspended(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Create a message ring and start audio on the default device. Returns
/// the control-side producer and the running stream.
#[cfg(feature = "rtrb")]
pub fn start_default() -> Result<
    (rtrb::Producer<crate::synth::SynthMessage>, AudioOutput),
    RipplepadError,
> {
    let (tx, rx) = rtrb::RingBuffer::new(RING_CAPACITY);
    let output = AudioOutput::start(rx)?;
    Ok((tx, output))
}
