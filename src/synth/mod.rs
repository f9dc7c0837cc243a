pub mod engine;
pub mod message;
pub mod oneshot;
pub mod voice;

pub use engine::VoiceEngine;
pub use message::{MessageReceiver, MessageSink, SynthMessage};
pub use oneshot::OneShotPlayer;
pub use voice::{Voice, VoiceState};
