pub mod envelope;
pub mod filter;
pub mod lfo;
pub mod oscillator;
pub mod smooth;

pub use envelope::{Envelope, EnvelopeStage};
pub use filter::{FilterKind, SvFilter};
pub use lfo::Lfo;
pub use oscillator::{Oscillator, Waveform};
pub use smooth::Smoothed;
