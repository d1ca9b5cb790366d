//! Online two-stream aligner that merges a live transcription stream with a
//! parallel diarization stream into per-word speaker attributions (§4.6).
//!
//! Built on [`port_reader`]'s blocking, single-connection line framer;
//! everything here is synchronous and thread-based rather than `tokio`-driven,
//! since the merger's own concurrency is one cooperatively-interleaved loop,
//! not a supervised process tree.

mod attribution;
mod error;
mod merger;
mod port_reader;
mod ring_buffer;
mod rttm;
mod transcription;
mod turn;

pub use attribution::{attribute, UNKNOWN_SPEAKER};
pub use error::MergerError;
pub use merger::{Merger, MergerConfig};
pub use port_reader::{PortReader, ReaderState};
pub use ring_buffer::RingBuffer;
pub use rttm::parse as parse_rttm_line;
pub use transcription::Word;
pub use turn::Turn;
