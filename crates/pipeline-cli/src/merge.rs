//! `pipeline merge` -- run the diarization merger standalone, matching the
//! original `merge_diarization` tool's flags one-to-one.

use std::time::Duration;

use clap::Parser;
use diarization_merger::{Merger, MergerConfig};
use eyre::{eyre, Result};

#[derive(Debug, Parser)]
pub struct Cli {
    /// Loopback port the ASR stage's line-delimited transcription is read
    /// from.
    #[arg(long)]
    transcription_port: u16,

    /// Loopback port the diarizer's RTTM stream is read from.
    #[arg(long)]
    diarization_port: u16,

    /// Capacity of the ring buffer of recent speaker turns.
    #[arg(long, default_value_t = 200)]
    diarization_buffer_size: usize,

    /// Seconds to wait after a transcription batch for the diarizer to
    /// publish turns covering it.
    #[arg(long, default_value_t = 2.0)]
    maximum_diarization_delay: f64,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = MergerConfig {
            transcription_port: self.transcription_port,
            diarization_port: self.diarization_port,
            buffer_capacity: self.diarization_buffer_size,
            maximum_diarization_delay: Duration::from_secs_f64(self.maximum_diarization_delay),
        };

        tokio::task::spawn_blocking(move || {
            let mut merger = Merger::open(config)?;
            let mut stdout = std::io::stdout().lock();
            merger.run(&mut stdout)
        })
        .await
        .map_err(|err| eyre!("merger task panicked: {err}"))??;

        Ok(())
    }
}
