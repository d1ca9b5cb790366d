//! The gather/wait/drain/attribute/emit loop (§4.6).

use std::io::Write;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::attribution::attribute;
use crate::error::MergerError;
use crate::port_reader::PortReader;
use crate::ring_buffer::RingBuffer;
use crate::rttm;
use crate::transcription::Word;

/// Configuration for one [`Merger`] run, mirroring the standalone
/// `merge_diarization` CLI's flags one-to-one.
#[derive(Debug, Clone, Copy)]
pub struct MergerConfig {
    pub transcription_port: u16,
    pub diarization_port: u16,
    pub buffer_capacity: usize,
    pub maximum_diarization_delay: Duration,
}

/// Online two-stream aligner: attributes each transcribed word to the
/// best-matching speaker turn using overlap-or-nearest scoring over a
/// bounded ring buffer of recent diarization turns.
pub struct Merger {
    transcription: PortReader,
    diarization: PortReader,
    buffer: RingBuffer,
    delay: Duration,
}

impl Merger {
    /// Bind both ports and block until a peer has connected to each. Each
    /// `open()` runs on its own thread, joined before either is used, so a
    /// slow peer on one port doesn't hold up the other's accept -- the spec
    /// permits either parallel or sequential initialization (§5).
    pub fn open(config: MergerConfig) -> Result<Merger, MergerError> {
        let transcription_port = config.transcription_port;
        let diarization_port = config.diarization_port;

        let transcription_handle = thread::spawn(move || {
            let mut reader = PortReader::new(transcription_port);
            reader.open().map(|()| reader)
        });
        let diarization_handle = thread::spawn(move || {
            let mut reader = PortReader::new(diarization_port);
            reader.open().map(|()| reader)
        });

        let transcription = transcription_handle
            .join()
            .unwrap_or_else(|_| panic!("transcription accept thread panicked"))?;
        let diarization = diarization_handle
            .join()
            .unwrap_or_else(|_| panic!("diarization accept thread panicked"))?;

        info!(
            transcription_port,
            diarization_port, "both diarization merger peers connected"
        );

        Ok(Merger {
            transcription,
            diarization,
            buffer: RingBuffer::new(config.buffer_capacity),
            delay: config.maximum_diarization_delay,
        })
    }

    /// Construct directly from already-opened readers, for tests that want
    /// to drive both sides of the sockets themselves.
    pub fn from_readers(transcription: PortReader, diarization: PortReader, buffer_capacity: usize, delay: Duration) -> Merger {
        Merger {
            transcription,
            diarization,
            buffer: RingBuffer::new(buffer_capacity),
            delay,
        }
    }

    /// Run until end-of-stream on the transcription peer, writing
    /// `"<speaker>\t<word>"` lines to `out`. A malformed transcription line
    /// is fatal (`ParseError`); a malformed diarization line is dropped
    /// silently.
    pub fn run(&mut self, out: &mut impl Write) -> Result<(), MergerError> {
        loop {
            let Some(first_line) = self.transcription.read_line()? else {
                debug!("transcription peer closed, merger loop ending");
                return Ok(());
            };

            let mut batch = vec![Word::parse(&first_line)?];
            while self.transcription.has_data()? {
                match self.transcription.read_line()? {
                    Some(line) => batch.push(Word::parse(&line)?),
                    None => break,
                }
            }

            thread::sleep(self.delay);
            self.drain_diarization()?;

            for word in &batch {
                let speaker = attribute(word.start_secs(), word.end_secs(), &self.buffer);
                writeln!(out, "{speaker}\t{}", word.text)?;
            }
            out.flush()?;
        }
    }

    fn drain_diarization(&mut self) -> Result<(), MergerError> {
        while self.diarization.has_data()? {
            match self.diarization.read_line()? {
                Some(line) => {
                    if let Some(turn) = rttm::parse(&line) {
                        self.buffer.push(turn);
                    }
                }
                None => break,
            }
        }
        Ok(())
    }

    pub fn close(&mut self) {
        self.transcription.close();
        self.diarization.close();
    }
}
