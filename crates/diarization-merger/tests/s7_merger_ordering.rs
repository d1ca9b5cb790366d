//! S7 -- four transcription lines arriving back-to-back, all attributed
//! against the same post-delay diarization snapshot; merger output must
//! preserve transcription arrival order.

use std::io::Write;
use std::net::TcpStream;
use std::net::TcpListener;
use std::time::Duration;

use diarization_merger::{Merger, MergerConfig};

#[test]
fn words_emit_in_transcription_arrival_order() {
    let transcription_port = free_port();
    let diarization_port = free_port();

    let config = MergerConfig {
        transcription_port,
        diarization_port,
        buffer_capacity: 16,
        maximum_diarization_delay: Duration::from_millis(20),
    };

    let handle = std::thread::spawn(move || {
        let mut merger = Merger::open(config).unwrap();
        let mut out = Vec::new();
        merger.run(&mut out).unwrap();
        out
    });

    std::thread::sleep(Duration::from_millis(50));
    let mut transcription = TcpStream::connect(("127.0.0.1", transcription_port)).unwrap();
    let mut diarization = TcpStream::connect(("127.0.0.1", diarization_port)).unwrap();

    diarization
        .write_all(b"SPEAKER u 1 0.0 10.0 <NA> <NA> spkA <NA> <NA>\n")
        .unwrap();

    transcription
        .write_all(b"0 100 one\n200 300 two\n400 500 three\n600 700 four\n")
        .unwrap();
    drop(transcription);
    drop(diarization);

    let output = handle.join().unwrap();
    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["spkA\tone", "spkA\ttwo", "spkA\tthree", "spkA\tfour"]);
}

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
