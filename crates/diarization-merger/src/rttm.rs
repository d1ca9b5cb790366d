//! RTTM subset parsing (§4.6): only 10-field `SPEAKER` lines are recognized.

use crate::turn::Turn;

/// Parse one RTTM line into a [`Turn`]. Non-`SPEAKER` lines and lines that
/// don't have exactly 10 whitespace-separated fields (or whose numeric
/// fields don't parse) are silently dropped by returning `None` -- the
/// diarization stream is allowed to emit lines this reader doesn't
/// understand without that being an error.
///
/// `start := min(start, start + duration)` normalization is applied so a
/// negative `duration` can't produce an inverted interval.
pub fn parse(line: &str) -> Option<Turn> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 10 || fields[0] != "SPEAKER" {
        return None;
    }

    let start: f64 = fields[3].parse().ok()?;
    let duration: f64 = fields[4].parse().ok()?;
    let speaker = fields[7].to_string();

    let end = start + duration;
    let start = start.min(end);
    Some(Turn { speaker, start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "SPEAKER u 1 0.8 0.8 <NA> <NA> spkA <NA> <NA>";

    #[test]
    fn parses_a_speaker_line() {
        let turn = parse(LINE).unwrap();
        assert_eq!(turn.speaker, "spkA");
        assert_eq!(turn.start, 0.8);
        assert_eq!(turn.end, 1.6);
    }

    #[test]
    fn drops_non_speaker_lines() {
        assert!(parse("SPKR-INFO u 1 <NA> <NA> <NA> unknown <NA> <NA> <NA>").is_none());
    }

    #[test]
    fn drops_lines_with_wrong_field_count() {
        assert!(parse("SPEAKER u 1 0.8 0.8 spkA").is_none());
    }

    #[test]
    fn normalizes_negative_duration() {
        let turn = parse("SPEAKER u 1 2.0 -0.5 <NA> <NA> spkB <NA> <NA>").unwrap();
        assert_eq!(turn.start, 1.5);
        assert_eq!(turn.end, 2.0);
    }

    #[test]
    fn round_trip_preserves_speaker_and_bounds() {
        let turn = parse(LINE).unwrap();
        assert_eq!((turn.speaker.as_str(), turn.start, turn.end), ("spkA", 0.8, 1.6));
    }
}
