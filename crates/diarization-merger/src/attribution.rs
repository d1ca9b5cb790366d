//! Overlap-or-nearest speaker attribution (§4.6 step 4).

use crate::ring_buffer::RingBuffer;

/// Emitted when the ring buffer is empty or carries no turn closer than
/// "never seen one".
pub const UNKNOWN_SPEAKER: &str = "unknown_speaker";

/// Attribute a word spanning `[word_start, word_end]` (seconds) against the
/// buffered turns:
///
/// - Turns that overlap the word (including zero-length touches)
///   accumulate a per-speaker overlap sum.
/// - If any speaker has positive accumulated overlap, the speaker with the
///   largest sum wins, ties broken by first-seen order.
/// - Otherwise, the speaker of the turn with the smallest positive temporal
///   distance wins, ties broken by first-seen order.
/// - An empty buffer (or one with no candidate at all) attributes to
///   [`UNKNOWN_SPEAKER`].
pub fn attribute(word_start: f64, word_end: f64, buffer: &RingBuffer) -> String {
    let mut overlap_sums: Vec<(String, f64)> = Vec::new();
    let mut nearest: Option<(String, f64)> = None;

    for turn in buffer.iter() {
        if turn.end < word_start {
            consider_nearest(&mut nearest, &turn.speaker, word_start - turn.end);
        } else if turn.start > word_end {
            consider_nearest(&mut nearest, &turn.speaker, turn.start - word_end);
        } else {
            let overlap = (word_end.min(turn.end) - word_start.max(turn.start)).max(0.0);
            accumulate(&mut overlap_sums, &turn.speaker, overlap);
        }
    }

    if let Some(speaker) = best_overlap(&overlap_sums) {
        return speaker;
    }

    match nearest {
        Some((speaker, _)) => speaker,
        None => UNKNOWN_SPEAKER.to_string(),
    }
}

/// First-seen-order max: only replaces the current best on a strictly
/// greater sum, so an earlier speaker wins any tie.
fn best_overlap(sums: &[(String, f64)]) -> Option<String> {
    let mut best: Option<&(String, f64)> = None;
    for entry in sums {
        if entry.1 <= 0.0 {
            continue;
        }
        best = match best {
            Some(current) if current.1 >= entry.1 => Some(current),
            _ => Some(entry),
        };
    }
    best.map(|(speaker, _)| speaker.clone())
}

fn consider_nearest(nearest: &mut Option<(String, f64)>, speaker: &str, distance: f64) {
    match nearest {
        Some((_, best)) if *best <= distance => {}
        _ => *nearest = Some((speaker.to_string(), distance)),
    }
}

fn accumulate(sums: &mut Vec<(String, f64)>, speaker: &str, overlap: f64) {
    if let Some(entry) = sums.iter_mut().find(|(s, _)| s == speaker) {
        entry.1 += overlap;
    } else {
        sums.push((speaker.to_string(), overlap));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::Turn;

    fn buffer_of(turns: Vec<Turn>) -> RingBuffer {
        let mut buffer = RingBuffer::new(turns.len().max(1));
        for turn in turns {
            buffer.push(turn);
        }
        buffer
    }

    /// S4 -- transcription "1000 1500 hello" (1.0-1.5s), one turn spkA
    /// covering 0.8-1.6s, which overlaps. Expect "spkA".
    #[test]
    fn s4_overlap_wins() {
        let buffer = buffer_of(vec![Turn {
            speaker: "spkA".to_string(),
            start: 0.8,
            end: 1.6,
        }]);
        assert_eq!(attribute(1.0, 1.5, &buffer), "spkA");
    }

    /// S5 -- transcription "2000 2200 world" (2.0-2.2s); buffer has spkB
    /// 0.0-1.0s (distance 1.0s) and spkC 3.0-4.0s (distance 0.8s). Expect
    /// the nearer speaker, spkC.
    #[test]
    fn s5_nearest_wins_when_no_overlap() {
        let buffer = buffer_of(vec![
            Turn {
                speaker: "spkB".to_string(),
                start: 0.0,
                end: 1.0,
            },
            Turn {
                speaker: "spkC".to_string(),
                start: 3.0,
                end: 4.0,
            },
        ]);
        assert_eq!(attribute(2.0, 2.2, &buffer), "spkC");
    }

    /// S6 -- empty buffer attributes to the literal unknown_speaker.
    #[test]
    fn s6_empty_buffer_is_unknown() {
        let buffer = RingBuffer::new(4);
        assert_eq!(attribute(5.0, 5.1, &buffer), UNKNOWN_SPEAKER);
    }

    #[test]
    fn overlap_ties_break_by_first_seen() {
        let buffer = buffer_of(vec![
            Turn {
                speaker: "first".to_string(),
                start: 1.0,
                end: 2.0,
            },
            Turn {
                speaker: "second".to_string(),
                start: 1.0,
                end: 2.0,
            },
        ]);
        assert_eq!(attribute(1.0, 2.0, &buffer), "first");
    }

    /// A zero-length touch accumulates zero overlap, which is not positive,
    /// so it can't win the overlap branch; since that same turn isn't a
    /// distance candidate either (it's neither strictly before nor
    /// strictly after the word), a lone touching turn falls through to
    /// unknown_speaker.
    #[test]
    fn zero_length_touch_alone_falls_through_to_unknown() {
        let buffer = buffer_of(vec![Turn {
            speaker: "touching".to_string(),
            start: 2.0,
            end: 3.0,
        }]);
        assert_eq!(attribute(1.0, 2.0, &buffer), UNKNOWN_SPEAKER);
    }

    #[test]
    fn overlapping_turn_beats_a_merely_touching_one() {
        let buffer = buffer_of(vec![
            Turn {
                speaker: "overlapping".to_string(),
                start: 1.5,
                end: 2.5,
            },
            Turn {
                speaker: "touching".to_string(),
                start: 2.0,
                end: 3.0,
            },
        ]);
        assert_eq!(attribute(1.0, 2.0, &buffer), "overlapping");
    }
}
