//! Transcription line format (§4.6): `"<start_ms> <end_ms> <word...>"`.

use crate::error::MergerError;

/// One word read off the transcription stream, with its timing in
/// milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
}

impl Word {
    pub fn start_secs(&self) -> f64 {
        self.start_ms as f64 / 1000.0
    }

    pub fn end_secs(&self) -> f64 {
        self.end_ms as f64 / 1000.0
    }

    /// Parse `"<start_ms> <end_ms> <word...>"`. `word...` may itself
    /// contain spaces, so only the first two fields are split off.
    /// `end < start` is normalized by clamping `start` down to
    /// `min(start, end)` rather than rejecting the line.
    pub fn parse(line: &str) -> Result<Word, MergerError> {
        let mut parts = line.splitn(3, ' ');
        let start = parts.next().filter(|s| !s.is_empty()).ok_or_else(|| malformed(line))?;
        let end = parts.next().filter(|s| !s.is_empty()).ok_or_else(|| malformed(line))?;
        let text = parts.next().ok_or_else(|| malformed(line))?;

        let start: i64 = start.parse().map_err(|_| malformed(line))?;
        let end: i64 = end.parse().map_err(|_| malformed(line))?;
        let start = start.min(end);

        Ok(Word {
            start_ms: start,
            end_ms: end,
            text: text.to_string(),
        })
    }

    /// Re-serialize as `"<start_ms> <end_ms> <word...>"`, the inverse of
    /// [`Word::parse`] modulo the `end < start` normalization above.
    pub fn to_line(&self) -> String {
        format!("{} {} {}", self.start_ms, self.end_ms, self.text)
    }
}

fn malformed(line: &str) -> MergerError {
    MergerError::TranscriptionParse { line: line.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_line() {
        let word = Word::parse("1000 1500 hello").unwrap();
        assert_eq!(word.start_ms, 1000);
        assert_eq!(word.end_ms, 1500);
        assert_eq!(word.text, "hello");
    }

    #[test]
    fn preserves_words_containing_spaces() {
        let word = Word::parse("1000 1500 hello there").unwrap();
        assert_eq!(word.text, "hello there");
    }

    #[test]
    fn normalizes_inverted_bounds() {
        let word = Word::parse("1500 1000 oops").unwrap();
        assert_eq!(word.start_ms, 1000);
        assert_eq!(word.end_ms, 1000);
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(Word::parse("1000 hello").is_err());
        assert!(Word::parse("not-a-number 1500 hello").is_err());
    }

    #[test]
    fn round_trips_through_to_line() {
        let word = Word::parse("1000 1500 hello").unwrap();
        let reparsed = Word::parse(&word.to_line()).unwrap();
        assert_eq!(word, reparsed);
    }
}
