//! A contiguous interval attributed to a single speaker, as read off the
//! diarization stream's RTTM lines.

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub speaker: String,
    pub start: f64,
    pub end: f64,
}
