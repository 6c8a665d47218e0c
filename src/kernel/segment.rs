use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned segment identity. The client never invents one.
pub type SegmentId = i64;

/// "No neighbouring segment in this direction."
pub const NO_SEGMENT: SegmentId = -1;

/// A confirmed segment record, as last acknowledged by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub speaker: String,
    #[serde(default)]
    pub text: String,
}

impl Segment {
    pub fn new(id: SegmentId, start: f64, end: f64) -> Self {
        Self {
            id,
            start,
            end,
            speaker: String::new(),
            text: String::new(),
        }
    }

    /// Apply a value the server accepted.
    pub fn apply(&mut self, field: SegmentField, value: &FieldValue) {
        match (field, value) {
            (SegmentField::Start, FieldValue::Seconds(Some(seconds))) => self.start = *seconds,
            (SegmentField::End, FieldValue::Seconds(Some(seconds))) => self.end = *seconds,
            (SegmentField::Speaker, FieldValue::Text(text)) => self.speaker = text.clone(),
            (SegmentField::Text, FieldValue::Text(text)) => self.text = text.clone(),
            // An unparsed timecode acknowledged by the server leaves nothing to record.
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentField {
    Speaker,
    Start,
    End,
    Text,
}

impl SegmentField {
    pub const ALL: [SegmentField; 4] = [
        SegmentField::Speaker,
        SegmentField::Start,
        SegmentField::End,
        SegmentField::Text,
    ];

    pub fn is_time(self) -> bool {
        matches!(self, SegmentField::Start | SegmentField::End)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SegmentField::Speaker => "speaker",
            SegmentField::Start => "start",
            SegmentField::End => "end",
            SegmentField::Text => "text",
        }
    }
}

impl fmt::Display for SegmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "speaker" => Ok(SegmentField::Speaker),
            "start" => Ok(SegmentField::Start),
            "end" => Ok(SegmentField::End),
            "text" => Ok(SegmentField::Text),
            other => Err(format!("unknown segment field: {}", other)),
        }
    }
}

/// Value sent for a single-field update. Time fields travel as seconds;
/// an unparseable timecode travels as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Seconds(Option<f64>),
}

impl FieldValue {
    pub fn for_field(field: SegmentField, raw: &str) -> Self {
        if field.is_time() {
            FieldValue::Seconds(crate::timecode::parse(raw))
        } else {
            FieldValue::Text(raw.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Before,
    After,
}

impl Direction {
    /// Signed placement the store expects in `where`.
    pub fn as_where(self) -> i32 {
        match self {
            Direction::Before => -1,
            Direction::After => 1,
        }
    }

    pub fn from_where(value: i32) -> Option<Self> {
        match value.signum() {
            -1 => Some(Direction::Before),
            1 => Some(Direction::After),
            _ => None,
        }
    }
}
