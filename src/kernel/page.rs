//! Page model: the editable nodes the user sees, mirrored from the rendered
//! edit page.

use std::str::FromStr;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use super::segment::{Segment, SegmentField, SegmentId};
use crate::timecode;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid selector {0}")]
    Selector(String),

    #[error("missing element: {0}")]
    MissingElement(String),

    #[error("segment has a malformed data-index: {0:?}")]
    InvalidSegmentId(String),
}

/// Visual state of one editable input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    #[default]
    Unedited,
    /// Request in flight.
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldInput {
    /// What the user sees. Never reverted after a failed save.
    pub value: String,
    pub state: InputState,
}

impl FieldInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            state: InputState::Unedited,
        }
    }
}

/// Declared role of a segment control button (`data-type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlRole {
    Play,
    Pause,
    Rewind,
    AddBefore,
    AddAfter,
    Delete,
}

impl ControlRole {
    pub const ALL: [ControlRole; 6] = [
        ControlRole::Play,
        ControlRole::Pause,
        ControlRole::Rewind,
        ControlRole::AddBefore,
        ControlRole::AddAfter,
        ControlRole::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ControlRole::Play => "play",
            ControlRole::Pause => "pause",
            ControlRole::Rewind => "rewind",
            ControlRole::AddBefore => "add-before",
            ControlRole::AddAfter => "add-after",
            ControlRole::Delete => "delete",
        }
    }
}

impl FromStr for ControlRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControlRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown control role: {}", s))
    }
}

/// One segment's row on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentNode {
    pub id: SegmentId,
    pub speaker: FieldInput,
    pub start: FieldInput,
    pub end: FieldInput,
    pub text: FieldInput,
    pub controls: Vec<ControlRole>,
}

impl SegmentNode {
    /// Build a fresh row for a segment, the way the page renders one.
    pub fn from_segment(segment: &Segment) -> Self {
        Self {
            id: segment.id,
            speaker: FieldInput::new(segment.speaker.clone()),
            start: FieldInput::new(timecode::format_segment_time(segment.start)),
            end: FieldInput::new(timecode::format_segment_time(segment.end)),
            text: FieldInput::new(segment.text.clone()),
            controls: ControlRole::ALL.to_vec(),
        }
    }

    pub fn input(&self, field: SegmentField) -> &FieldInput {
        match field {
            SegmentField::Speaker => &self.speaker,
            SegmentField::Start => &self.start,
            SegmentField::End => &self.end,
            SegmentField::Text => &self.text,
        }
    }

    pub fn input_mut(&mut self, field: SegmentField) -> &mut FieldInput {
        match field {
            SegmentField::Speaker => &mut self.speaker,
            SegmentField::Start => &mut self.start,
            SegmentField::End => &mut self.end,
            SegmentField::Text => &mut self.text,
        }
    }

    /// The record this row displays. Unparseable times read as zero.
    pub fn to_record(&self) -> Segment {
        Segment {
            id: self.id,
            start: timecode::parse_or_zero(&self.start.value),
            end: timecode::parse_or_zero(&self.end.value),
            speaker: self.speaker.value.clone(),
            text: self.text.value.clone(),
        }
    }
}

/// A transcription-level editable input (`.transcription-part`).
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionPart {
    pub field: String,
    pub input: FieldInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub id: i64,
    pub title: String,
    pub parts: Vec<TranscriptionPart>,
}

impl Transcription {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id,
            parts: vec![TranscriptionPart {
                field: "title".to_string(),
                input: FieldInput::new(title.clone()),
            }],
            title,
        }
    }

    pub fn part(&self, field: &str) -> Option<&TranscriptionPart> {
        self.parts.iter().find(|part| part.field == field)
    }

    pub fn part_mut(&mut self, field: &str) -> Option<&mut TranscriptionPart> {
        self.parts.iter_mut().find(|part| part.field == field)
    }
}

/// Everything the editor needs from a rendered edit page.
#[derive(Debug, Clone, PartialEq)]
pub struct EditPage {
    pub transcription: Transcription,
    pub segments: Vec<SegmentNode>,
    pub autoplay: bool,
    pub csrf_token: Option<String>,
}

/// The transcription id is the last component of the addressed path.
pub fn transcription_id_from_path(path: &str) -> Option<i64> {
    path.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

pub fn parse_edit_page(html: &str, transcription_id: i64) -> Result<EditPage, PageError> {
    let document = Html::parse_document(html);

    let segment_sel = selector(".segment[data-index]")?;
    let segments = document
        .select(&segment_sel)
        .map(segment_from_element)
        .collect::<Result<Vec<_>, _>>()?;

    let part_sel = selector(".transcription-part[data-field]")?;
    let parts: Vec<TranscriptionPart> = document
        .select(&part_sel)
        .filter_map(|element| {
            let field = element.value().attr("data-field")?;
            Some(TranscriptionPart {
                field: field.to_string(),
                input: FieldInput::new(element_value(&element)),
            })
        })
        .collect();

    let title = parts
        .iter()
        .find(|part| part.field == "title")
        .map(|part| part.input.value.clone())
        .unwrap_or_default();

    let autoplay_sel = selector("#autoplay")?;
    let autoplay = document
        .select(&autoplay_sel)
        .next()
        .map(|element| element.value().attr("checked").is_some())
        .unwrap_or(false);

    let csrf_sel = selector("[name=csrfmiddlewaretoken]")?;
    let csrf_token = document
        .select(&csrf_sel)
        .next()
        .and_then(|element| element.value().attr("value"))
        .map(str::to_string);

    Ok(EditPage {
        transcription: Transcription {
            id: transcription_id,
            title,
            parts,
        },
        segments,
        autoplay,
        csrf_token,
    })
}

/// Parse the rendered-fragment form of a newly created segment.
pub fn parse_segment_fragment(html: &str) -> Result<SegmentNode, PageError> {
    let fragment = Html::parse_fragment(html.trim());
    let segment_sel = selector(".segment[data-index]")?;
    let element = fragment
        .select(&segment_sel)
        .next()
        .ok_or_else(|| PageError::MissingElement(".segment[data-index]".to_string()))?;
    segment_from_element(element)
}

fn segment_from_element(element: ElementRef<'_>) -> Result<SegmentNode, PageError> {
    let raw_id = element.value().attr("data-index").unwrap_or_default();
    let id: SegmentId = raw_id
        .trim()
        .parse()
        .map_err(|_| PageError::InvalidSegmentId(raw_id.to_string()))?;

    let mut node = SegmentNode {
        id,
        speaker: FieldInput::default(),
        start: FieldInput::default(),
        end: FieldInput::default(),
        text: FieldInput::default(),
        controls: Vec::new(),
    };

    let field_sel = selector("[data-field]")?;
    for input in element.select(&field_sel) {
        let Some(field) = input
            .value()
            .attr("data-field")
            .and_then(|name| name.parse::<SegmentField>().ok())
        else {
            continue;
        };
        *node.input_mut(field) = FieldInput::new(element_value(&input));
    }

    let button_sel = selector("button[data-type]")?;
    node.controls = element
        .select(&button_sel)
        .filter_map(|button| button.value().attr("data-type")?.parse().ok())
        .collect();

    Ok(node)
}

fn element_value(element: &ElementRef<'_>) -> String {
    if element.value().name() == "textarea" {
        element.text().collect()
    } else {
        element.value().attr("value").unwrap_or_default().to_string()
    }
}

fn selector(css: &str) -> Result<Selector, PageError> {
    Selector::parse(css).map_err(|e| PageError::Selector(format!("{}: {:?}", css, e)))
}
