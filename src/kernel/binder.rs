use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::event::UiEvent;
use super::page::{ControlRole, SegmentNode, Transcription};
use super::segment::{Direction, SegmentField, SegmentId};

/// What a bound handler asks the reactor to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    UpdateSegmentField {
        segment: SegmentId,
        field: SegmentField,
        value: String,
    },
    UpdateTranscriptionField {
        field: String,
        value: String,
    },
    /// Text focus: seek to the segment start and play, if autoplay is on.
    Autoplay { segment: SegmentId },
    Play { segment: SegmentId },
    Pause,
    Rewind,
    Insert {
        anchor: SegmentId,
        direction: Direction,
    },
    Delete { segment: SegmentId },
    SetAutoplay(bool),
    RenameSpeaker { old: String, new: String },
}

/// Handlers attached to one segment row.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentBinding {
    pub fields: Vec<SegmentField>,
    pub text_focus: bool,
    pub controls: Vec<ControlRole>,
}

/// Routes UI events to actions. Only rows and parts that went through
/// [`EventBinder::bind_segment`] / [`EventBinder::bind_transcription`] react.
#[derive(Debug, Default)]
pub struct EventBinder {
    segments: HashMap<SegmentId, SegmentBinding>,
    parts: HashSet<String>,
}

impl EventBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_transcription(&mut self, transcription: &Transcription) {
        for part in &transcription.parts {
            self.parts.insert(part.field.clone());
        }
    }

    /// Attach behaviour to a segment row. Used for rows present at load and
    /// for every row created by an insert; binding twice replaces, never
    /// duplicates.
    pub fn bind_segment(&mut self, node: &SegmentNode) {
        let binding = SegmentBinding {
            fields: SegmentField::ALL.to_vec(),
            text_focus: true,
            controls: node.controls.clone(),
        };
        if self.segments.insert(node.id, binding).is_some() {
            debug!(segment = node.id, "segment re-bound");
        }
    }

    pub fn unbind_segment(&mut self, id: SegmentId) {
        self.segments.remove(&id);
    }

    pub fn is_bound(&self, id: SegmentId) -> bool {
        self.segments.contains_key(&id)
    }

    pub fn binding(&self, id: SegmentId) -> Option<&SegmentBinding> {
        self.segments.get(&id)
    }

    pub fn route(&self, event: &UiEvent) -> Option<Action> {
        match event {
            UiEvent::SegmentChanged {
                segment,
                field,
                value,
            } => {
                let binding = self.segments.get(segment)?;
                binding
                    .fields
                    .contains(field)
                    .then(|| Action::UpdateSegmentField {
                        segment: *segment,
                        field: *field,
                        value: value.clone(),
                    })
            }
            UiEvent::TranscriptionChanged { field, value } => {
                self.parts
                    .contains(field)
                    .then(|| Action::UpdateTranscriptionField {
                        field: field.clone(),
                        value: value.clone(),
                    })
            }
            UiEvent::TextFocused { segment } => {
                let binding = self.segments.get(segment)?;
                binding
                    .text_focus
                    .then_some(Action::Autoplay { segment: *segment })
            }
            UiEvent::ControlClicked { segment, control } => {
                let role: ControlRole = match control.parse() {
                    Ok(role) => role,
                    Err(e) => {
                        warn!(segment, "{}", e);
                        return None;
                    }
                };
                let binding = self.segments.get(segment)?;
                if !binding.controls.contains(&role) {
                    return None;
                }
                Some(control_action(*segment, role))
            }
            UiEvent::AutoplayToggled(enabled) => Some(Action::SetAutoplay(*enabled)),
            UiEvent::SpeakerRenamed { old, new } => Some(Action::RenameSpeaker {
                old: old.clone(),
                new: new.clone(),
            }),
        }
    }
}

fn control_action(segment: SegmentId, role: ControlRole) -> Action {
    match role {
        ControlRole::Play => Action::Play { segment },
        ControlRole::Pause => Action::Pause,
        ControlRole::Rewind => Action::Rewind,
        ControlRole::AddBefore => Action::Insert {
            anchor: segment,
            direction: Direction::Before,
        },
        ControlRole::AddAfter => Action::Insert {
            anchor: segment,
            direction: Direction::After,
        },
        ControlRole::Delete => Action::Delete { segment },
    }
}
