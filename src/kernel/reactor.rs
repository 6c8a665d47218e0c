use std::collections::HashMap;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::binder::{Action, EventBinder};
use super::context::EditorContext;
use super::event::{Completion, Event, RequestId, SideEffect, UiEvent};
use super::media::{MediaClock, MediaPlayer};
use super::page::{EditPage, InputState};
use super::segment::SegmentId;
use super::store::{
    Outcome, PendingInsert, PendingRemove, PendingRename, PendingUpdate, SegmentStore, StoreError,
};
use crate::services::api::ApiRequest;
use crate::timecode;

pub const INSERT_FAILED: &str = "Segment creation failed due to server error.";
pub const DELETE_FAILED: &str = "Segment deletion failed due to server error.";
pub const RENAME_FAILED: &str = "Speaker rename failed due to server error.";

/// A request the reactor is waiting on.
#[derive(Debug, Clone, PartialEq)]
enum PendingOp {
    SegmentField(PendingUpdate),
    TranscriptionField { field: String, value: String },
    Insert(PendingInsert),
    Remove(PendingRemove),
    Rename(PendingRename),
}

/// Owns the editor state. Never awaits: UI events and request completions
/// go in, side effects for the driver come out.
///
/// Requests are not serialized. Several may be in flight for the same input
/// and completions are applied in whatever order they arrive.
pub struct Reactor<M = MediaClock> {
    pub store: SegmentStore,
    pub binder: EventBinder,
    pub context: EditorContext<M>,
    in_flight: HashMap<RequestId, PendingOp>,
}

impl<M: MediaPlayer> Reactor<M> {
    /// Mirror a rendered page and bind every row on it.
    pub fn new(page: EditPage, media: M) -> Self {
        let context = EditorContext::new(page.transcription, media).with_autoplay(page.autoplay);
        let store = SegmentStore::from_nodes(page.segments);
        Self::with_context(store, context)
    }

    pub fn with_context(store: SegmentStore, context: EditorContext<M>) -> Self {
        let mut binder = EventBinder::new();
        binder.bind_transcription(&context.transcription);
        for entry in store.entries() {
            binder.bind_segment(&entry.node);
        }

        info!(
            transcription = context.transcription.id,
            segments = store.len(),
            "editor ready"
        );

        Self {
            store,
            binder,
            context,
            in_flight: HashMap::new(),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn step(&mut self, events: Vec<Event>) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        for event in events {
            let produced = match event {
                Event::Ui(ui) => self.handle(ui),
                Event::Completed(completion) => self.complete(completion),
            };
            effects.extend(produced);
        }
        effects
    }

    pub fn handle(&mut self, event: UiEvent) -> Vec<SideEffect> {
        let Some(action) = self.binder.route(&event) else {
            debug!(?event, "no handler bound");
            return Vec::new();
        };
        self.perform(action)
    }

    fn perform(&mut self, action: Action) -> Vec<SideEffect> {
        match action {
            Action::UpdateSegmentField {
                segment,
                field,
                value,
            } => match self.store.update_field(segment, field, &value) {
                Ok(pending) => vec![self.dispatch(PendingOp::SegmentField(pending))],
                Err(e) => {
                    warn!("{}", e);
                    Vec::new()
                }
            },
            Action::UpdateTranscriptionField { field, value } => {
                let Some(part) = self.context.transcription.part_mut(&field) else {
                    return Vec::new();
                };
                part.input.value = value.clone();
                part.input.state = InputState::Pending;
                vec![self.dispatch(PendingOp::TranscriptionField { field, value })]
            }
            Action::Autoplay { segment } => {
                if self.context.autoplay {
                    match self.start_of(segment).as_deref().and_then(timecode::parse) {
                        Some(start) => self.seek_and_play(start),
                        None => debug!(segment, "start time does not parse, not seeking"),
                    }
                }
                Vec::new()
            }
            Action::Play { segment } => {
                let start = self
                    .start_of(segment)
                    .map(|text| timecode::parse_or_zero(&text))
                    .unwrap_or(0.0);
                self.seek_and_play(start);
                Vec::new()
            }
            Action::Pause => {
                self.context.media.pause();
                Vec::new()
            }
            Action::Rewind => {
                let target = (self.context.media.current_time() - self.context.rewind_step).max(0.0);
                self.context.media.seek(target);
                Vec::new()
            }
            Action::Insert { anchor, direction } => {
                match self.store.insert_relative(anchor, direction) {
                    Ok(pending) => vec![self.dispatch(PendingOp::Insert(pending))],
                    Err(e) => {
                        warn!("{}", e);
                        vec![SideEffect::Alert(INSERT_FAILED.to_string())]
                    }
                }
            }
            Action::Delete { segment } => match self.store.remove(segment) {
                Ok(pending) => vec![self.dispatch(PendingOp::Remove(pending))],
                Err(e) => {
                    warn!("{}", e);
                    Vec::new()
                }
            },
            Action::SetAutoplay(enabled) => {
                self.context.autoplay = enabled;
                Vec::new()
            }
            Action::RenameSpeaker { old, new } => {
                let transcription_id = self.context.transcription.id;
                match self.store.rename_speaker(transcription_id, &old, &new) {
                    Ok(pending) => vec![self.dispatch(PendingOp::Rename(pending))],
                    Err(e) => {
                        warn!("{}", e);
                        Vec::new()
                    }
                }
            }
        }
    }

    pub fn complete(&mut self, completion: Completion) -> Vec<SideEffect> {
        let Some(op) = self.in_flight.remove(&completion.id) else {
            warn!(request = %completion.id, "completion for an unknown request");
            return Vec::new();
        };
        let outcome = completion.outcome;

        match op {
            PendingOp::SegmentField(pending) => {
                if let Err(e) = self.store.resolve_update(&pending, &outcome) {
                    debug!("{}", e);
                }
                Vec::new()
            }
            PendingOp::TranscriptionField { field, value } => {
                self.resolve_transcription_field(&field, value, &outcome);
                Vec::new()
            }
            PendingOp::Insert(pending) => match self.store.resolve_insert(&pending, &outcome) {
                Ok(id) => {
                    if let Some(entry) = self.store.get(id) {
                        self.binder.bind_segment(&entry.node);
                    }
                    Vec::new()
                }
                // The server holds the new segment but there is nowhere to put it.
                Err(StoreError::AnchorRemoved(anchor)) => {
                    info!(anchor, "anchor gone before insert completed, reloading");
                    vec![SideEffect::Reload]
                }
                Err(e) => {
                    warn!("{}", e);
                    vec![SideEffect::Alert(INSERT_FAILED.to_string())]
                }
            },
            PendingOp::Remove(pending) => match self.store.resolve_remove(&pending, &outcome) {
                Ok(_) => {
                    self.binder.unbind_segment(pending.segment_id);
                    if self.store.is_empty() {
                        vec![SideEffect::Reload]
                    } else {
                        Vec::new()
                    }
                }
                Err(StoreError::UnknownSegment(id)) => {
                    debug!(segment = id, "segment already removed");
                    Vec::new()
                }
                Err(e) => {
                    warn!("{}", e);
                    vec![SideEffect::Alert(DELETE_FAILED.to_string())]
                }
            },
            PendingOp::Rename(pending) => match self.store.resolve_rename(&pending, &outcome) {
                Ok(_) => Vec::new(),
                Err(e) => {
                    warn!("{}", e);
                    vec![SideEffect::Alert(RENAME_FAILED.to_string())]
                }
            },
        }
    }

    fn dispatch(&mut self, op: PendingOp) -> SideEffect {
        let request = match &op {
            PendingOp::SegmentField(pending) => pending.request(),
            PendingOp::TranscriptionField { field, value } => {
                let transcription_id = self.context.transcription.id;
                if field == "title" {
                    ApiRequest::UpdateTitle {
                        transcription_id,
                        value: value.clone(),
                    }
                } else {
                    ApiRequest::UpdateTranscriptionField {
                        transcription_id,
                        field: field.clone(),
                        value: value.clone(),
                    }
                }
            }
            PendingOp::Insert(pending) => pending.request(),
            PendingOp::Remove(pending) => pending.request(),
            PendingOp::Rename(pending) => pending.request(),
        };

        let id = Uuid::new_v4();
        debug!(request = %id, path = %request.path(), "dispatching");
        self.in_flight.insert(id, op);
        SideEffect::Request { id, request }
    }

    fn resolve_transcription_field(&mut self, field: &str, value: String, outcome: &Outcome) {
        let saved = matches!(outcome, Ok(response) if response.status == 200);
        let transcription = &mut self.context.transcription;

        if saved && field == "title" {
            transcription.title = value;
        }
        if let Some(part) = transcription.part_mut(field) {
            part.input.state = if saved {
                InputState::Success
            } else {
                InputState::Error
            };
        }
        if !saved {
            warn!(transcription = transcription.id, field, "transcription update rejected");
        }
    }

    fn start_of(&self, segment: SegmentId) -> Option<String> {
        self.store
            .get(segment)
            .map(|entry| entry.node.start.value.clone())
    }

    fn seek_and_play(&mut self, seconds: f64) {
        self.context.media.seek(seconds);
        self.context.media.play();
    }
}
