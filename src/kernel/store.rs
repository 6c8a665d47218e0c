use std::collections::BTreeSet;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::page::{parse_segment_fragment, FieldInput, InputState, SegmentNode};
use super::segment::{Direction, FieldValue, Segment, SegmentField, SegmentId, NO_SEGMENT};
use crate::services::api::{ApiRequest, ApiResponse, SyncError};

/// What a request resolved to: a response of any status, or a transport failure.
pub type Outcome = Result<ApiResponse, SyncError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("segment {0} is not on the page")]
    UnknownSegment(SegmentId),

    #[error("segment {0} is already on the page")]
    DuplicateSegment(SegmentId),

    #[error("anchor segment {0} was removed before the insert completed")]
    AnchorRemoved(SegmentId),

    #[error("expected status {expected}, got {actual:?}")]
    UnexpectedStatus { expected: u16, actual: Option<u16> },

    #[error("malformed insert response: {0}")]
    MalformedInsertBody(String),

    #[error("speaker rename needs both an old and a new name")]
    EmptySpeaker,
}

/// A segment as the server last confirmed it, plus the row the user edits.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentEntry {
    pub record: Segment,
    pub node: SegmentNode,
}

impl SegmentEntry {
    pub fn from_node(node: SegmentNode) -> Self {
        Self {
            record: node.to_record(),
            node,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    pub segment_id: SegmentId,
    pub field: SegmentField,
    pub value: FieldValue,
}

impl PendingUpdate {
    pub fn request(&self) -> ApiRequest {
        ApiRequest::UpdateSegmentField {
            segment_id: self.segment_id,
            field: self.field,
            value: self.value.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingInsert {
    pub anchor_id: SegmentId,
    pub other_id: SegmentId,
    pub direction: Direction,
}

impl PendingInsert {
    pub fn request(&self) -> ApiRequest {
        ApiRequest::InsertSegment {
            segment_id: self.anchor_id,
            other_id: self.other_id,
            direction: self.direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRemove {
    pub segment_id: SegmentId,
}

impl PendingRemove {
    pub fn request(&self) -> ApiRequest {
        ApiRequest::DeleteSegment {
            segment_id: self.segment_id,
        }
    }
}

/// Rename of every segment spoken by `old`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRename {
    pub transcription_id: i64,
    pub old: String,
    pub new: String,
}

impl PendingRename {
    pub fn request(&self) -> ApiRequest {
        ApiRequest::RenameSpeaker {
            transcription_id: self.transcription_id,
            old: self.old.clone(),
            new: self.new.clone(),
        }
    }
}

/// Either shape the store may answer an insert with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InsertBody {
    Fields { id: SegmentId, start: f64, end: f64 },
    Fragment { segment: String },
}

/// Ordered segments of one transcription. Order is position in `entries`.
#[derive(Debug, Default)]
pub struct SegmentStore {
    entries: Vec<SegmentEntry>,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: Vec<SegmentNode>) -> Self {
        Self {
            entries: nodes.into_iter().map(SegmentEntry::from_node).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SegmentEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<SegmentId> {
        self.entries.iter().map(|entry| entry.record.id).collect()
    }

    pub fn position(&self, id: SegmentId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.record.id == id)
    }

    pub fn get(&self, id: SegmentId) -> Option<&SegmentEntry> {
        self.entries.iter().find(|entry| entry.record.id == id)
    }

    fn get_mut(&mut self, id: SegmentId) -> Option<&mut SegmentEntry> {
        self.entries.iter_mut().find(|entry| entry.record.id == id)
    }

    /// Start editing one field. The input shows `raw` immediately and goes
    /// pending; the record is untouched until the server confirms.
    pub fn update_field(
        &mut self,
        id: SegmentId,
        field: SegmentField,
        raw: &str,
    ) -> Result<PendingUpdate, StoreError> {
        let entry = self.get_mut(id).ok_or(StoreError::UnknownSegment(id))?;

        let input = entry.node.input_mut(field);
        input.value = raw.to_string();
        input.state = InputState::Pending;

        let value = FieldValue::for_field(field, raw);
        if value == FieldValue::Seconds(None) {
            debug!(segment = id, %field, "timecode did not parse, sending null");
        }

        Ok(PendingUpdate {
            segment_id: id,
            field,
            value,
        })
    }

    /// Apply the server's answer to a field update. There is no rollback:
    /// on failure the input keeps the user's text and only flips to error.
    pub fn resolve_update(
        &mut self,
        pending: &PendingUpdate,
        outcome: &Outcome,
    ) -> Result<InputState, StoreError> {
        let entry = self
            .get_mut(pending.segment_id)
            .ok_or(StoreError::UnknownSegment(pending.segment_id))?;

        let state = if status_of(outcome) == Some(pending.request().success_status()) {
            entry.record.apply(pending.field, &pending.value);
            InputState::Success
        } else {
            warn!(
                segment = pending.segment_id,
                field = %pending.field,
                status = ?status_of(outcome),
                "field update rejected"
            );
            InputState::Error
        };

        entry.node.input_mut(pending.field).state = state;
        Ok(state)
    }

    /// Prepare an insert next to `anchor`. The neighbour in that direction
    /// (or [`NO_SEGMENT`]) goes along so the server can place the new times.
    pub fn insert_relative(
        &self,
        anchor: SegmentId,
        direction: Direction,
    ) -> Result<PendingInsert, StoreError> {
        let index = self.position(anchor).ok_or(StoreError::UnknownSegment(anchor))?;

        let neighbour = match direction {
            Direction::Before => index.checked_sub(1).and_then(|i| self.entries.get(i)),
            Direction::After => self.entries.get(index + 1),
        };

        Ok(PendingInsert {
            anchor_id: anchor,
            other_id: neighbour.map(|entry| entry.record.id).unwrap_or(NO_SEGMENT),
            direction,
        })
    }

    /// Splice the created segment next to its anchor. Returns the new id so
    /// the caller can bind the node.
    pub fn resolve_insert(
        &mut self,
        pending: &PendingInsert,
        outcome: &Outcome,
    ) -> Result<SegmentId, StoreError> {
        let response = expect_status(outcome, pending.request().success_status())?;

        let body: InsertBody = response
            .json()
            .map_err(|e| StoreError::MalformedInsertBody(e.to_string()))?;
        let node = match body {
            InsertBody::Fields { id, start, end } => {
                SegmentNode::from_segment(&Segment::new(id, start, end))
            }
            InsertBody::Fragment { segment } => parse_segment_fragment(&segment)
                .map_err(|e| StoreError::MalformedInsertBody(e.to_string()))?,
        };

        if self.position(node.id).is_some() {
            return Err(StoreError::DuplicateSegment(node.id));
        }

        let anchor_index = self
            .position(pending.anchor_id)
            .ok_or(StoreError::AnchorRemoved(pending.anchor_id))?;
        let index = match pending.direction {
            Direction::Before => anchor_index,
            Direction::After => anchor_index + 1,
        };

        let id = node.id;
        self.entries.insert(index, SegmentEntry::from_node(node));
        info!(segment = id, anchor = pending.anchor_id, index, "segment inserted");
        Ok(id)
    }

    pub fn remove(&self, id: SegmentId) -> Result<PendingRemove, StoreError> {
        self.position(id).ok_or(StoreError::UnknownSegment(id))?;
        Ok(PendingRemove { segment_id: id })
    }

    /// Drop the entry only once the server answered 204 No Content.
    pub fn resolve_remove(
        &mut self,
        pending: &PendingRemove,
        outcome: &Outcome,
    ) -> Result<Segment, StoreError> {
        expect_status(outcome, pending.request().success_status())?;

        let index = self
            .position(pending.segment_id)
            .ok_or(StoreError::UnknownSegment(pending.segment_id))?;
        let entry = self.entries.remove(index);
        info!(segment = pending.segment_id, remaining = self.entries.len(), "segment removed");
        Ok(entry.record)
    }

    /// Distinct non-empty speakers across the confirmed records.
    pub fn speakers(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .map(|entry| entry.record.speaker.clone())
            .filter(|speaker| !speaker.is_empty())
            .collect()
    }

    /// Prepare a bulk rename. The new name is trimmed; an empty name on
    /// either side would be a no-op on the server, so it is refused here.
    pub fn rename_speaker(
        &self,
        transcription_id: i64,
        old: &str,
        new: &str,
    ) -> Result<PendingRename, StoreError> {
        let new = new.trim();
        if old.is_empty() || new.is_empty() {
            return Err(StoreError::EmptySpeaker);
        }
        Ok(PendingRename {
            transcription_id,
            old: old.to_string(),
            new: new.to_string(),
        })
    }

    /// Relabel every record the server renamed. Returns how many changed.
    pub fn resolve_rename(
        &mut self,
        pending: &PendingRename,
        outcome: &Outcome,
    ) -> Result<usize, StoreError> {
        let request = pending.request();
        match status_of(outcome) {
            Some(status) if request.is_success(status) => {}
            actual => {
                return Err(StoreError::UnexpectedStatus {
                    expected: request.success_status(),
                    actual,
                })
            }
        }

        let mut renamed = 0;
        for entry in self
            .entries
            .iter_mut()
            .filter(|entry| entry.record.speaker == pending.old)
        {
            entry.record.speaker = pending.new.clone();
            entry.node.speaker = FieldInput {
                value: pending.new.clone(),
                state: InputState::Success,
            };
            renamed += 1;
        }
        info!(renamed, "speaker renamed");
        Ok(renamed)
    }
}

fn status_of(outcome: &Outcome) -> Option<u16> {
    outcome.as_ref().ok().map(|response| response.status)
}

fn expect_status(outcome: &Outcome, expected: u16) -> Result<&ApiResponse, StoreError> {
    match outcome {
        Ok(response) if response.status == expected => Ok(response),
        Ok(response) => Err(StoreError::UnexpectedStatus {
            expected,
            actual: Some(response.status),
        }),
        Err(e) => {
            debug!(error = %e, "request did not reach the server");
            Err(StoreError::UnexpectedStatus {
                expected,
                actual: None,
            })
        }
    }
}
