use uuid::Uuid;

use super::segment::{SegmentField, SegmentId};
use super::store::Outcome;
use crate::services::api::ApiRequest;

/// Ticket tying a dispatched request to its completion.
pub type RequestId = Uuid;

#[derive(Debug)]
pub enum Event {
    /// Something the user did on the page.
    Ui(UiEvent),
    /// A request issued earlier has resolved.
    Completed(Completion),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// A segment input lost focus with a changed value.
    SegmentChanged {
        segment: SegmentId,
        field: SegmentField,
        value: String,
    },
    /// A `.transcription-part` input changed.
    TranscriptionChanged { field: String, value: String },
    /// The segment's text area gained focus.
    TextFocused { segment: SegmentId },
    /// A control button was clicked; `control` is its declared `data-type`.
    ControlClicked { segment: SegmentId, control: String },
    AutoplayToggled(bool),
    /// The page's rename form was submitted.
    SpeakerRenamed { old: String, new: String },
}

#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub outcome: Outcome,
}

/// Work the reactor hands back to the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    Request { id: RequestId, request: ApiRequest },
    /// Blocking notice to the user.
    Alert(String),
    /// The page must re-render from the server.
    Reload,
}
