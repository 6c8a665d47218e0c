mod common;

use common::{ok, ok_json, only_request, RecordingPlayer};
use segsync::kernel::event::{Completion, Event, SideEffect, UiEvent};
use segsync::kernel::media::MediaPlayer;
use segsync::kernel::page::InputState;
use segsync::kernel::reactor::{Reactor, DELETE_FAILED, INSERT_FAILED, RENAME_FAILED};
use segsync::kernel::segment::{Direction, FieldValue, SegmentField};
use segsync::services::api::ApiRequest;
use uuid::Uuid;

fn reactor() -> Reactor<RecordingPlayer> {
    Reactor::new(common::sample_page(), RecordingPlayer::new())
}

fn click(segment: i64, control: &str) -> UiEvent {
    UiEvent::ControlClicked {
        segment,
        control: control.to_string(),
    }
}

fn change(segment: i64, field: SegmentField, value: &str) -> UiEvent {
    UiEvent::SegmentChanged {
        segment,
        field,
        value: value.to_string(),
    }
}

#[test]
fn test_focus_with_autoplay_seeks_to_segment_start() {
    let mut reactor = reactor();
    assert!(reactor.context.autoplay, "fixture page has autoplay checked");

    let effects = reactor.handle(UiEvent::TextFocused { segment: 12 });

    assert!(effects.is_empty());
    assert_eq!(reactor.context.media.seeks(), &[62.25]);
    assert!(reactor.context.media.is_playing());
}

#[test]
fn test_focus_without_autoplay_does_not_seek() {
    let mut reactor = reactor();
    reactor.handle(UiEvent::AutoplayToggled(false));

    reactor.handle(UiEvent::TextFocused { segment: 12 });

    assert!(reactor.context.media.seeks().is_empty());
    assert!(!reactor.context.media.is_playing());
}

#[test]
fn test_focus_with_unparseable_start_does_nothing() {
    let mut reactor = reactor();
    reactor.handle(change(11, SegmentField::Start, "later"));

    reactor.handle(UiEvent::TextFocused { segment: 11 });

    assert!(reactor.context.media.seeks().is_empty());
}

#[test]
fn test_play_button_falls_back_to_zero() {
    let mut reactor = reactor();
    reactor.handle(change(11, SegmentField::Start, "later"));

    reactor.handle(click(11, "play"));
    assert_eq!(reactor.context.media.seeks(), &[0.0]);
    assert!(reactor.context.media.is_playing());

    reactor.handle(click(12, "play"));
    assert_eq!(reactor.context.media.current_time(), 62.25);

    reactor.handle(click(12, "pause"));
    assert!(!reactor.context.media.is_playing());
}

#[test]
fn test_rewind_steps_back_and_clamps() {
    let mut reactor = reactor();

    reactor.context.media.seek(5.0);
    reactor.handle(click(10, "rewind"));
    assert_eq!(reactor.context.media.current_time(), 4.0);

    reactor.context.media.seek(0.4);
    reactor.handle(click(10, "rewind"));
    assert_eq!(reactor.context.media.current_time(), 0.0);
}

#[test]
fn test_field_change_round_trip() {
    let mut reactor = reactor();

    let effects = reactor.handle(change(12, SegmentField::Start, "1:02.5"));
    let (id, request) = only_request(&effects);
    assert_eq!(
        request,
        ApiRequest::UpdateSegmentField {
            segment_id: 12,
            field: SegmentField::Start,
            value: FieldValue::Seconds(Some(62.5)),
        }
    );
    assert_eq!(reactor.in_flight(), 1);

    let effects = reactor.complete(Completion { id, outcome: ok(200) });
    assert!(effects.is_empty());
    assert_eq!(reactor.in_flight(), 0);

    let entry = reactor.store.get(12).unwrap();
    assert_eq!(entry.record.start, 62.5);
    assert_eq!(entry.node.start.state, InputState::Success);
}

#[test]
fn test_failed_field_change_shows_error_only() {
    let mut reactor = reactor();

    let effects = reactor.handle(change(10, SegmentField::Speaker, "Zed"));
    let (id, _) = only_request(&effects);
    let effects = reactor.complete(Completion { id, outcome: ok(500) });

    assert!(effects.is_empty(), "field failures never alert");
    let entry = reactor.store.get(10).unwrap();
    assert_eq!(entry.record.speaker, "Alice");
    assert_eq!(entry.node.speaker.value, "Zed");
    assert_eq!(entry.node.speaker.state, InputState::Error);
}

#[test]
fn test_out_of_order_completions_apply_in_arrival_order() {
    let mut reactor = reactor();

    let (first, _) = only_request(&reactor.handle(change(11, SegmentField::Text, "draft one")));
    let (second, _) = only_request(&reactor.handle(change(11, SegmentField::Text, "draft two")));
    assert_eq!(reactor.in_flight(), 2);

    reactor.step(vec![
        Event::Completed(Completion { id: second, outcome: ok(200) }),
        Event::Completed(Completion { id: first, outcome: ok(200) }),
    ]);

    let entry = reactor.store.get(11).unwrap();
    assert_eq!(entry.record.text, "draft one");
    assert_eq!(entry.node.text.value, "draft two");
}

#[test]
fn test_inserted_segment_is_bound_like_the_others() {
    let mut reactor = reactor();

    let effects = reactor.handle(click(12, "add-after"));
    let (id, request) = only_request(&effects);
    assert_eq!(
        request,
        ApiRequest::InsertSegment {
            segment_id: 12,
            other_id: -1,
            direction: Direction::After,
        }
    );

    let effects = reactor.complete(Completion {
        id,
        outcome: ok_json(200, r#"{"id": 20, "start": 70.0, "end": 70.0}"#),
    });
    assert!(effects.is_empty());
    assert_eq!(reactor.store.ids(), vec![10, 11, 12, 20]);
    assert!(reactor.binder.is_bound(20));

    // The new row answers the same controls as rows present at load.
    reactor.handle(click(20, "play"));
    assert_eq!(reactor.context.media.current_time(), 70.0);

    let (_, request) = only_request(&reactor.handle(click(20, "add-before")));
    assert_eq!(
        request,
        ApiRequest::InsertSegment {
            segment_id: 20,
            other_id: 12,
            direction: Direction::Before,
        }
    );

    let (_, request) = only_request(&reactor.handle(change(20, SegmentField::Text, "new words")));
    assert!(matches!(request, ApiRequest::UpdateSegmentField { segment_id: 20, .. }));
}

#[test]
fn test_failed_insert_alerts() {
    let mut reactor = reactor();

    let (id, _) = only_request(&reactor.handle(click(10, "add-before")));
    let effects = reactor.complete(Completion { id, outcome: ok(500) });

    assert_eq!(effects, vec![SideEffect::Alert(INSERT_FAILED.to_string())]);
    assert_eq!(reactor.store.ids(), vec![10, 11, 12]);
}

#[test]
fn test_delete_flow() {
    let mut reactor = reactor();

    let (id, request) = only_request(&reactor.handle(click(11, "delete")));
    assert_eq!(request, ApiRequest::DeleteSegment { segment_id: 11 });

    let effects = reactor.complete(Completion { id, outcome: ok(204) });
    assert!(effects.is_empty());
    assert_eq!(reactor.store.ids(), vec![10, 12]);
    assert!(!reactor.binder.is_bound(11));

    // Events for the removed row go nowhere.
    assert!(reactor.handle(click(11, "delete")).is_empty());
}

#[test]
fn test_failed_delete_alerts_and_keeps_the_row() {
    let mut reactor = reactor();

    let (id, _) = only_request(&reactor.handle(click(10, "delete")));
    let effects = reactor.complete(Completion { id, outcome: ok(200) });

    assert_eq!(effects, vec![SideEffect::Alert(DELETE_FAILED.to_string())]);
    assert_eq!(reactor.store.len(), 3);
    assert!(reactor.binder.is_bound(10));
}

#[test]
fn test_deleting_the_last_segment_requests_reload() {
    let mut reactor = reactor();

    let mut effects = Vec::new();
    for segment in [10, 11, 12] {
        let (id, _) = only_request(&reactor.handle(click(segment, "delete")));
        effects = reactor.complete(Completion { id, outcome: ok(204) });
    }

    assert!(reactor.store.is_empty());
    assert_eq!(effects, vec![SideEffect::Reload]);
}

#[test]
fn test_insert_whose_anchor_vanished_requests_reload() {
    let mut reactor = reactor();

    let (insert, _) = only_request(&reactor.handle(click(11, "add-after")));
    let (delete, _) = only_request(&reactor.handle(click(11, "delete")));

    reactor.complete(Completion { id: delete, outcome: ok(204) });
    let effects = reactor.complete(Completion {
        id: insert,
        outcome: ok_json(200, r#"{"id": 20, "start": 1.0, "end": 1.0}"#),
    });

    assert_eq!(effects, vec![SideEffect::Reload]);
    assert_eq!(reactor.store.ids(), vec![10, 12]);
}

#[test]
fn test_unknown_control_and_unbound_rows_are_ignored() {
    let mut reactor = reactor();

    assert!(reactor.handle(click(10, "explode")).is_empty());
    assert!(reactor.handle(click(99, "play")).is_empty());
    assert!(reactor.handle(change(99, SegmentField::Text, "x")).is_empty());
    assert!(reactor.context.media.seeks().is_empty());
}

#[test]
fn test_title_change() {
    let mut reactor = reactor();

    let event = UiEvent::TranscriptionChanged {
        field: "title".to_string(),
        value: "Second interview".to_string(),
    };
    let (id, request) = only_request(&reactor.handle(event.clone()));
    assert_eq!(
        request,
        ApiRequest::UpdateTitle {
            transcription_id: 42,
            value: "Second interview".to_string(),
        }
    );
    assert_eq!(request.path(), "/api/transcriptions/42");

    reactor.complete(Completion { id, outcome: ok(403) });
    let transcription = &reactor.context.transcription;
    assert_eq!(transcription.title, "Interview");
    let part = transcription.part("title").unwrap();
    assert_eq!(part.input.value, "Second interview");
    assert_eq!(part.input.state, InputState::Error);

    let (id, _) = only_request(&reactor.handle(event));
    reactor.complete(Completion { id, outcome: ok(200) });
    let transcription = &reactor.context.transcription;
    assert_eq!(transcription.title, "Second interview");
    assert_eq!(transcription.part("title").unwrap().input.state, InputState::Success);
}

#[test]
fn test_unbound_transcription_part_is_ignored() {
    let mut reactor = reactor();
    let effects = reactor.handle(UiEvent::TranscriptionChanged {
        field: "notes".to_string(),
        value: "x".to_string(),
    });
    assert!(effects.is_empty());
}

#[test]
fn test_unknown_completion_is_dropped() {
    let mut reactor = reactor();
    let effects = reactor.complete(Completion {
        id: Uuid::new_v4(),
        outcome: ok(200),
    });
    assert!(effects.is_empty());
}

#[test]
fn test_speaker_rename() {
    let mut reactor = reactor();

    let rename = UiEvent::SpeakerRenamed {
        old: "Alice".to_string(),
        new: "Ahsoka".to_string(),
    };
    let (id, request) = only_request(&reactor.handle(rename.clone()));
    assert_eq!(request.path(), "/edit/42");

    let effects = reactor.complete(Completion { id, outcome: ok(500) });
    assert_eq!(effects, vec![SideEffect::Alert(RENAME_FAILED.to_string())]);
    assert_eq!(reactor.store.get(10).unwrap().record.speaker, "Alice");

    let (id, _) = only_request(&reactor.handle(rename));
    assert!(reactor.complete(Completion { id, outcome: ok(302) }).is_empty());
    let speakers: Vec<_> = reactor.store.speakers().into_iter().collect();
    assert_eq!(speakers, vec!["Ahsoka".to_string(), "Bob".to_string()]);
}

#[test]
fn test_blank_rename_sends_nothing() {
    let mut reactor = reactor();
    let effects = reactor.handle(UiEvent::SpeakerRenamed {
        old: "Alice".to_string(),
        new: " ".to_string(),
    });
    assert!(effects.is_empty());
    assert_eq!(reactor.in_flight(), 0);
}
